//! services/api/src/web/settings.rs
//!
//! Per-user UI preferences.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_planner_core::domain::{AuthUser, Settings};
use utoipa::ToSchema;

use crate::web::rest::{port_failure, ApiFailure, MessageResponse};
use crate::web::state::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SettingsBody {
    pub dark_mode: bool,
    pub notifications: bool,
}

impl From<Settings> for SettingsBody {
    fn from(settings: Settings) -> Self {
        Self {
            dark_mode: settings.dark_mode,
            notifications: settings.notifications,
        }
    }
}

/// GET /api/settings - The caller's preferences
#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Current settings", body = SettingsBody)
    ),
    security(("bearer_token" = []))
)]
pub async fn get_settings_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiFailure> {
    let settings = state
        .db
        .get_settings(auth.user_id)
        .await
        .map_err(|e| port_failure("Failed to load settings", e))?;
    Ok(Json(SettingsBody::from(settings)))
}

/// PUT /api/settings - Replace the caller's preferences
#[utoipa::path(
    put,
    path = "/api/settings",
    request_body = SettingsBody,
    responses(
        (status = 200, description = "Settings saved", body = MessageResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<SettingsBody>,
) -> Result<impl IntoResponse, ApiFailure> {
    let settings = Settings {
        dark_mode: body.dark_mode,
        notifications: body.notifications,
    };

    state
        .db
        .set_settings(auth.user_id, &settings)
        .await
        .map_err(|e| port_failure("Failed to save settings", e))?;

    Ok(Json(MessageResponse::new("Settings saved")))
}
