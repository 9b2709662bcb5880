//! services/api/src/web/tips.rs
//!
//! The daily study tip. AI-generated when a tip service is configured,
//! otherwise served from the built-in pool.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use study_planner_core::domain::AuthUser;
use study_planner_core::tips;
use tracing::warn;
use utoipa::ToSchema;

use crate::web::rest::ApiFailure;
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct TipResponse {
    pub tip: String,
    /// "ai" when the tip service answered, "built-in" otherwise.
    pub source: String,
}

/// GET /api/tips/daily - One study tip for today
#[utoipa::path(
    get,
    path = "/api/tips/daily",
    responses(
        (status = 200, description = "Today's tip", body = TipResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn daily_tip_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiFailure> {
    if let Some(tip_service) = &state.tips {
        // Subjects personalize the tip; a missing profile just means a
        // generic one.
        let subjects = state
            .db
            .get_profile(auth.user_id)
            .await
            .map(|p| p.subjects)
            .unwrap_or_default();

        match tip_service.daily_tip(&subjects).await {
            Ok(tip) => {
                return Ok(Json(TipResponse {
                    tip,
                    source: "ai".to_string(),
                }));
            }
            Err(e) => warn!("Tip service failed, using the built-in pool: {:?}", e),
        }
    }

    let today = Utc::now().date_naive();
    Ok(Json(TipResponse {
        tip: tips::fallback_tip(today).to_string(),
        source: "built-in".to_string(),
    }))
}
