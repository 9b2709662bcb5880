//! services/api/src/web/admin.rs
//!
//! Aggregate usage stats and the account list. Every route here sits
//! behind the admin middleware.

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use study_planner_core::domain::UserAccount;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::rest::{port_failure, ApiFailure};
use crate::web::state::AppState;

//=========================================================================================
// Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub total_users: u64,
    /// Completed-session minutes across all users, as whole hours.
    pub total_hours: u64,
    pub active_schedules: u64,
}

#[derive(Serialize, ToSchema)]
pub struct AdminUserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserAccount> for AdminUserResponse {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            role: account.role.as_str().to_string(),
            created_at: account.created_at,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/admin/stats - Global usage stats
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Aggregate usage numbers", body = StatsResponse),
        (status = 401, description = "Admin access required")
    ),
    security(("bearer_token" = []))
)]
pub async fn stats_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiFailure> {
    let stats = state
        .db
        .admin_stats()
        .await
        .map_err(|e| port_failure("Failed to load stats", e))?;

    Ok(Json(StatsResponse {
        total_users: stats.total_users,
        total_hours: stats.total_hours,
        active_schedules: stats.active_schedules,
    }))
}

/// GET /api/admin/users - Every account, oldest first
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All accounts", body = [AdminUserResponse]),
        (status = 401, description = "Admin access required")
    ),
    security(("bearer_token" = []))
)]
pub async fn users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiFailure> {
    let users = state
        .db
        .list_users()
        .await
        .map_err(|e| port_failure("Failed to load users", e))?;

    let body: Vec<AdminUserResponse> = users.into_iter().map(AdminUserResponse::from).collect();
    Ok(Json(body))
}
