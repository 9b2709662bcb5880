//! services/api/src/web/progress.rs
//!
//! Read-only progress views: streaks, today's goal completion, the
//! weekly load and the consistency heatmap. All computation happens in
//! the core crate over an explicit session snapshot.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use study_planner_core::domain::AuthUser;
use study_planner_core::ports::PortError;
use study_planner_core::progress::{self, DEFAULT_DAILY_GOAL_HOURS, DEFAULT_HEATMAP_DAYS};
use study_planner_core::streaks;

use crate::web::rest::{port_failure, ApiFailure};
use crate::web::state::AppState;

#[derive(Deserialize)]
pub struct HeatmapParams {
    pub days: Option<u32>,
}

/// GET /api/progress/streaks - Current and longest consecutive-day streak
#[utoipa::path(
    get,
    path = "/api/progress/streaks",
    responses(
        (status = 200, description = "Streak summary derived from completed sessions")
    ),
    security(("bearer_token" = []))
)]
pub async fn streaks_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiFailure> {
    let sessions = state
        .db
        .list_sessions(auth.user_id)
        .await
        .map_err(|e| port_failure("Failed to load sessions", e))?;

    let today = Utc::now().date_naive();
    Ok(Json(streaks::calculate_from_sessions(&sessions, today)))
}

/// GET /api/progress/today - Completed minutes vs the daily goal
#[utoipa::path(
    get,
    path = "/api/progress/today",
    responses(
        (status = 200, description = "Today's completion percentage")
    ),
    security(("bearer_token" = []))
)]
pub async fn today_progress_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiFailure> {
    let today = Utc::now().date_naive();

    let sessions = state
        .db
        .sessions_for_date(auth.user_id, today)
        .await
        .map_err(|e| port_failure("Failed to load sessions", e))?;

    let daily_goal = match state.db.get_profile(auth.user_id).await {
        Ok(profile) => profile.daily_goal_hours,
        Err(PortError::NotFound(_)) => DEFAULT_DAILY_GOAL_HOURS,
        Err(e) => return Err(port_failure("Failed to load profile", e)),
    };

    Ok(Json(progress::today_progress(&sessions, daily_goal, today)))
}

/// GET /api/progress/weekly - Planned vs completed hours per weekday
#[utoipa::path(
    get,
    path = "/api/progress/weekly",
    responses(
        (status = 200, description = "Seven weekday buckets, Sunday first")
    ),
    security(("bearer_token" = []))
)]
pub async fn weekly_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiFailure> {
    let sessions = state
        .db
        .list_sessions(auth.user_id)
        .await
        .map_err(|e| port_failure("Failed to load sessions", e))?;

    Ok(Json(progress::weekly_overview(&sessions)))
}

/// GET /api/progress/heatmap - Daily intensity levels for a trailing window
#[utoipa::path(
    get,
    path = "/api/progress/heatmap",
    params(
        ("days" = Option<u32>, Query, description = "Window length in days, 1-366 (default 91)")
    ),
    responses(
        (status = 200, description = "One entry per day, oldest first")
    ),
    security(("bearer_token" = []))
)]
pub async fn heatmap_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<HeatmapParams>,
) -> Result<impl IntoResponse, ApiFailure> {
    let days = params.days.unwrap_or(DEFAULT_HEATMAP_DAYS).clamp(1, 366);

    let sessions = state
        .db
        .list_sessions(auth.user_id)
        .await
        .map_err(|e| port_failure("Failed to load sessions", e))?;

    let today = Utc::now().date_naive();
    Ok(Json(progress::heatmap(&sessions, days, today)))
}
