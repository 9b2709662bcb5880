//! services/api/src/web/schedules.rs
//!
//! Schedule retrieval, manual saves and AI-or-fallback generation.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_planner_core::domain::{
    AuthUser, DaySchedule, FallbackReason, PlannedWeek, ScheduleSource,
};
use study_planner_core::ports::PortError;
use study_planner_core::scheduler;
use tracing::warn;
use utoipa::ToSchema;

use crate::web::rest::{failure, port_failure, ApiFailure, MessageResponse};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// Wire shape of a saved schedule. `source` and `generated_at` are
/// absent when the user has never generated or saved one.
#[derive(Serialize)]
pub struct ScheduleResponse {
    pub generated_at: Option<DateTime<Utc>>,
    pub source: Option<ScheduleSource>,
    pub week: Vec<DaySchedule>,
}

impl ScheduleResponse {
    fn empty() -> Self {
        Self {
            generated_at: None,
            source: None,
            week: Vec::new(),
        }
    }
}

impl From<PlannedWeek> for ScheduleResponse {
    fn from(plan: PlannedWeek) -> Self {
        Self {
            generated_at: Some(plan.generated_at),
            source: Some(plan.source),
            week: plan.week,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct SaveScheduleRequest {
    #[schema(value_type = Vec<Object>)]
    pub week: Vec<DaySchedule>,
    /// "ai" or "rule-based"; manual saves default to "rule-based".
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct GenerateScheduleResponse {
    pub generated_at: DateTime<Utc>,
    pub source: ScheduleSource,
    /// Present only when the rule-based fallback was substituted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    pub week: Vec<DaySchedule>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/schedules - The caller's latest schedule
#[utoipa::path(
    get,
    path = "/api/schedules",
    responses(
        (status = 200, description = "The latest saved schedule, or an empty week")
    ),
    security(("bearer_token" = []))
)]
pub async fn get_schedule_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiFailure> {
    let schedule = state
        .db
        .get_latest_schedule(auth.user_id)
        .await
        .map_err(|e| port_failure("Failed to load schedule", e))?;

    Ok(Json(
        schedule.map(ScheduleResponse::from).unwrap_or_else(ScheduleResponse::empty),
    ))
}

/// POST /api/schedules - Save a caller-assembled schedule (last write wins)
#[utoipa::path(
    post,
    path = "/api/schedules",
    responses(
        (status = 200, description = "Schedule saved", body = MessageResponse),
        (status = 400, description = "Unknown schedule source")
    ),
    security(("bearer_token" = []))
)]
pub async fn save_schedule_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<SaveScheduleRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let source = match req.source.as_deref() {
        None => ScheduleSource::RuleBased,
        Some(raw) => ScheduleSource::parse(raw).ok_or_else(|| {
            failure(
                StatusCode::BAD_REQUEST,
                format!("Unknown schedule source: {}", raw),
            )
        })?,
    };

    let plan = PlannedWeek {
        generated_at: req.generated_at.unwrap_or_else(Utc::now),
        source,
        week: req.week,
    };

    state
        .db
        .save_schedule(auth.user_id, &plan)
        .await
        .map_err(|e| port_failure("Failed to save schedule", e))?;

    Ok(Json(MessageResponse::new("Schedule saved successfully")))
}

/// POST /api/schedules/generate - Generate and persist a fresh 7-day plan
///
/// Runs the AI planner when configured; any failure or malformed
/// response substitutes the deterministic rule-based schedule. The
/// response's `source` and `fallback_reason` make the substitution
/// visible to the UI.
#[utoipa::path(
    post,
    path = "/api/schedules/generate",
    responses(
        (status = 200, description = "A fresh schedule, tagged with its origin"),
        (status = 400, description = "The profile has no subjects yet")
    ),
    security(("bearer_token" = []))
)]
pub async fn generate_schedule_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiFailure> {
    let profile = match state.db.get_profile(auth.user_id).await {
        Ok(profile) => profile,
        Err(PortError::NotFound(_)) => Default::default(),
        Err(e) => return Err(port_failure("Failed to load profile", e)),
    };

    let outcome = scheduler::plan_week(state.planner.as_deref(), &profile, Utc::now()).await;
    let Some(outcome) = outcome else {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "Add at least one subject before generating a schedule",
        ));
    };

    let fallback_reason = outcome.fallback_reason().cloned();
    if let Some(reason) = &fallback_reason {
        warn!(
            ?reason,
            "AI planner unavailable, substituted the rule-based schedule"
        );
    }

    let plan = outcome.into_plan();

    state
        .db
        .save_schedule(auth.user_id, &plan)
        .await
        .map_err(|e| port_failure("Failed to save schedule", e))?;

    Ok(Json(GenerateScheduleResponse {
        generated_at: plan.generated_at,
        source: plan.source,
        fallback_reason,
        week: plan.week,
    }))
}
