//! services/api/src/web/sessions.rs
//!
//! Study-session logging and retrieval.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_planner_core::domain::{AuthUser, StudySession};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::rest::{failure, port_failure, ApiFailure, MessageResponse};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LogSessionRequest {
    pub subject: String,
    #[serde(default)]
    pub topic: Option<String>,
    /// Minutes spent; must be positive.
    pub duration: u32,
    #[serde(default)]
    pub completed: bool,
    /// Defaults to today when omitted.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub subject: String,
    pub topic: Option<String>,
    pub duration: u32,
    pub completed: bool,
    pub date: NaiveDate,
}

impl From<StudySession> for SessionResponse {
    fn from(session: StudySession) -> Self {
        Self {
            id: session.id,
            subject: session.subject,
            topic: session.topic,
            duration: session.duration_minutes,
            completed: session.completed,
            date: session.date,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/sessions/log - Log a study session
#[utoipa::path(
    post,
    path = "/api/sessions/log",
    request_body = LogSessionRequest,
    responses(
        (status = 201, description = "Session logged", body = MessageResponse),
        (status = 400, description = "Missing subject or non-positive duration")
    ),
    security(("bearer_token" = []))
)]
pub async fn log_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<LogSessionRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let subject = req.subject.trim();
    if subject.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Subject is required"));
    }
    if req.duration == 0 {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "Duration must be a positive number of minutes",
        ));
    }

    let now = Utc::now();
    let session = StudySession {
        id: Uuid::new_v4(),
        user_id: auth.user_id,
        subject: subject.to_string(),
        topic: req.topic.filter(|t| !t.trim().is_empty()),
        duration_minutes: req.duration,
        completed: req.completed,
        date: req.date.unwrap_or_else(|| now.date_naive()),
        created_at: now,
    };

    state
        .db
        .log_session(&session)
        .await
        .map_err(|e| port_failure("Failed to log session", e))?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Session logged")),
    ))
}

/// GET /api/sessions/today - Sessions dated today
#[utoipa::path(
    get,
    path = "/api/sessions/today",
    responses(
        (status = 200, description = "Today's sessions", body = [SessionResponse])
    ),
    security(("bearer_token" = []))
)]
pub async fn today_sessions_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiFailure> {
    let today = Utc::now().date_naive();
    let sessions = state
        .db
        .sessions_for_date(auth.user_id, today)
        .await
        .map_err(|e| port_failure("Failed to load sessions", e))?;

    let body: Vec<SessionResponse> = sessions.into_iter().map(SessionResponse::from).collect();
    Ok(Json(body))
}

/// GET /api/sessions - The caller's full session log, oldest first
#[utoipa::path(
    get,
    path = "/api/sessions",
    responses(
        (status = 200, description = "All logged sessions", body = [SessionResponse])
    ),
    security(("bearer_token" = []))
)]
pub async fn list_sessions_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiFailure> {
    let sessions = state
        .db
        .list_sessions(auth.user_id)
        .await
        .map_err(|e| port_failure("Failed to load sessions", e))?;

    let body: Vec<SessionResponse> = sessions.into_iter().map(SessionResponse::from).collect();
    Ok(Json(body))
}
