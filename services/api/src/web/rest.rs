//! services/api/src/web/rest.rs
//!
//! Shared REST response plumbing and the master definition for the
//! OpenAPI specification.

use axum::{http::StatusCode, response::Json};
use serde::Serialize;
use study_planner_core::ports::PortError;
use tracing::error;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::register_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        crate::web::profile::get_profile_handler,
        crate::web::profile::update_profile_handler,
        crate::web::sessions::log_session_handler,
        crate::web::sessions::today_sessions_handler,
        crate::web::sessions::list_sessions_handler,
        crate::web::schedules::get_schedule_handler,
        crate::web::schedules::save_schedule_handler,
        crate::web::schedules::generate_schedule_handler,
        crate::web::progress::streaks_handler,
        crate::web::progress::today_progress_handler,
        crate::web::progress::weekly_handler,
        crate::web::progress::heatmap_handler,
        crate::web::tips::daily_tip_handler,
        crate::web::settings::get_settings_handler,
        crate::web::settings::update_settings_handler,
        crate::web::admin::stats_handler,
        crate::web::admin::users_handler,
    ),
    components(schemas(
        ErrorResponse,
        MessageResponse,
        crate::web::auth::RegisterRequest,
        crate::web::auth::LoginRequest,
        crate::web::auth::LoginResponse,
        crate::web::auth::UserSummary,
        crate::web::profile::ProfileBody,
        crate::web::profile::ExamBody,
        crate::web::sessions::LogSessionRequest,
        crate::web::sessions::SessionResponse,
        crate::web::tips::TipResponse,
        crate::web::settings::SettingsBody,
        crate::web::admin::StatsResponse,
        crate::web::admin::AdminUserResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Study Planner API", description = "API endpoints for study planning, session logging and progress tracking.")
    )
)]
pub struct ApiDoc;

/// Registers the bearer-token security scheme the protected paths refer to.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

//=========================================================================================
// Shared Response and Error Types
//=========================================================================================

/// The JSON error envelope every failing endpoint returns.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// A plain acknowledgement payload.
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The failure half of every handler's `Result`.
pub type ApiFailure = (StatusCode, Json<ErrorResponse>);

pub fn failure(status: StatusCode, message: impl Into<String>) -> ApiFailure {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Maps a port error onto an HTTP failure, logging the original.
/// `context` is what the caller was doing, used both for the log line
/// and as the client-visible message for internal errors.
pub fn port_failure(context: &str, err: PortError) -> ApiFailure {
    error!("{}: {:?}", context, err);
    match err {
        PortError::NotFound(message) => failure(StatusCode::NOT_FOUND, message),
        PortError::Unauthorized => failure(StatusCode::UNAUTHORIZED, "Unauthorized"),
        PortError::Unexpected(_) | PortError::MalformedResponse(_) => {
            failure(StatusCode::INTERNAL_SERVER_ERROR, context)
        }
    }
}
