//! services/api/src/web/profile.rs
//!
//! Study-profile endpoints: subjects, daily goal, study style and exams.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_planner_core::domain::{AuthUser, Exam, StudyStyle, UserProfile};
use utoipa::ToSchema;

use crate::web::rest::{failure, port_failure, ApiFailure, MessageResponse};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ExamBody {
    pub subject: String,
    pub date: NaiveDate,
}

/// Wire shape of a profile, used for both reads and updates.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ProfileBody {
    #[serde(default)]
    pub name: String,
    pub subjects: Vec<String>,
    pub daily_goal: u32,
    pub study_style: String,
    #[serde(default)]
    pub exams: Vec<ExamBody>,
}

impl From<UserProfile> for ProfileBody {
    fn from(profile: UserProfile) -> Self {
        Self {
            name: profile.name,
            subjects: profile.subjects,
            daily_goal: profile.daily_goal_hours,
            study_style: profile.study_style.as_str().to_string(),
            exams: profile
                .exams
                .into_iter()
                .map(|e| ExamBody {
                    subject: e.subject,
                    date: e.date,
                })
                .collect(),
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/profile - The caller's study profile
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "The caller's profile", body = ProfileBody),
        (status = 404, description = "No profile exists for this user")
    ),
    security(("bearer_token" = []))
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiFailure> {
    let profile = state
        .db
        .get_profile(auth.user_id)
        .await
        .map_err(|e| port_failure("Failed to load profile", e))?;
    Ok(Json(ProfileBody::from(profile)))
}

/// PUT /api/profile - Replace the caller's study profile
#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = ProfileBody,
    responses(
        (status = 200, description = "Profile saved", body = MessageResponse),
        (status = 400, description = "Invalid goal or study style")
    ),
    security(("bearer_token" = []))
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<ProfileBody>,
) -> Result<impl IntoResponse, ApiFailure> {
    let study_style = StudyStyle::parse(&body.study_style).ok_or_else(|| {
        failure(
            StatusCode::BAD_REQUEST,
            format!("Unknown study style: {}", body.study_style),
        )
    })?;

    if !(1..=24).contains(&body.daily_goal) {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "Daily goal must be between 1 and 24 hours",
        ));
    }

    let mut profile = UserProfile {
        name: body.name.trim().to_string(),
        subjects: body.subjects,
        daily_goal_hours: body.daily_goal,
        study_style,
        exams: body
            .exams
            .into_iter()
            .map(|e| Exam {
                subject: e.subject,
                date: e.date,
            })
            .collect(),
    };
    profile.dedup_subjects();

    state
        .db
        .set_profile(auth.user_id, &profile)
        .await
        .map_err(|e| port_failure("Failed to save profile", e))?;

    Ok(Json(MessageResponse::new("Profile saved")))
}
