//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user registration, login, and logout.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_planner_core::ports::PortError;
use study_planner_core::progress::DEFAULT_DAILY_GOAL_HOURS;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::middleware::bearer_token;
use crate::web::rest::{failure, port_failure, ApiFailure, MessageResponse};
use crate::web::state::AppState;

/// Bearer tokens stay valid this long after login.
const SESSION_DAYS: i64 = 30;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub daily_goal: u32,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

//=========================================================================================
// Password Hashing Helpers
//=========================================================================================

/// Hashes a password with a fresh salt. Also used to seed the admin
/// account at startup.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/register - Create a new user account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = MessageResponse),
        (status = 400, description = "Missing fields or duplicate email"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "Email and password required",
        ));
    }

    // 1. Reject duplicate accounts up front.
    match state.db.get_user_by_email(&email).await {
        Ok(_) => return Err(failure(StatusCode::BAD_REQUEST, "User already exists")),
        Err(PortError::NotFound(_)) => {}
        Err(e) => return Err(port_failure("Failed to look up user", e)),
    }

    // 2. Hash the password.
    let password_hash = hash_password(&req.password).map_err(|e| {
        error!("Failed to hash password: {:?}", e);
        failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password")
    })?;

    // 3. Create the user (with its default profile and settings rows).
    state
        .db
        .create_user(req.name.trim(), &email, &password_hash)
        .await
        .map_err(|e| port_failure("Failed to create user", e))?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// POST /api/auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let email = req.email.trim().to_lowercase();

    // 1. Get the stored credentials. Lookup failures read as bad
    // credentials so the endpoint does not leak which emails exist.
    let creds = state.db.get_user_by_email(&email).await.map_err(|e| {
        error!("Failed to get user: {:?}", e);
        failure(StatusCode::UNAUTHORIZED, "Invalid email or password")
    })?;

    // 2. Verify the password.
    let valid = verify_password(&req.password, &creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        failure(StatusCode::INTERNAL_SERVER_ERROR, "Authentication error")
    })?;
    if !valid {
        return Err(failure(
            StatusCode::UNAUTHORIZED,
            "Invalid email or password",
        ));
    }

    // 3. Issue an opaque bearer token backed by the store.
    let token = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(SESSION_DAYS);
    state
        .db
        .create_auth_session(&token, creds.user_id, expires_at)
        .await
        .map_err(|e| port_failure("Failed to create session", e))?;

    // 4. The login response carries the profile's daily goal for the
    // dashboard header.
    let daily_goal = state
        .db
        .get_profile(creds.user_id)
        .await
        .map(|p| p.daily_goal_hours)
        .unwrap_or(DEFAULT_DAILY_GOAL_HOURS);

    Ok(Json(LoginResponse {
        token,
        user: UserSummary {
            id: creds.user_id,
            name: creds.name,
            email: creds.email,
            role: creds.role.as_str().to_string(),
            daily_goal,
        },
    }))
}

/// POST /api/auth/logout - Logout and invalidate the presented token
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
        (status = 403, description = "No token presented")
    ),
    security(("bearer_token" = []))
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiFailure> {
    let token = bearer_token(&headers)
        .ok_or_else(|| failure(StatusCode::FORBIDDEN, "No token provided"))?;

    state
        .db
        .delete_auth_session(token)
        .await
        .map_err(|e| port_failure("Failed to logout", e))?;

    Ok(Json(MessageResponse::new("Logged out")))
}
