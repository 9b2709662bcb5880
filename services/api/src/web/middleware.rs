//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use study_planner_core::domain::Role;
use tracing::error;

use crate::web::rest::{failure, ApiFailure};
use crate::web::state::AppState;

/// Pulls the opaque session token out of the `Authorization: Bearer`
/// header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that validates the bearer token and extracts the caller.
///
/// If valid, inserts an `AuthUser` into request extensions for handlers to use.
/// A missing token is 403, an invalid or expired one 401.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiFailure> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| failure(StatusCode::FORBIDDEN, "No token provided"))?;

    let auth_user = state
        .db
        .validate_auth_session(token)
        .await
        .map_err(|e| {
            error!("Failed to validate auth session: {:?}", e);
            failure(StatusCode::UNAUTHORIZED, "Unauthorized")
        })?;

    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}

/// Middleware for the admin surface: same token validation, plus the
/// caller must hold the admin role.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiFailure> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| failure(StatusCode::FORBIDDEN, "No token provided"))?;

    let auth_user = state
        .db
        .validate_auth_session(token)
        .await
        .map_err(|e| {
            error!("Failed to validate auth session: {:?}", e);
            failure(StatusCode::UNAUTHORIZED, "Unauthorized")
        })?;

    if auth_user.role != Role::Admin {
        return Err(failure(StatusCode::UNAUTHORIZED, "Admin access required"));
    }

    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_a_bearer_token() {
        let headers = headers_with("Bearer abc-123");
        assert_eq!(bearer_token(&headers), Some("abc-123"));
    }

    #[test]
    fn rejects_missing_or_misshapen_headers() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers_with("abc-123")), None);
        assert_eq!(bearer_token(&headers_with("Basic abc-123")), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
    }
}
