//! crates/study_planner_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{
    AdminStats, AuthUser, DaySchedule, PlannedWeek, Settings, StudySession, UserAccount,
    UserCredentials, UserProfile,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Malformed response from an external service: {0}")]
    MalformedResponse(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<UserAccount>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn list_users(&self) -> PortResult<Vec<UserAccount>>;

    /// Creates the default admin account if no admin exists yet.
    /// Returns true when a new admin was seeded.
    async fn ensure_admin(&self, email: &str, hashed_password: &str) -> PortResult<bool>;

    // --- Auth Methods ---
    async fn create_auth_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Validates a bearer token: it must exist and be unexpired.
    async fn validate_auth_session(&self, token: &str) -> PortResult<AuthUser>;

    async fn delete_auth_session(&self, token: &str) -> PortResult<()>;

    // --- Profile Management ---
    async fn get_profile(&self, user_id: Uuid) -> PortResult<UserProfile>;

    async fn set_profile(&self, user_id: Uuid, profile: &UserProfile) -> PortResult<()>;

    // --- Study Session Log ---
    async fn log_session(&self, session: &StudySession) -> PortResult<()>;

    async fn list_sessions(&self, user_id: Uuid) -> PortResult<Vec<StudySession>>;

    async fn sessions_for_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> PortResult<Vec<StudySession>>;

    // --- Schedules (single slot per user, last-write-wins) ---
    async fn get_latest_schedule(&self, user_id: Uuid) -> PortResult<Option<PlannedWeek>>;

    async fn save_schedule(&self, user_id: Uuid, plan: &PlannedWeek) -> PortResult<()>;

    // --- Settings ---
    async fn get_settings(&self, user_id: Uuid) -> PortResult<Settings>;

    async fn set_settings(&self, user_id: Uuid, settings: &Settings) -> PortResult<()>;

    // --- Admin Aggregates ---
    async fn admin_stats(&self) -> PortResult<AdminStats>;
}

/// The external AI planner. Implementations must validate the response
/// shape and return `PortError` for anything malformed; the caller turns
/// that into the deterministic fallback.
#[async_trait]
pub trait SchedulePlannerService: Send + Sync {
    async fn generate_week(
        &self,
        profile: &UserProfile,
        now: DateTime<Utc>,
    ) -> PortResult<Vec<DaySchedule>>;
}

#[async_trait]
pub trait StudyTipService: Send + Sync {
    /// Produces one short, actionable study tip for the given subjects.
    async fn daily_tip(&self, subjects: &[String]) -> PortResult<String>;
}
