//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the single-file SQLite store using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqlitePool};
use study_planner_core::domain::{
    AdminStats, AuthUser, PlannedWeek, Role, ScheduleSource, Settings, StudySession, StudyStyle,
    UserAccount, UserCredentials, UserProfile,
};
use study_planner_core::ports::{DatabaseService, PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// Decoding Helpers
//=========================================================================================

fn parse_uuid(value: &str) -> PortResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| PortError::Unexpected(format!("Invalid UUID in database: {}", e)))
}

fn parse_timestamp(value: &str) -> PortResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| PortError::Unexpected(format!("Invalid timestamp in database: {}", e)))
}

fn parse_date(value: &str) -> PortResult<NaiveDate> {
    value
        .parse::<NaiveDate>()
        .map_err(|e| PortError::Unexpected(format!("Invalid date in database: {}", e)))
}

fn parse_role(value: &str) -> PortResult<Role> {
    Role::parse(value)
        .ok_or_else(|| PortError::Unexpected(format!("Unknown role in database: {}", value)))
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: String,
    name: String,
    email: String,
    role: String,
    created_at: String,
}

impl UserRecord {
    fn to_domain(self) -> PortResult<UserAccount> {
        Ok(UserAccount {
            id: parse_uuid(&self.id)?,
            name: self.name,
            email: self.email,
            role: parse_role(&self.role)?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: String,
    name: String,
    email: String,
    role: String,
    password_hash: String,
}

impl CredentialsRecord {
    fn to_domain(self) -> PortResult<UserCredentials> {
        Ok(UserCredentials {
            user_id: parse_uuid(&self.id)?,
            name: self.name,
            email: self.email,
            role: parse_role(&self.role)?,
            hashed_password: self.password_hash,
        })
    }
}

#[derive(FromRow)]
struct ProfileRecord {
    name: String,
    subjects_json: String,
    daily_goal: i64,
    study_style: String,
    exams_json: String,
}

impl ProfileRecord {
    fn to_domain(self) -> PortResult<UserProfile> {
        let subjects = serde_json::from_str(&self.subjects_json)
            .map_err(|e| PortError::Unexpected(format!("Invalid subjects JSON: {}", e)))?;
        let exams = serde_json::from_str(&self.exams_json)
            .map_err(|e| PortError::Unexpected(format!("Invalid exams JSON: {}", e)))?;
        let study_style = StudyStyle::parse(&self.study_style).ok_or_else(|| {
            PortError::Unexpected(format!("Unknown study style: {}", self.study_style))
        })?;
        Ok(UserProfile {
            name: self.name,
            subjects,
            daily_goal_hours: self.daily_goal.max(0) as u32,
            study_style,
            exams,
        })
    }
}

#[derive(FromRow)]
struct SessionRecord {
    id: String,
    user_id: String,
    subject: String,
    topic: Option<String>,
    duration: i64,
    completed: bool,
    date: String,
    created_at: String,
}

impl SessionRecord {
    fn to_domain(self) -> PortResult<StudySession> {
        Ok(StudySession {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            subject: self.subject,
            topic: self.topic,
            duration_minutes: self.duration.max(0) as u32,
            completed: self.completed,
            date: parse_date(&self.date)?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

#[derive(FromRow)]
struct ScheduleRecord {
    week_json: String,
    source: String,
    generated_at: String,
}

impl ScheduleRecord {
    fn to_domain(self) -> PortResult<PlannedWeek> {
        let week = serde_json::from_str(&self.week_json)
            .map_err(|e| PortError::Unexpected(format!("Invalid schedule JSON: {}", e)))?;
        let source = ScheduleSource::parse(&self.source).ok_or_else(|| {
            PortError::Unexpected(format!("Unknown schedule source: {}", self.source))
        })?;
        Ok(PlannedWeek {
            generated_at: parse_timestamp(&self.generated_at)?,
            source,
            week,
        })
    }
}

#[derive(FromRow)]
struct SettingsRecord {
    dark_mode: bool,
    notifications: bool,
}

impl SettingsRecord {
    fn to_domain(self) -> Settings {
        Settings {
            dark_mode: self.dark_mode,
            notifications: self.notifications,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<UserAccount> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, created_at)
             VALUES (?, ?, ?, ?, 'user', ?)",
        )
        .bind(id.to_string())
        .bind(name)
        .bind(email)
        .bind(hashed_password)
        .bind(created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        // Every account starts with a default profile and settings row.
        sqlx::query("INSERT INTO profiles (user_id, name) VALUES (?, ?)")
            .bind(id.to_string())
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        sqlx::query("INSERT INTO settings (user_id) VALUES (?)")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;

        Ok(UserAccount {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role: Role::User,
            created_at,
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, name, email, role, password_hash FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => unexpected(e),
        })?;
        record.to_domain()
    }

    async fn list_users(&self) -> PortResult<Vec<UserAccount>> {
        let records = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, role, created_at FROM users ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn ensure_admin(&self, email: &str, hashed_password: &str) -> PortResult<bool> {
        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'admin'")
                .fetch_one(&self.pool)
                .await
                .map_err(unexpected)?;
        if existing > 0 {
            return Ok(false);
        }

        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, created_at)
             VALUES (?, 'Admin', ?, ?, 'admin', ?)",
        )
        .bind(id.to_string())
        .bind(email)
        .bind(hashed_password)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;
        sqlx::query("INSERT INTO profiles (user_id, name) VALUES (?, 'Admin')")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        sqlx::query("INSERT INTO settings (user_id) VALUES (?)")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        tx.commit().await.map_err(unexpected)?;

        Ok(true)
    }

    async fn create_auth_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (token, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(token)
            .bind(user_id.to_string())
            .bind(expires_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, token: &str) -> PortResult<AuthUser> {
        let row = sqlx::query_as::<_, (String, String, String)>(
            "SELECT s.user_id, s.expires_at, u.role
             FROM auth_sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        let (user_id, expires_at, role) = row.ok_or(PortError::Unauthorized)?;

        if parse_timestamp(&expires_at)? < Utc::now() {
            // Expired tokens are removed eagerly so they cannot pile up.
            self.delete_auth_session(token).await?;
            return Err(PortError::Unauthorized);
        }

        Ok(AuthUser {
            user_id: parse_uuid(&user_id)?,
            role: parse_role(&role)?,
        })
    }

    async fn delete_auth_session(&self, token: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn get_profile(&self, user_id: Uuid) -> PortResult<UserProfile> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT name, subjects_json, daily_goal, study_style, exams_json
             FROM profiles WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Profile for user {} not found", user_id))
            }
            _ => unexpected(e),
        })?;
        record.to_domain()
    }

    async fn set_profile(&self, user_id: Uuid, profile: &UserProfile) -> PortResult<()> {
        let subjects_json = serde_json::to_string(&profile.subjects)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let exams_json = serde_json::to_string(&profile.exams)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        sqlx::query(
            "INSERT INTO profiles (user_id, name, subjects_json, daily_goal, study_style, exams_json)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                 name = excluded.name,
                 subjects_json = excluded.subjects_json,
                 daily_goal = excluded.daily_goal,
                 study_style = excluded.study_style,
                 exams_json = excluded.exams_json",
        )
        .bind(user_id.to_string())
        .bind(&profile.name)
        .bind(subjects_json)
        .bind(i64::from(profile.daily_goal_hours))
        .bind(profile.study_style.as_str())
        .bind(exams_json)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn log_session(&self, session: &StudySession) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO study_sessions (id, user_id, subject, topic, duration, completed, date, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(session.id.to_string())
        .bind(session.user_id.to_string())
        .bind(&session.subject)
        .bind(&session.topic)
        .bind(i64::from(session.duration_minutes))
        .bind(session.completed)
        .bind(session.date.to_string())
        .bind(session.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn list_sessions(&self, user_id: Uuid) -> PortResult<Vec<StudySession>> {
        let records = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, user_id, subject, topic, duration, completed, date, created_at
             FROM study_sessions WHERE user_id = ? ORDER BY date ASC, created_at ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn sessions_for_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> PortResult<Vec<StudySession>> {
        let records = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, user_id, subject, topic, duration, completed, date, created_at
             FROM study_sessions WHERE user_id = ? AND date = ? ORDER BY created_at ASC",
        )
        .bind(user_id.to_string())
        .bind(date.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_latest_schedule(&self, user_id: Uuid) -> PortResult<Option<PlannedWeek>> {
        let record = sqlx::query_as::<_, ScheduleRecord>(
            "SELECT week_json, source, generated_at FROM schedules WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        record.map(|r| r.to_domain()).transpose()
    }

    async fn save_schedule(&self, user_id: Uuid, plan: &PlannedWeek) -> PortResult<()> {
        let week_json = serde_json::to_string(&plan.week)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        sqlx::query(
            "INSERT INTO schedules (user_id, week_json, source, generated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                 week_json = excluded.week_json,
                 source = excluded.source,
                 generated_at = excluded.generated_at",
        )
        .bind(user_id.to_string())
        .bind(week_json)
        .bind(plan.source.as_str())
        .bind(plan.generated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_settings(&self, user_id: Uuid) -> PortResult<Settings> {
        let record = sqlx::query_as::<_, SettingsRecord>(
            "SELECT dark_mode, notifications FROM settings WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Settings for user {} not found", user_id))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn set_settings(&self, user_id: Uuid, settings: &Settings) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO settings (user_id, dark_mode, notifications)
             VALUES (?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                 dark_mode = excluded.dark_mode,
                 notifications = excluded.notifications",
        )
        .bind(user_id.to_string())
        .bind(settings.dark_mode)
        .bind(settings.notifications)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn admin_stats(&self) -> PortResult<AdminStats> {
        let total_users =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'user'")
                .fetch_one(&self.pool)
                .await
                .map_err(unexpected)?;

        let total_minutes = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(duration), 0) FROM study_sessions WHERE completed = 1",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        let active_schedules =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT user_id) FROM schedules")
                .fetch_one(&self.pool)
                .await
                .map_err(unexpected)?;

        Ok(AdminStats {
            total_users: total_users.max(0) as u64,
            total_hours: (total_minutes.max(0) as f64 / 60.0).round() as u64,
            active_schedules: active_schedules.max(0) as u64,
        })
    }
}
