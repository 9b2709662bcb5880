//! crates/study_planner_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or web framework;
//! serde derives exist because schedules cross the REST boundary and
//! are persisted as a JSON column.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single logged study interval. Append-only: the `completed` flag is
/// fixed at logging time from the caller's payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub topic: Option<String>,
    pub duration_minutes: u32,
    pub completed: bool,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Derived streak summary. Never a source of truth; recomputed from the
/// distinct completed dates on every read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current: u32,
    pub longest: u32,
}

/// How the user prefers to chunk study time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyStyle {
    Pomodoro,
    Deep,
    #[default]
    Mixed,
}

impl StudyStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            StudyStyle::Pomodoro => "pomodoro",
            StudyStyle::Deep => "deep",
            StudyStyle::Mixed => "mixed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pomodoro" => Some(StudyStyle::Pomodoro),
            "deep" => Some(StudyStyle::Deep),
            "mixed" => Some(StudyStyle::Mixed),
            _ => None,
        }
    }

    /// Session length in minutes for this style.
    pub fn session_minutes(self) -> u32 {
        match self {
            StudyStyle::Pomodoro => 25,
            StudyStyle::Deep => 90,
            StudyStyle::Mixed => 50,
        }
    }

    /// Break length in minutes for this style.
    pub fn break_minutes(self) -> u32 {
        match self {
            StudyStyle::Pomodoro => 5,
            StudyStyle::Deep => 15,
            StudyStyle::Mixed => 10,
        }
    }
}

/// An upcoming exam tied to one of the profile's subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    pub subject: String,
    pub date: NaiveDate,
}

/// The study profile the scheduler and progress views consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub subjects: Vec<String>,
    pub daily_goal_hours: u32,
    pub study_style: StudyStyle,
    pub exams: Vec<Exam>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            subjects: Vec::new(),
            daily_goal_hours: 4,
            study_style: StudyStyle::default(),
            exams: Vec::new(),
        }
    }
}

impl UserProfile {
    /// Adds a subject, preserving insertion order. Returns false if the
    /// subject is blank or already present.
    pub fn add_subject(&mut self, subject: &str) -> bool {
        let subject = subject.trim();
        if subject.is_empty() || self.subjects.iter().any(|s| s == subject) {
            return false;
        }
        self.subjects.push(subject.to_string());
        true
    }

    /// Re-applies the add-time rules to an externally supplied subject
    /// list: trims entries, drops blanks, removes duplicates while
    /// keeping first-seen order.
    pub fn dedup_subjects(&mut self) {
        let mut seen: Vec<String> = Vec::with_capacity(self.subjects.len());
        for s in self.subjects.drain(..) {
            let s = s.trim().to_string();
            if !s.is_empty() && !seen.contains(&s) {
                seen.push(s);
            }
        }
        self.subjects = seen;
    }
}

/// One time-boxed interval inside a day's plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub id: String,
    /// Display range, "HH:MM - HH:MM".
    pub time: String,
    pub subject: String,
    pub topic: String,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub completed: bool,
}

/// One of the seven days in a generated schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day: String,
    pub date: NaiveDate,
    pub slots: Vec<ScheduleSlot>,
}

/// Marks where a schedule came from, so the UI can tell the user when
/// the deterministic fallback was substituted for the AI planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleSource {
    #[serde(rename = "ai")]
    Ai,
    #[serde(rename = "rule-based")]
    RuleBased,
}

impl ScheduleSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleSource::Ai => "ai",
            ScheduleSource::RuleBased => "rule-based",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ai" => Some(ScheduleSource::Ai),
            "rule-based" => Some(ScheduleSource::RuleBased),
            _ => None,
        }
    }
}

/// A full 7-day plan. Replaces any previously saved plan wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedWeek {
    pub generated_at: DateTime<Utc>,
    pub source: ScheduleSource,
    pub week: Vec<DaySchedule>,
}

/// Why the deterministic scheduler was used instead of the AI planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum FallbackReason {
    /// No planner is configured (e.g. no API key).
    PlannerUnavailable,
    /// The planner call itself failed.
    ServiceError(String),
    /// The planner answered, but the payload did not validate.
    MalformedResponse(String),
}

/// Outcome of a schedule generation request. The substitution path is a
/// first-class variant rather than a caught exception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    AiGenerated(PlannedWeek),
    Fallback {
        plan: PlannedWeek,
        reason: FallbackReason,
    },
}

impl ScheduleOutcome {
    pub fn plan(&self) -> &PlannedWeek {
        match self {
            ScheduleOutcome::AiGenerated(plan) => plan,
            ScheduleOutcome::Fallback { plan, .. } => plan,
        }
    }

    pub fn into_plan(self) -> PlannedWeek {
        match self {
            ScheduleOutcome::AiGenerated(plan) => plan,
            ScheduleOutcome::Fallback { plan, .. } => plan,
        }
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            ScheduleOutcome::AiGenerated(_) => None,
            ScheduleOutcome::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Account role. Admins get the aggregate stats endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

// Represents a user account - used throughout the app.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub hashed_password: String,
}

/// The authenticated caller attached to a request after token validation.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

/// Per-user UI preferences.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Settings {
    pub dark_mode: bool,
    pub notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            notifications: true,
        }
    }
}

/// Aggregate usage numbers for the admin dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: u64,
    /// Sum of completed-session minutes, converted to whole hours.
    pub total_hours: u64,
    /// Distinct users with at least one saved schedule.
    pub active_schedules: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_subject_enforces_uniqueness_and_order() {
        let mut profile = UserProfile::default();
        assert!(profile.add_subject("Math"));
        assert!(profile.add_subject("Physics"));
        assert!(!profile.add_subject("Math"));
        assert!(!profile.add_subject("   "));
        assert_eq!(profile.subjects, vec!["Math", "Physics"]);
    }

    #[test]
    fn dedup_subjects_keeps_first_seen_order() {
        let mut profile = UserProfile {
            subjects: vec![
                "Math".into(),
                " Physics ".into(),
                "Math".into(),
                "".into(),
                "Chemistry".into(),
            ],
            ..UserProfile::default()
        };
        profile.dedup_subjects();
        assert_eq!(profile.subjects, vec!["Math", "Physics", "Chemistry"]);
    }

    #[test]
    fn study_style_cadence() {
        assert_eq!(StudyStyle::Pomodoro.session_minutes(), 25);
        assert_eq!(StudyStyle::Pomodoro.break_minutes(), 5);
        assert_eq!(StudyStyle::Deep.session_minutes(), 90);
        assert_eq!(StudyStyle::Deep.break_minutes(), 15);
        assert_eq!(StudyStyle::Mixed.session_minutes(), 50);
        assert_eq!(StudyStyle::Mixed.break_minutes(), 10);
    }
}
