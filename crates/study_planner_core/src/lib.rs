pub mod domain;
pub mod ports;
pub mod progress;
pub mod scheduler;
pub mod streaks;
pub mod tips;

pub use domain::{
    AdminStats, AuthUser, DaySchedule, Exam, FallbackReason, PlannedWeek, Role, ScheduleOutcome,
    ScheduleSlot, ScheduleSource, Settings, StreakState, StudySession, StudyStyle, UserAccount,
    UserCredentials, UserProfile,
};
pub use ports::{
    DatabaseService, PortError, PortResult, SchedulePlannerService, StudyTipService,
};
