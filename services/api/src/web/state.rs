//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use study_planner_core::ports::{DatabaseService, SchedulePlannerService, StudyTipService};

/// The shared application state, created once at startup and passed to all handlers.
///
/// The AI ports are optional: when no API key is configured the planner
/// slot stays `None` and schedule generation runs the rule-based
/// fallback instead of refusing to start.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub planner: Option<Arc<dyn SchedulePlannerService>>,
    pub tips: Option<Arc<dyn StudyTipService>>,
}
