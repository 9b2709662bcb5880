//! crates/study_planner_core/src/progress.rs
//!
//! Progress aggregation over a session snapshot: today's completion
//! percentage, the calendar-week view and the trailing heatmap window.
//! All functions are pure; the dashboard supplies sessions, goal and
//! evaluation date explicitly.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::StudySession;

/// Substituted whenever the profile carries no usable daily goal, so the
/// percent computation never divides by zero.
pub const DEFAULT_DAILY_GOAL_HOURS: u32 = 4;

/// Default trailing window for the heatmap, in days (13 weeks).
pub const DEFAULT_HEATMAP_DAYS: u32 = 91;

/// Today's completion relative to the daily goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayProgress {
    pub completed_minutes: u32,
    pub goal_minutes: u32,
    /// 0..=100, rounded.
    pub percent: u32,
}

/// Planned vs completed hours for one weekday bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayLoad {
    pub name: &'static str,
    pub planned_hours: f64,
    pub completed_hours: f64,
}

/// One cell of the consistency heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub minutes: u32,
    /// Ordinal intensity bucket, 0..=4.
    pub level: u8,
}

const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Sums completed minutes on `today` and derives the goal percentage.
/// A zero goal substitutes [`DEFAULT_DAILY_GOAL_HOURS`].
pub fn today_progress(
    sessions: &[StudySession],
    daily_goal_hours: u32,
    today: NaiveDate,
) -> TodayProgress {
    let completed_minutes: u32 = sessions
        .iter()
        .filter(|s| s.completed && s.date == today)
        .map(|s| s.duration_minutes)
        .sum();

    let goal_hours = if daily_goal_hours == 0 {
        DEFAULT_DAILY_GOAL_HOURS
    } else {
        daily_goal_hours
    };
    let goal_minutes = goal_hours * 60;

    let percent = ((completed_minutes as f64 / goal_minutes as f64) * 100.0).round() as u32;

    TodayProgress {
        completed_minutes,
        goal_minutes,
        percent: percent.min(100),
    }
}

/// Buckets every session by absolute weekday (Sun..Sat), summing planned
/// minutes over all sessions and completed minutes over completed ones,
/// then converts to hours rounded to one decimal.
///
/// These are calendar-weekday buckets, not a rolling 7-day window: with a
/// multi-week history each bucket accumulates every matching weekday.
pub fn weekly_overview(sessions: &[StudySession]) -> Vec<WeekdayLoad> {
    let mut planned = [0u32; 7];
    let mut completed = [0u32; 7];

    for s in sessions {
        let idx = s.date.weekday().num_days_from_sunday() as usize;
        planned[idx] += s.duration_minutes;
        if s.completed {
            completed[idx] += s.duration_minutes;
        }
    }

    WEEKDAY_NAMES
        .iter()
        .copied()
        .enumerate()
        .map(|(i, name)| WeekdayLoad {
            name,
            planned_hours: minutes_to_hours(planned[i]),
            completed_hours: minutes_to_hours(completed[i]),
        })
        .collect()
}

/// Builds the trailing `days`-day heatmap ending at `today` inclusive,
/// oldest day first. Days without completed sessions are level 0.
pub fn heatmap(sessions: &[StudySession], days: u32, today: NaiveDate) -> Vec<HeatmapDay> {
    let mut minutes_by_date: HashMap<NaiveDate, u32> = HashMap::new();
    for s in sessions.iter().filter(|s| s.completed) {
        *minutes_by_date.entry(s.date).or_insert(0) += s.duration_minutes;
    }

    (0..days)
        .rev()
        .filter_map(|i| today.checked_sub_days(Days::new(u64::from(i))))
        .map(|date| {
            let minutes = minutes_by_date.get(&date).copied().unwrap_or(0);
            HeatmapDay {
                date,
                minutes,
                level: intensity_level(minutes),
            }
        })
        .collect()
}

/// Ordinal intensity bucket for one day's completed minutes.
pub fn intensity_level(minutes: u32) -> u8 {
    match minutes {
        0 => 0,
        m if m < 60 => 1,
        m if m < 120 => 2,
        m if m < 180 => 3,
        _ => 4,
    }
}

fn minutes_to_hours(minutes: u32) -> f64 {
    (minutes as f64 / 60.0 * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session(d: NaiveDate, minutes: u32, completed: bool) -> StudySession {
        StudySession {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            subject: "Math".into(),
            topic: None,
            duration_minutes: minutes,
            completed,
            date: d,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn today_progress_sums_only_completed_today() {
        let today = date(2024, 5, 20);
        let sessions = vec![
            session(today, 60, true),
            session(today, 30, false),
            session(date(2024, 5, 19), 45, true),
        ];
        let progress = today_progress(&sessions, 2, today);
        assert_eq!(progress.completed_minutes, 60);
        assert_eq!(progress.goal_minutes, 120);
        assert_eq!(progress.percent, 50);
    }

    #[test]
    fn percent_is_capped_at_one_hundred() {
        let today = date(2024, 5, 20);
        let sessions = vec![session(today, 500, true)];
        assert_eq!(today_progress(&sessions, 1, today).percent, 100);
    }

    #[test]
    fn zero_goal_substitutes_the_default() {
        let today = date(2024, 5, 20);
        let sessions = vec![session(today, 120, true)];
        let progress = today_progress(&sessions, 0, today);
        assert_eq!(progress.goal_minutes, DEFAULT_DAILY_GOAL_HOURS * 60);
        assert_eq!(progress.percent, 50);
    }

    #[test]
    fn percent_rounds_to_nearest() {
        let today = date(2024, 5, 20);
        // 100 / 240 = 41.67 -> 42
        let sessions = vec![session(today, 100, true)];
        assert_eq!(today_progress(&sessions, 4, today).percent, 42);
    }

    #[test]
    fn weekly_single_hour_session_rounds_to_one() {
        // 2024-05-20 is a Monday.
        let sessions = vec![session(date(2024, 5, 20), 60, true)];
        let week = weekly_overview(&sessions);
        assert_eq!(week.len(), 7);
        assert_eq!(week[1].name, "Mon");
        assert_eq!(week[1].completed_hours, 1.0);
        assert_eq!(week[1].planned_hours, 1.0);
        assert_eq!(week[0].planned_hours, 0.0);
    }

    #[test]
    fn weekly_counts_planned_and_completed_separately() {
        let monday = date(2024, 5, 20);
        let sessions = vec![
            session(monday, 50, true),
            session(monday, 25, false),
            // Same weekday one calendar week earlier lands in the same
            // bucket: absolute weekday, not a rolling window.
            session(date(2024, 5, 13), 25, true),
        ];
        let week = weekly_overview(&sessions);
        assert_eq!(week[1].planned_hours, 1.7);
        assert_eq!(week[1].completed_hours, 1.3);
    }

    #[test]
    fn heatmap_window_is_fixed_length_oldest_first() {
        let today = date(2024, 5, 20);
        let map = heatmap(&[], 91, today);
        assert_eq!(map.len(), 91);
        assert_eq!(map[0].date, date(2024, 2, 20));
        assert_eq!(map[90].date, today);
        assert!(map.iter().all(|d| d.level == 0 && d.minutes == 0));
    }

    #[test]
    fn heatmap_buckets_a_ninety_minute_day() {
        let today = date(2024, 5, 20);
        let target = date(2024, 5, 17); // index 3 counting from oldest = 0
        let sessions = vec![session(target, 90, true)];
        let map = heatmap(&sessions, 7, today);
        assert_eq!(map.len(), 7);
        assert_eq!(map[3].date, target);
        assert_eq!(map[3].minutes, 90);
        assert_eq!(map[3].level, 2);
        for (i, day) in map.iter().enumerate() {
            if i != 3 {
                assert_eq!(day.level, 0);
            }
        }
    }

    #[test]
    fn heatmap_sums_multiple_sessions_per_day() {
        let today = date(2024, 5, 20);
        let sessions = vec![
            session(today, 100, true),
            session(today, 80, true),
            session(today, 30, false),
        ];
        let map = heatmap(&sessions, 1, today);
        assert_eq!(map[0].minutes, 180);
        assert_eq!(map[0].level, 4);
    }

    #[test]
    fn intensity_level_boundaries() {
        assert_eq!(intensity_level(0), 0);
        assert_eq!(intensity_level(1), 1);
        assert_eq!(intensity_level(59), 1);
        assert_eq!(intensity_level(60), 2);
        assert_eq!(intensity_level(119), 2);
        assert_eq!(intensity_level(120), 3);
        assert_eq!(intensity_level(179), 3);
        assert_eq!(intensity_level(180), 4);
    }
}
