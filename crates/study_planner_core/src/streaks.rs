//! crates/study_planner_core/src/streaks.rs
//!
//! Consecutive-day streak computation over the distinct dates that have
//! at least one completed session. Pure: the caller supplies the date
//! snapshot and the evaluation date, nothing is read from ambient state.

use chrono::NaiveDate;

use crate::domain::{StreakState, StudySession};

/// Extracts the ascending, distinct list of dates with at least one
/// completed session. ISO dates sort lexically, so a plain sort is
/// already chronological.
pub fn completed_dates(sessions: &[StudySession]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = sessions
        .iter()
        .filter(|s| s.completed)
        .map(|s| s.date)
        .collect();
    dates.sort();
    dates.dedup();
    dates
}

/// Computes the current and longest streak from ascending distinct
/// completed dates.
///
/// The current streak counts the trailing run of consecutive days, but
/// only while the most recent completed date is `today` or yesterday;
/// any older latest date means the streak is broken and `current` is 0.
/// `longest` scans the whole history and is floored at 1 once any
/// completed date exists.
pub fn calculate(completed_dates: &[NaiveDate], today: NaiveDate) -> StreakState {
    if completed_dates.is_empty() {
        return StreakState::default();
    }

    let yesterday = today.pred_opt().unwrap_or(today);
    let latest = completed_dates[completed_dates.len() - 1];

    let current = if latest != today && latest != yesterday {
        0
    } else {
        let mut streak = 1u32;
        for pair in completed_dates.windows(2).rev() {
            if (pair[1] - pair[0]).num_days() == 1 {
                streak += 1;
            } else {
                break;
            }
        }
        streak
    };

    let mut longest = 0u32;
    let mut run = 1u32;
    for pair in completed_dates.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }
    longest = longest.max(current).max(1);

    StreakState { current, longest }
}

/// Convenience wrapper: streaks straight from a session snapshot.
pub fn calculate_from_sessions(sessions: &[StudySession], today: NaiveDate) -> StreakState {
    calculate(&completed_dates(sessions), today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session(d: NaiveDate, completed: bool) -> StudySession {
        StudySession {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            subject: "Math".into(),
            topic: None,
            duration_minutes: 30,
            completed,
            date: d,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn empty_history_yields_zeroes() {
        let today = date(2024, 5, 20);
        assert_eq!(calculate(&[], today), StreakState::default());
    }

    #[test]
    fn single_completed_date_today() {
        let today = date(2024, 5, 20);
        let state = calculate(&[today], today);
        assert_eq!(state, StreakState { current: 1, longest: 1 });
    }

    #[test]
    fn run_ending_today_counts_fully() {
        // Property: a single run of K consecutive days ending today gives
        // current == longest == K.
        let today = date(2024, 5, 20);
        let dates: Vec<NaiveDate> = (0..5).rev().map(|i| today - chrono::Days::new(i)).collect();
        let state = calculate(&dates, today);
        assert_eq!(state, StreakState { current: 5, longest: 5 });
    }

    #[test]
    fn run_ending_yesterday_stays_alive() {
        let today = date(2024, 5, 20);
        let dates = vec![date(2024, 5, 17), date(2024, 5, 18), date(2024, 5, 19)];
        let state = calculate(&dates, today);
        assert_eq!(state, StreakState { current: 3, longest: 3 });
    }

    #[test]
    fn stale_latest_date_breaks_current() {
        // Latest completed date is older than yesterday: current resets,
        // longest remembers the best historical run.
        let today = date(2024, 5, 20);
        let dates = vec![
            date(2024, 5, 10),
            date(2024, 5, 11),
            date(2024, 5, 12),
            date(2024, 5, 15),
        ];
        let state = calculate(&dates, today);
        assert_eq!(state.current, 0);
        assert_eq!(state.longest, 3);
    }

    #[test]
    fn gap_before_latest_restarts_trailing_run() {
        let today = date(2024, 5, 20);
        let dates = vec![
            date(2024, 5, 14),
            date(2024, 5, 15),
            date(2024, 5, 16),
            date(2024, 5, 19),
            date(2024, 5, 20),
        ];
        let state = calculate(&dates, today);
        assert_eq!(state.current, 2);
        assert_eq!(state.longest, 3);
    }

    #[test]
    fn longest_is_floored_at_one_with_any_history() {
        let today = date(2024, 5, 20);
        let state = calculate(&[date(2024, 1, 1)], today);
        assert_eq!(state, StreakState { current: 0, longest: 1 });
    }

    #[test]
    fn longest_never_decreases_as_dates_accrue() {
        let today = date(2024, 5, 20);
        let history = vec![
            date(2024, 5, 1),
            date(2024, 5, 2),
            date(2024, 5, 3),
            date(2024, 5, 10),
            date(2024, 5, 19),
            date(2024, 5, 20),
        ];
        let mut previous = 0;
        for n in 1..=history.len() {
            let longest = calculate(&history[..n], today).longest;
            assert!(longest >= previous);
            previous = longest;
        }
    }

    #[test]
    fn completed_dates_are_distinct_and_sorted() {
        let d1 = date(2024, 5, 18);
        let d2 = date(2024, 5, 19);
        let sessions = vec![
            session(d2, true),
            session(d1, true),
            session(d1, true),
            session(d2, false),
            session(date(2024, 5, 17), false),
        ];
        assert_eq!(completed_dates(&sessions), vec![d1, d2]);
    }

    #[test]
    fn streaks_from_sessions_ignore_incomplete_days() {
        let today = date(2024, 5, 20);
        let sessions = vec![
            session(today, true),
            session(today - chrono::Days::new(1), false),
            session(today - chrono::Days::new(2), true),
        ];
        let state = calculate_from_sessions(&sessions, today);
        // The incomplete day leaves a gap, so only today counts.
        assert_eq!(state, StreakState { current: 1, longest: 1 });
    }
}
