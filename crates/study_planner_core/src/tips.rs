//! crates/study_planner_core/src/tips.rs
//!
//! Built-in study tips used when no AI tip service is configured or the
//! call fails. Rotation is keyed on the day of year so the whole app
//! agrees on one tip per day without any randomness.

use chrono::{Datelike, NaiveDate};

const TIPS: [&str; 6] = [
    "Use active recall: close your notes and try to write down everything you remember. This is 3x more effective than re-reading.",
    "Study in 25-minute focused blocks with 5-minute breaks. Your brain consolidates memory during rest.",
    "Teach what you just learned to an imaginary student. If you can explain it simply, you understand it deeply.",
    "Start your session with the hardest topic when your energy is highest. Save easier reviews for later.",
    "Space your reviews — revisit yesterday's material for 5 minutes before starting today's new content.",
    "Write practice questions as you study. Testing yourself is twice as effective as highlighting.",
];

/// The built-in tip for a given date.
pub fn fallback_tip(date: NaiveDate) -> &'static str {
    TIPS[date.ordinal0() as usize % TIPS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tip_is_stable_for_a_date_and_rotates_daily() {
        let day1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(fallback_tip(day1), fallback_tip(day1));
        assert_ne!(fallback_tip(day1), fallback_tip(day2));
    }

    #[test]
    fn rotation_wraps_around_the_pool() {
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let wrapped = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(fallback_tip(first), fallback_tip(wrapped));
    }
}
