//! crates/study_planner_core/src/scheduler.rs
//!
//! The rule-based weekly scheduler and the AI-or-fallback orchestration.
//!
//! `generate_fallback` is fully deterministic: given the same profile and
//! clock it always produces the same 7-day plan. `plan_week` wraps the
//! optional AI planner port and substitutes the deterministic plan as an
//! explicit, observable outcome instead of a caught exception.

use std::cmp::Ordering;

use chrono::{DateTime, Days, Utc};

use crate::domain::{
    DaySchedule, Exam, FallbackReason, PlannedWeek, ScheduleOutcome, ScheduleSlot, ScheduleSource,
    StudyStyle, UserProfile,
};
use crate::ports::{PortError, SchedulePlannerService};

/// First slot of every day starts at this hour.
const DAY_START_HOUR: u32 = 9;

/// Category tag carried by every generated slot.
const SLOT_KIND: &str = "study";

/// Generates the deterministic 7-day plan, anchored at `now`'s date.
/// Returns `None` when the profile has no subjects; the caller must
/// prompt the user to add some.
pub fn generate_fallback(profile: &UserProfile, now: DateTime<Utc>) -> Option<PlannedWeek> {
    if profile.subjects.is_empty() {
        return None;
    }

    let ordered = order_by_exam_proximity(&profile.subjects, &profile.exams);
    let session_len = profile.study_style.session_minutes();
    let break_len = profile.study_style.break_minutes();
    let goal_minutes = profile.daily_goal_hours * 60;
    let today = now.date_naive();

    let week = (0..7u64)
        .map(|d| {
            let date = today
                .checked_add_days(Days::new(d))
                .unwrap_or(today);

            let mut slots = Vec::new();
            let mut clock = DAY_START_HOUR * 60;
            let mut session_minutes_used = 0;
            let mut subject_idx = 0usize;

            // Never start a session that would push cumulative session
            // time (breaks excluded) past the daily goal.
            while session_minutes_used + session_len <= goal_minutes {
                let subject = &ordered[subject_idx % ordered.len()];
                slots.push(ScheduleSlot {
                    id: format!("{}-{}", d, slots.len()),
                    time: format_time_range(clock, clock + session_len),
                    subject: subject.clone(),
                    topic: format!("{} — Session {}", subject, slots.len() + 1),
                    duration_minutes: session_len,
                    kind: SLOT_KIND.to_string(),
                    completed: false,
                });

                clock += session_len + break_len;
                session_minutes_used += session_len;
                subject_idx += 1;
            }

            DaySchedule {
                day: weekday_name(date),
                date,
                slots,
            }
        })
        .collect();

    Some(PlannedWeek {
        generated_at: now,
        source: ScheduleSource::RuleBased,
        week,
    })
}

/// Runs the AI planner when one is configured and falls back to the
/// deterministic schedule otherwise, tagging the result with why the
/// substitution happened. `None` means the profile has no subjects.
pub async fn plan_week(
    planner: Option<&dyn SchedulePlannerService>,
    profile: &UserProfile,
    now: DateTime<Utc>,
) -> Option<ScheduleOutcome> {
    if profile.subjects.is_empty() {
        return None;
    }

    let reason = match planner {
        None => FallbackReason::PlannerUnavailable,
        Some(planner) => match planner.generate_week(profile, now).await {
            Ok(week) => {
                return Some(ScheduleOutcome::AiGenerated(PlannedWeek {
                    generated_at: now,
                    source: ScheduleSource::Ai,
                    week,
                }));
            }
            Err(PortError::MalformedResponse(detail)) => {
                FallbackReason::MalformedResponse(detail)
            }
            Err(err) => FallbackReason::ServiceError(err.to_string()),
        },
    };

    generate_fallback(profile, now).map(|plan| ScheduleOutcome::Fallback { plan, reason })
}

/// Stable sort by ascending exam date. Subjects without an exam keep
/// their relative order after every subject that has one.
fn order_by_exam_proximity(subjects: &[String], exams: &[Exam]) -> Vec<String> {
    let mut ordered = subjects.to_vec();
    ordered.sort_by(|a, b| {
        let exam_a = exams.iter().find(|e| &e.subject == a).map(|e| e.date);
        let exam_b = exams.iter().find(|e| &e.subject == b).map(|e| e.date);
        match (exam_a, exam_b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(&b),
        }
    });
    ordered
}

fn weekday_name(date: chrono::NaiveDate) -> String {
    date.format("%A").to_string()
}

fn format_clock(minutes_since_midnight: u32) -> String {
    format!(
        "{:02}:{:02}",
        minutes_since_midnight / 60,
        minutes_since_midnight % 60
    )
}

/// Formats a slot's display range, e.g. "09:00 - 09:25".
pub fn format_time_range(start: u32, end: u32) -> String {
    format!("{} - {}", format_clock(start), format_clock(end))
}

/// Session cadence helper exposed for prompt building.
pub fn style_summary(style: StudyStyle) -> String {
    format!(
        "{} min sessions, {} min breaks",
        style.session_minutes(),
        style.break_minutes()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PortResult;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        // A Monday.
        Utc.with_ymd_and_hms(2024, 5, 20, 8, 0, 0).unwrap()
    }

    fn profile(subjects: &[&str], goal: u32, style: StudyStyle, exams: Vec<Exam>) -> UserProfile {
        UserProfile {
            name: "Sam".into(),
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            daily_goal_hours: goal,
            study_style: style,
            exams,
        }
    }

    #[test]
    fn empty_subjects_yield_no_schedule() {
        let profile = profile(&[], 2, StudyStyle::Pomodoro, vec![]);
        assert!(generate_fallback(&profile, now()).is_none());
    }

    #[test]
    fn pomodoro_week_matches_worked_example() {
        // Physics has the sooner exam, so it leads every day; with a 2 h
        // goal, four 25-minute sessions fit (100 <= 120) and a fifth
        // (125) must be omitted.
        let profile = profile(
            &["Math", "Physics"],
            2,
            StudyStyle::Pomodoro,
            vec![Exam {
                subject: "Physics".into(),
                date: date(2024, 5, 23),
            }],
        );
        let plan = generate_fallback(&profile, now()).unwrap();
        assert_eq!(plan.source, ScheduleSource::RuleBased);
        assert_eq!(plan.week.len(), 7);

        let day = &plan.week[0];
        assert_eq!(day.date, date(2024, 5, 20));
        assert_eq!(day.day, "Monday");
        assert_eq!(day.slots.len(), 4);

        assert_eq!(day.slots[0].subject, "Physics");
        assert_eq!(day.slots[0].time, "09:00 - 09:25");
        assert_eq!(day.slots[1].subject, "Math");
        assert_eq!(day.slots[1].time, "09:30 - 09:55");
        assert_eq!(day.slots[2].subject, "Physics");
        assert_eq!(day.slots[2].time, "10:00 - 10:25");
        assert_eq!(day.slots[3].subject, "Math");
        assert_eq!(day.slots[3].time, "10:30 - 10:55");

        let total: u32 = day.slots.iter().map(|s| s.duration_minutes).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn session_minutes_never_exceed_goal_and_next_slot_would() {
        for (style, goal) in [
            (StudyStyle::Pomodoro, 2),
            (StudyStyle::Deep, 3),
            (StudyStyle::Mixed, 4),
        ] {
            let profile = profile(&["Math"], goal, style, vec![]);
            let plan = generate_fallback(&profile, now()).unwrap();
            let goal_minutes = goal * 60;
            for day in &plan.week {
                let total: u32 = day.slots.iter().map(|s| s.duration_minutes).sum();
                assert!(total <= goal_minutes);
                assert!(total + style.session_minutes() > goal_minutes);
            }
        }
    }

    #[test]
    fn deep_session_larger_than_goal_emits_nothing() {
        let profile = profile(&["Math"], 1, StudyStyle::Deep, vec![]);
        let plan = generate_fallback(&profile, now()).unwrap();
        assert!(plan.week.iter().all(|day| day.slots.is_empty()));
    }

    #[test]
    fn subjects_alternate_round_robin() {
        let profile = profile(&["A", "B"], 2, StudyStyle::Pomodoro, vec![]);
        let plan = generate_fallback(&profile, now()).unwrap();
        let subjects: Vec<&str> = plan.week[0]
            .slots
            .iter()
            .map(|s| s.subject.as_str())
            .collect();
        assert_eq!(subjects, vec!["A", "B", "A", "B"]);
    }

    #[test]
    fn exam_order_is_stable_for_ties_and_missing_dates() {
        let exams = vec![
            Exam {
                subject: "C".into(),
                date: date(2024, 6, 1),
            },
            Exam {
                subject: "B".into(),
                date: date(2024, 6, 1),
            },
        ];
        let subjects: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        // B and C share a date and keep their input order; A and D have
        // no exam and trail in input order.
        assert_eq!(
            order_by_exam_proximity(&subjects, &exams),
            vec!["B", "C", "A", "D"]
        );
    }

    #[test]
    fn week_days_are_contiguous_with_real_weekday_names() {
        let profile = profile(&["Math"], 1, StudyStyle::Pomodoro, vec![]);
        let plan = generate_fallback(&profile, now()).unwrap();
        let names: Vec<&str> = plan.week.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
                "Sunday"
            ]
        );
        for (i, day) in plan.week.iter().enumerate() {
            assert_eq!(day.date, date(2024, 5, 20 + i as u32));
        }
    }

    #[test]
    fn slot_ids_and_topics_are_positional() {
        let profile = profile(&["Math"], 2, StudyStyle::Mixed, vec![]);
        let plan = generate_fallback(&profile, now()).unwrap();
        let day = &plan.week[2];
        assert_eq!(day.slots[0].id, "2-0");
        assert_eq!(day.slots[1].id, "2-1");
        assert_eq!(day.slots[0].topic, "Math — Session 1");
        assert_eq!(day.slots[1].topic, "Math — Session 2");
        assert!(day.slots.iter().all(|s| s.kind == "study" && !s.completed));
    }

    #[test]
    fn clock_advances_by_session_plus_break() {
        let profile = profile(&["Math"], 3, StudyStyle::Deep, vec![]);
        let plan = generate_fallback(&profile, now()).unwrap();
        let day = &plan.week[0];
        assert_eq!(day.slots[0].time, "09:00 - 10:30");
        assert_eq!(day.slots[1].time, "10:45 - 12:15");
    }

    //=====================================================================
    // plan_week orchestration
    //=====================================================================

    struct StubPlanner {
        response: fn() -> PortResult<Vec<DaySchedule>>,
    }

    #[async_trait]
    impl SchedulePlannerService for StubPlanner {
        async fn generate_week(
            &self,
            _profile: &UserProfile,
            _now: DateTime<Utc>,
        ) -> PortResult<Vec<DaySchedule>> {
            (self.response)()
        }
    }

    fn ai_week() -> PortResult<Vec<DaySchedule>> {
        Ok(vec![DaySchedule {
            day: "Monday".into(),
            date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            slots: vec![],
        }])
    }

    #[tokio::test]
    async fn plan_week_uses_the_planner_when_it_succeeds() {
        let planner = StubPlanner { response: ai_week };
        let profile = profile(&["Math"], 2, StudyStyle::Mixed, vec![]);
        let outcome = plan_week(Some(&planner), &profile, now()).await.unwrap();
        match outcome {
            ScheduleOutcome::AiGenerated(plan) => {
                assert_eq!(plan.source, ScheduleSource::Ai);
                assert_eq!(plan.week.len(), 1);
            }
            other => panic!("expected AI outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn plan_week_without_planner_is_an_observable_fallback() {
        let profile = profile(&["Math"], 2, StudyStyle::Mixed, vec![]);
        let outcome = plan_week(None, &profile, now()).await.unwrap();
        assert_eq!(
            outcome.fallback_reason(),
            Some(&FallbackReason::PlannerUnavailable)
        );
        assert_eq!(outcome.plan().source, ScheduleSource::RuleBased);
        assert_eq!(outcome.plan().week.len(), 7);
    }

    #[tokio::test]
    async fn planner_failure_falls_back_with_service_error() {
        let planner = StubPlanner {
            response: || Err(PortError::Unexpected("timeout".into())),
        };
        let profile = profile(&["Math"], 2, StudyStyle::Mixed, vec![]);
        let outcome = plan_week(Some(&planner), &profile, now()).await.unwrap();
        match outcome.fallback_reason() {
            Some(FallbackReason::ServiceError(msg)) => assert!(msg.contains("timeout")),
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_planner_response_is_tagged_as_such() {
        let planner = StubPlanner {
            response: || Err(PortError::MalformedResponse("missing week".into())),
        };
        let profile = profile(&["Math"], 2, StudyStyle::Mixed, vec![]);
        let outcome = plan_week(Some(&planner), &profile, now()).await.unwrap();
        assert_eq!(
            outcome.fallback_reason(),
            Some(&FallbackReason::MalformedResponse("missing week".into()))
        );
    }

    #[tokio::test]
    async fn plan_week_with_empty_subjects_is_none() {
        let planner = StubPlanner { response: ai_week };
        let profile = profile(&[], 2, StudyStyle::Mixed, vec![]);
        assert!(plan_week(Some(&planner), &profile, now()).await.is_none());
    }
}
