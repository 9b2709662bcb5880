//! services/api/src/adapters/schedule_llm.rs
//!
//! This module contains the adapter for the AI study planner.
//! It implements the `SchedulePlannerService` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str = r#"You are a professional study planner. You create personalized 7-day study schedules.

Rules:
- Prioritize subjects with closer exam dates.
- For each day, include 2-4 slots that fit within the student's daily hour limit.
- Vary the topics to prevent burnout.
- Return ONLY valid JSON, no prose, no markdown fences."#;

const USER_INPUT_TEMPLATE: &str = r#"Create a personalized 7-day study schedule starting on {start_date}.

Student Profile:
- Subjects: {subjects}
- Daily study goal: {daily_goal} hours
- Study style: {study_style} ({cadence})
- Upcoming exams: {exams}

Return ONLY valid JSON in this exact structure:
{
  "week": [
    {
      "day": "Monday",
      "date": "2024-05-20",
      "slots": [
        {
          "id": "unique_id_1",
          "time": "09:00 - 10:00",
          "subject": "Math",
          "topic": "Algebra",
          "duration": 60,
          "type": "study"
        }
      ]
    }
  ]
}"#;

use async_openai::{config::OpenAIConfig, error::OpenAIError, types::responses::CreateResponseArgs, Client};
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use regex::Regex;
use serde::Deserialize;
use study_planner_core::domain::{DaySchedule, ScheduleSlot, UserProfile};
use study_planner_core::ports::{PortError, PortResult, SchedulePlannerService};
use study_planner_core::scheduler::style_summary;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SchedulePlannerService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiPlannerAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiPlannerAdapter {
    /// Creates a new `OpenAiPlannerAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    fn build_input(profile: &UserProfile, start_date: NaiveDate) -> String {
        let exams = if profile.exams.is_empty() {
            "None specified".to_string()
        } else {
            profile
                .exams
                .iter()
                .map(|e| format!("{} on {}", e.subject, e.date))
                .collect::<Vec<_>>()
                .join(", ")
        };

        USER_INPUT_TEMPLATE
            .replace("{start_date}", &start_date.to_string())
            .replace("{subjects}", &profile.subjects.join(", "))
            .replace("{daily_goal}", &profile.daily_goal_hours.to_string())
            .replace("{study_style}", profile.study_style.as_str())
            .replace("{cadence}", &style_summary(profile.study_style))
            .replace("{exams}", &exams)
    }
}

//=========================================================================================
// Response Cleaning and Validation
//=========================================================================================

/// Loosely-shaped slot as the model returns it; normalized into a
/// `ScheduleSlot` only after validation.
#[derive(Deserialize)]
struct AiSlot {
    id: Option<String>,
    time: String,
    subject: String,
    topic: Option<String>,
    duration: u32,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    completed: bool,
}

#[derive(Deserialize)]
struct AiDay {
    #[serde(default)]
    slots: Vec<AiSlot>,
}

#[derive(Deserialize)]
struct AiWeekEnvelope {
    week: Vec<AiDay>,
}

/// Strips markdown fences and anything outside the outermost JSON braces.
/// Models frequently wrap the payload even when told not to.
fn clean_json_response(raw: &str) -> String {
    let fences = Regex::new(r"```(?:json)?").unwrap();
    let cleaned = fences.replace_all(raw, "");
    let cleaned = cleaned.trim();

    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(first), Some(last)) if first < last => cleaned[first..=last].to_string(),
        _ => cleaned.to_string(),
    }
}

/// Parses and validates the model's response into the 7 `DaySchedule`
/// entries, anchored at `start_date`. Dates and day names come from the
/// anchor, not from the model: the week must be contiguous regardless of
/// what the model invented.
fn parse_week_response(raw: &str, start_date: NaiveDate) -> PortResult<Vec<DaySchedule>> {
    let cleaned = clean_json_response(raw);

    let envelope: AiWeekEnvelope = serde_json::from_str(&cleaned)
        .map_err(|e| PortError::MalformedResponse(format!("Invalid schedule JSON: {}", e)))?;

    if envelope.week.len() != 7 {
        return Err(PortError::MalformedResponse(format!(
            "Expected 7 days, got {}",
            envelope.week.len()
        )));
    }

    envelope
        .week
        .into_iter()
        .enumerate()
        .map(|(day_idx, day)| {
            let date = start_date
                .checked_add_days(Days::new(day_idx as u64))
                .ok_or_else(|| PortError::MalformedResponse("Date out of range".to_string()))?;

            let slots = day
                .slots
                .into_iter()
                .enumerate()
                .map(|(slot_idx, slot)| {
                    if slot.subject.trim().is_empty() {
                        return Err(PortError::MalformedResponse(format!(
                            "Slot {}-{} has no subject",
                            day_idx, slot_idx
                        )));
                    }
                    if slot.duration == 0 {
                        return Err(PortError::MalformedResponse(format!(
                            "Slot {}-{} has zero duration",
                            day_idx, slot_idx
                        )));
                    }
                    Ok(ScheduleSlot {
                        id: slot
                            .id
                            .unwrap_or_else(|| format!("{}-{}", day_idx, slot_idx)),
                        time: slot.time,
                        topic: slot.topic.unwrap_or_else(|| slot.subject.clone()),
                        subject: slot.subject,
                        duration_minutes: slot.duration,
                        kind: slot.kind.unwrap_or_else(|| "study".to_string()),
                        completed: slot.completed,
                    })
                })
                .collect::<PortResult<Vec<_>>>()?;

            Ok(DaySchedule {
                day: date.format("%A").to_string(),
                date,
                slots,
            })
        })
        .collect()
}

//=========================================================================================
// `SchedulePlannerService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SchedulePlannerService for OpenAiPlannerAdapter {
    async fn generate_week(
        &self,
        profile: &UserProfile,
        now: DateTime<Utc>,
    ) -> PortResult<Vec<DaySchedule>> {
        let start_date = now.date_naive();
        let user_input = Self::build_input(profile, start_date);

        let request = CreateResponseArgs::default()
            .model(&self.model)
            .instructions(SYSTEM_INSTRUCTIONS)
            .input(user_input)
            .max_output_tokens(4096u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .responses()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let raw = response.output_text().unwrap_or_default();
        parse_week_response(&raw, start_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_planner_core::domain::{Exam, StudyStyle};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn seven_day_payload() -> String {
        let days: Vec<String> = (0..7)
            .map(|i| {
                format!(
                    r#"{{"day": "X", "date": "2024-05-{:02}", "slots": [
                        {{"time": "09:00 - 10:00", "subject": "Math", "topic": "Algebra", "duration": 60, "type": "study"}}
                    ]}}"#,
                    20 + i
                )
            })
            .collect();
        format!(r#"{{"week": [{}]}}"#, days.join(","))
    }

    #[test]
    fn parses_a_clean_seven_day_week() {
        let week = parse_week_response(&seven_day_payload(), start()).unwrap();
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].day, "Monday");
        assert_eq!(week[0].date, start());
        assert_eq!(week[6].date, NaiveDate::from_ymd_opt(2024, 5, 26).unwrap());
        assert_eq!(week[0].slots[0].subject, "Math");
        assert_eq!(week[0].slots[0].duration_minutes, 60);
        assert!(!week[0].slots[0].completed);
    }

    #[test]
    fn strips_markdown_fences_and_prose() {
        let wrapped = format!(
            "Sure! Here is your schedule:\n```json\n{}\n``` Enjoy!",
            seven_day_payload()
        );
        let week = parse_week_response(&wrapped, start()).unwrap();
        assert_eq!(week.len(), 7);
    }

    #[test]
    fn missing_week_field_is_malformed() {
        let err = parse_week_response(r#"{"days": []}"#, start()).unwrap_err();
        assert!(matches!(err, PortError::MalformedResponse(_)));
    }

    #[test]
    fn unparsable_text_is_malformed() {
        let err = parse_week_response("I could not generate a schedule.", start()).unwrap_err();
        assert!(matches!(err, PortError::MalformedResponse(_)));
    }

    #[test]
    fn wrong_day_count_is_malformed() {
        let payload = r#"{"week": [{"slots": []}]}"#;
        let err = parse_week_response(payload, start()).unwrap_err();
        assert!(matches!(err, PortError::MalformedResponse(_)));
    }

    #[test]
    fn zero_duration_slot_is_malformed() {
        let payload = seven_day_payload().replace("\"duration\": 60", "\"duration\": 0");
        let err = parse_week_response(&payload, start()).unwrap_err();
        assert!(matches!(err, PortError::MalformedResponse(_)));
    }

    #[test]
    fn missing_slot_ids_are_normalized_positionally() {
        let week = parse_week_response(&seven_day_payload(), start()).unwrap();
        assert_eq!(week[2].slots[0].id, "2-0");
    }

    #[test]
    fn prompt_mentions_profile_details() {
        let profile = UserProfile {
            name: "Sam".into(),
            subjects: vec!["Math".into(), "Physics".into()],
            daily_goal_hours: 2,
            study_style: StudyStyle::Pomodoro,
            exams: vec![Exam {
                subject: "Physics".into(),
                date: NaiveDate::from_ymd_opt(2024, 5, 23).unwrap(),
            }],
        };
        let input = OpenAiPlannerAdapter::build_input(&profile, start());
        assert!(input.contains("Math, Physics"));
        assert!(input.contains("2 hours"));
        assert!(input.contains("pomodoro"));
        assert!(input.contains("25 min sessions, 5 min breaks"));
        assert!(input.contains("Physics on 2024-05-23"));
        assert!(input.contains("2024-05-20"));
    }
}
