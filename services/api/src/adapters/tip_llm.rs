//! services/api/src/adapters/tip_llm.rs
//!
//! This module contains the adapter for the daily study tip generator.
//! It implements the `StudyTipService` port from the `core` crate.

use async_openai::{config::OpenAIConfig, error::OpenAIError, types::responses::CreateResponseArgs, Client};
use async_trait::async_trait;
use study_planner_core::ports::{PortError, PortResult, StudyTipService};

const TIP_PROMPT_TEMPLATE: &str = "Give one short, specific, actionable study tip for a student studying {subjects}. Maximum 2 sentences. No preamble.";

/// An adapter that implements `StudyTipService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiTipAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiTipAdapter {
    /// Creates a new `OpenAiTipAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl StudyTipService for OpenAiTipAdapter {
    async fn daily_tip(&self, subjects: &[String]) -> PortResult<String> {
        // Keep the prompt short: three subjects are plenty of context.
        let subject_list = subjects
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        let prompt = TIP_PROMPT_TEMPLATE.replace("{subjects}", &subject_list);

        let request = CreateResponseArgs::default()
            .model(&self.model)
            .input(prompt)
            .max_output_tokens(200u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .responses()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let tip = response.output_text().unwrap_or_default().trim().to_string();
        if tip.is_empty() {
            return Err(PortError::MalformedResponse(
                "Empty tip response".to_string(),
            ));
        }
        Ok(tip)
    }
}
