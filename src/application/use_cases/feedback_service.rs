use std::sync::Arc;

use tracing::info;

use crate::application::use_cases::prompt_builder::PromptBuilder;
use crate::domain::error::{AppError, Result};
use crate::domain::feedback::Feedback;
use crate::domain::llm_config::LLMConfig;
use crate::domain::scenario::Scenario;
use crate::domain::turn::Turn;
use crate::infrastructure::llm_clients::LLMClient;

const COACH_SYSTEM_PROMPT: &str =
    "You are an expert salary negotiation coach. You analyze practice sessions and return \
     structured feedback as JSON.";

pub struct FeedbackUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
}

impl FeedbackUseCase {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>) -> Self {
        Self { llm_client }
    }

    /// Evaluate an ended session. One generate call; the response must
    /// deserialize and validate as a whole or the request fails. Shape
    /// violations are reported as schema errors and handled by callers
    /// exactly like transport failures.
    pub async fn execute(
        &self,
        config: &LLMConfig,
        scenario: &Scenario,
        transcript: &[Turn],
    ) -> Result<Feedback> {
        let prompt = PromptBuilder::feedback_prompt(scenario, transcript);

        let raw = self
            .llm_client
            .generate(config, COACH_SYSTEM_PROMPT, &prompt)
            .await?;

        let payload = extract_json_payload(&raw);
        let feedback: Feedback = serde_json::from_str(&payload)
            .map_err(|e| AppError::SchemaError(format!("Feedback did not match shape: {}", e)))?;
        feedback.validate()?;

        info!(score = feedback.overall_score, "Feedback generated");
        Ok(feedback)
    }
}

/// Pull the JSON object out of a model reply that may wrap it in a code
/// fence or surrounding prose.
fn extract_json_payload(output: &str) -> String {
    let stripped = strip_code_fence(output);
    let start = stripped.find('{');
    let end = stripped.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if end >= start => stripped[start..=end].to_string(),
        _ => stripped,
    }
}

fn strip_code_fence(value: &str) -> String {
    let trimmed = value.trim();
    if let Some(stripped) = trimmed.strip_prefix("```json") {
        return stripped.trim().trim_end_matches("```").trim().to_string();
    }
    if let Some(stripped) = trimmed.strip_prefix("```") {
        return stripped.trim().trim_end_matches("```").trim().to_string();
    }
    trimmed.to_string()
}
