//! Stage 1: intent extraction

use crate::llm::LanguageModel;
use crate::models::{IntentRecord, Stage};
use crate::stages::{fill_template, parsing, AgentProfile};
use crate::Result;
use std::sync::Arc;
use tracing::debug;

const EXTRACT_TEMPLATE: &str = r#"Extract the intent and the time period from this request: '{request}'

Rules:
- "intent" is a short snake_case tag for the requested computation, e.g. "total_spend"
- "period" is the time window exactly as the user described it, in the user's language
- Return ONLY a JSON object, no explanation text

JSON format:
{"intent": "total_spend", "period": "this week"}"#;

pub struct IntentExtractor {
    model: Arc<dyn LanguageModel>,
    profile: AgentProfile,
}

impl IntentExtractor {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            profile: AgentProfile::new(
                "NLP Analyst",
                "Understand the user's intent and the time period they refer to",
                "Expert linguist who interprets financial requests",
            ),
        }
    }

    pub fn build_prompt(&self, request: &str) -> String {
        fill_template(EXTRACT_TEMPLATE, &[("request", request)])
    }

    pub async fn run(&self, request: &str) -> Result<IntentRecord> {
        let prompt = self.build_prompt(request);

        let response = self
            .model
            .complete(&self.profile.system_prompt(), &prompt)
            .await
            .map_err(|e| e.in_stage(Stage::Extract))?;

        debug!(raw = %response, "Intent extractor responded");

        parsing::parse_intent_record(&response).map_err(|e| e.in_stage(Stage::Extract))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedModel;

    #[tokio::test]
    async fn test_extracts_record() {
        let model = Arc::new(
            ScriptedModel::new().reply(r#"{"intent": "total_spend", "period": "this week"}"#),
        );
        let extractor = IntentExtractor::new(model.clone());

        let record = extractor.run("How much did I spend this week?").await.unwrap();
        assert_eq!(record, IntentRecord::new("total_spend", "this week"));

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].prompt.contains("'How much did I spend this week?'"));
        assert!(calls[0].system_prompt.contains("NLP Analyst"));
    }

    #[tokio::test]
    async fn test_unusable_output_fails_stage() {
        let model = Arc::new(ScriptedModel::new().reply("Sorry, I cannot help with that."));
        let extractor = IntentExtractor::new(model);

        let err = extractor.run("spend?").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Extract));
    }

    #[tokio::test]
    async fn test_model_error_fails_stage() {
        let model = Arc::new(ScriptedModel::new().fail("connection reset"));
        let extractor = IntentExtractor::new(model);

        let err = extractor.run("spend?").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Extract));
        assert!(err.to_string().contains("connection reset"));
    }
}
