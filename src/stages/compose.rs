//! Stage 3: response composition

use crate::llm::LanguageModel;
use crate::models::{AggregateResult, IntentRecord, Stage};
use crate::stages::{fill_template, parsing, AgentProfile};
use crate::Result;
use std::sync::Arc;
use tracing::debug;

const COMPOSE_TEMPLATE: &str = r#"Write one final sentence in {language} for the user, based on the intent and the value below.
Intent: {intent}
Period: {period}
Value: {value} {currency}

Example: 'You spent 100 {currency} this week.'
Return only the sentence."#;

pub struct ResponseComposer {
    model: Arc<dyn LanguageModel>,
    profile: AgentProfile,
    language: String,
    currency: String,
}

impl ResponseComposer {
    pub fn new(model: Arc<dyn LanguageModel>, language: &str, currency: &str) -> Self {
        Self {
            model,
            profile: AgentProfile::new(
                "User Assistant",
                &format!("Give a clear and helpful answer in {}", language),
                "Expert in financial communication",
            ),
            language: language.to_string(),
            currency: currency.to_string(),
        }
    }

    pub fn build_prompt(&self, intent: &IntentRecord, aggregate: AggregateResult) -> String {
        let value = aggregate.to_string();
        fill_template(
            COMPOSE_TEMPLATE,
            &[
                ("language", self.language.as_str()),
                ("currency", self.currency.as_str()),
                ("value", value.as_str()),
                ("intent", intent.intent.as_str()),
                ("period", intent.period.as_str()),
            ],
        )
    }

    pub async fn run(&self, intent: &IntentRecord, aggregate: AggregateResult) -> Result<String> {
        let prompt = self.build_prompt(intent, aggregate);

        let response = self
            .model
            .complete(&self.profile.system_prompt(), &prompt)
            .await
            .map_err(|e| e.in_stage(Stage::Compose))?;

        debug!(raw = %response, "Composer responded");

        parsing::parse_sentence(&response).map_err(|e| e.in_stage(Stage::Compose))
    }
}
