//! Stage 2: aggregation over the ledger
//!
//! The model does the arithmetic. The prompt pins down the reference date,
//! the weekly rule (with its concrete dates) and the spend computation.

use crate::classifier::IntentKind;
use crate::ledger::Ledger;
use crate::llm::LanguageModel;
use crate::models::{AggregateResult, IntentRecord, Stage};
use crate::period::{format_reference_date, PeriodWindow, THIS_WEEK_RULE};
use crate::stages::{fill_template, parsing, AgentProfile};
use crate::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

const AGGREGATE_TEMPLATE: &str = r#"Today is: {reference_date}.
Period rule: {week_rule}; for today that is {week_window}.
Any other period is interpreted relative to today.

NLP data: {intent_record}

Available transactions:
{transactions}

If the intent is "total_spend" (or equivalent), add up the "amount" of every transaction with "direction": "Outflow" whose "date" falls within the requested period.
For any other intent, compute the number it asks for from the same transactions.
{intent_hint}
Return ONLY a float number like 123.45, with no currency symbol and no extra text."#;

/// Inputs for one aggregation
pub struct AggregationContext<'a> {
    pub reference_date: NaiveDate,
    pub intent: &'a IntentRecord,
}

pub struct Aggregator {
    model: Arc<dyn LanguageModel>,
    profile: AgentProfile,
    ledger: &'static Ledger,
}

impl Aggregator {
    pub fn new(model: Arc<dyn LanguageModel>, ledger: &'static Ledger) -> Self {
        Self {
            model,
            profile: AgentProfile::new(
                "Data Engine",
                "Process the transaction data and compute exact sums",
                "Analyst who knows every expense",
            ),
            ledger,
        }
    }

    pub fn ledger(&self) -> &'static Ledger {
        self.ledger
    }

    pub fn build_prompt(&self, ctx: &AggregationContext<'_>) -> Result<String> {
        let transactions = self.ledger.to_prompt_json()?;
        let intent_record = serde_json::to_string(ctx.intent)?;
        let reference_date = format_reference_date(ctx.reference_date);
        let week_window = PeriodWindow::this_week(ctx.reference_date).to_string();
        let kind = IntentKind::classify(&ctx.intent.intent);
        let intent_hint = if kind.is_known() {
            format!("Requested intent, normalized: {}\n", kind)
        } else {
            String::new()
        };

        Ok(fill_template(
            AGGREGATE_TEMPLATE,
            &[
                ("reference_date", reference_date.as_str()),
                ("week_rule", THIS_WEEK_RULE),
                ("week_window", week_window.as_str()),
                ("transactions", transactions.as_str()),
                ("intent_hint", intent_hint.as_str()),
                ("intent_record", intent_record.as_str()),
            ],
        ))
    }

    pub async fn run(&self, ctx: &AggregationContext<'_>) -> Result<AggregateResult> {
        let prompt = self
            .build_prompt(ctx)
            .map_err(|e| e.in_stage(Stage::Aggregate))?;

        let response = self
            .model
            .complete(&self.profile.system_prompt(), &prompt)
            .await
            .map_err(|e| e.in_stage(Stage::Aggregate))?;

        debug!(raw = %response, "Aggregator responded");

        parsing::parse_aggregate(&response).map_err(|e| e.in_stage(Stage::Aggregate))
    }
}
