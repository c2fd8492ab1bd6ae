//! Parsing helpers for model responses
//!
//! Models wrap payloads in markdown fences, prose or pseudo-JSON. These
//! functions pull the typed value out, and fail instead of passing
//! malformed text to the next stage.

use crate::error::AssistantError;
use crate::models::{AggregateResult, IntentRecord};
use crate::Result;
use serde_json::Value;

const PERIOD_KEYS: &[&str] = &["period", "periodo", "time_period"];

fn truncate(raw: &str) -> String {
    let raw = raw.trim();
    if raw.chars().count() > 200 {
        format!("{}...", raw.chars().take(200).collect::<String>())
    } else {
        raw.to_string()
    }
}

fn strip_fences(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parse the extractor output into an `IntentRecord`
pub fn parse_intent_record(response: &str) -> Result<IntentRecord> {
    let cleaned = strip_fences(response);

    let json_str = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(s), Some(e)) if s < e => &cleaned[s..=e],
        _ => {
            return Err(AssistantError::InvalidModelOutput(format!(
                "No JSON object in intent response | Raw: {}",
                truncate(response)
            )))
        }
    };

    // Accept the single-quoted pseudo-JSON some models echo back from examples
    let value: Value = serde_json::from_str(json_str)
        .or_else(|_| serde_json::from_str(&json_str.replace('\'', "\"")))
        .map_err(|e| {
            AssistantError::InvalidModelOutput(format!(
                "Invalid intent JSON: {} | Raw: {}",
                e,
                truncate(json_str)
            ))
        })?;

    let field = |keys: &[&str]| {
        keys.iter()
            .filter_map(|k| value.get(*k))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    };

    let intent = field(&["intent"]).ok_or_else(|| {
        AssistantError::InvalidModelOutput(format!(
            "Missing 'intent' in response | Raw: {}",
            truncate(json_str)
        ))
    })?;

    let period = field(PERIOD_KEYS).ok_or_else(|| {
        AssistantError::InvalidModelOutput(format!(
            "Missing 'period' in response | Raw: {}",
            truncate(json_str)
        ))
    })?;

    Ok(IntentRecord { intent, period })
}

/// Parse the aggregator output: one plain decimal number, nothing else
pub fn parse_aggregate(response: &str) -> Result<AggregateResult> {
    let mut cleaned = strip_fences(response).trim_matches('`').trim();

    // "80.0." from models that end every answer with a full stop
    if cleaned.len() > 1 && cleaned.ends_with('.') {
        cleaned = &cleaned[..cleaned.len() - 1];
    }

    let normalized = if cleaned.matches(',').count() == 1 && !cleaned.contains('.') {
        cleaned.replace(',', ".")
    } else {
        cleaned.to_string()
    };

    let value: f64 = normalized.parse().map_err(|_| {
        AssistantError::InvalidModelOutput(format!(
            "Expected a plain number like 123.45 | Raw: {}",
            truncate(response)
        ))
    })?;

    if !value.is_finite() {
        return Err(AssistantError::InvalidModelOutput(format!(
            "Aggregate is not a finite number | Raw: {}",
            truncate(response)
        )));
    }

    Ok(AggregateResult(value))
}

/// Normalize the composer output to a single clean sentence
pub fn parse_sentence(response: &str) -> Result<String> {
    let sentence = strip_fences(response)
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '“' || c == '”' || c.is_whitespace())
        .to_string();

    if sentence.is_empty() {
        return Err(AssistantError::InvalidModelOutput(
            "Composer returned an empty answer".to_string(),
        ));
    }

    Ok(sentence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_plain_json() {
        let record = parse_intent_record(r#"{"intent": "total_spend", "period": "this week"}"#).unwrap();
        assert_eq!(record, IntentRecord::new("total_spend", "this week"));
    }

    #[test]
    fn test_intent_tolerates_formatting_variance() {
        let fenced = "```json\n{\"intent\": \"total_spend\", \"period\": \"this week\"}\n```";
        assert_eq!(parse_intent_record(fenced).unwrap().period, "this week");

        let prose = "Sure! Here it is: {\"intent\": \"total_spend\", \"period\": \"last month\"} Hope it helps.";
        assert_eq!(parse_intent_record(prose).unwrap().period, "last month");

        let single_quoted = "{'intent': 'spesa_totale', 'periodo': 'questa settimana'}";
        let record = parse_intent_record(single_quoted).unwrap();
        assert_eq!(record.intent, "spesa_totale");
        assert_eq!(record.period, "questa settimana");
    }

    #[test]
    fn test_intent_rejects_unusable_output() {
        assert!(parse_intent_record("I could not understand the request").is_err());
        assert!(parse_intent_record(r#"{"intent": "total_spend"}"#).is_err());
        assert!(parse_intent_record(r#"{"intent": "  ", "period": "this week"}"#).is_err());
        assert!(parse_intent_record("{not json at all}").is_err());
    }

    #[test]
    fn test_aggregate_accepts_plain_numbers() {
        assert_eq!(parse_aggregate("80.0").unwrap().value(), 80.0);
        assert_eq!(parse_aggregate("  123.45\n").unwrap().value(), 123.45);
        assert_eq!(parse_aggregate("`80`").unwrap().value(), 80.0);
        assert_eq!(parse_aggregate("80.0.").unwrap().value(), 80.0);
        assert_eq!(parse_aggregate("80,5").unwrap().value(), 80.5);
    }

    #[test]
    fn test_aggregate_rejects_extra_text() {
        assert!(parse_aggregate("The total is 80.0").is_err());
        assert!(parse_aggregate("€80.00").is_err());
        assert!(parse_aggregate("80 euros").is_err());
        assert!(parse_aggregate("1,234.50").is_err());
        assert!(parse_aggregate("NaN").is_err());
        assert!(parse_aggregate("inf").is_err());
        assert!(parse_aggregate("").is_err());
    }

    #[test]
    fn test_sentence_cleanup() {
        assert_eq!(
            parse_sentence("  \"You spent 80 euros this week.\"\n").unwrap(),
            "You spent 80 euros this week."
        );
        assert!(parse_sentence("   ").is_err());
        assert!(parse_sentence("\"\"").is_err());
    }
}
