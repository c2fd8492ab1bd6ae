//! Pipeline stages
//!
//! EXTRACT → AGGREGATE → COMPOSE
//!
//! Each stage is a small struct with one async `run`, one model call and
//! a typed output. Agent personas are plain data.

use serde::{Deserialize, Serialize};

pub mod aggregate;
pub mod compose;
pub mod intent;
pub mod parsing;

pub use aggregate::{AggregationContext, Aggregator};
pub use compose::ResponseComposer;
pub use intent::IntentExtractor;

/// Persona handed to the model as the system prompt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentProfile {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl AgentProfile {
    pub fn new(role: &str, goal: &str, backstory: &str) -> Self {
        Self {
            role: role.to_string(),
            goal: goal.to_string(),
            backstory: backstory.to_string(),
        }
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are the {}. {}.\nYour goal: {}.\nFollow the instructions literally and answer only in the requested format.",
            self.role, self.backstory, self.goal
        )
    }
}

/// Substitute `{name}` placeholders in a prompt template
///
/// Single pass over the template: substituted text is never scanned again,
/// and braces that do not name a known placeholder are kept as written.
pub(crate) fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let substitution = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, value)| (*value, close))
        });

        match substitution {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
