//! Core data models for the financial assistant

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    Inflow,
    Outflow,
}

/// One of the three sequential model-backed steps
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Extract,
    Aggregate,
    Compose,
}

//
// ================= Ledger =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub direction: Direction,
    pub category: String,
    pub amount: f64,
}

impl Transaction {
    pub fn new(date: NaiveDate, direction: Direction, category: &str, amount: f64) -> Self {
        Self {
            date,
            direction,
            category: category.to_string(),
            amount,
        }
    }

    pub fn is_outflow(&self) -> bool {
        self.direction == Direction::Outflow
    }
}

//
// ================= Stage hand-off =================
//

/// Structured output of the intent extractor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntentRecord {
    pub intent: String,
    pub period: String,
}

impl IntentRecord {
    pub fn new(intent: &str, period: &str) -> Self {
        Self {
            intent: intent.to_string(),
            period: period.to_string(),
        }
    }
}

/// Monetary sum produced by the aggregator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AggregateResult(pub f64);

impl AggregateResult {
    pub fn value(&self) -> f64 {
        self.0
    }
}

//
// ================= Final Result =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    pub reference_date: NaiveDate,
    pub intent: IntentRecord,
    pub aggregate: AggregateResult,
    pub answer: String,
    pub reasoning_trace: Vec<String>,
    pub elapsed_ms: u64,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Inflow => "Inflow",
            Direction::Outflow => "Outflow",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Extract => "extract",
            Stage::Aggregate => "aggregate",
            Stage::Compose => "compose",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for AggregateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
