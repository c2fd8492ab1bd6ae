//! Multimodal Financial Assistant
//!
//! A console assistant that:
//! - Accepts a request typed or spoken
//! - Extracts intent and period with a language model
//! - Aggregates a fixed in-memory ledger under an explicit period rule
//! - Verifies the number before answering
//! - Composes a one-sentence answer
//!
//! PIPELINE:
//! INPUT → EXTRACT → AGGREGATE → VERIFY → COMPOSE → OUTPUT

pub mod classifier;
pub mod config;
pub mod error;
pub mod input;
pub mod ledger;
pub mod llm;
pub mod models;
pub mod period;
pub mod pipeline;
pub mod stages;
pub mod verification;
pub mod voice;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use classifier::IntentKind;
pub use pipeline::{Orchestrator, RequestOutcome};
