//! Error types for the financial assistant

use crate::models::Stage;
use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {

    // =============================
    // Startup
    // =============================

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // Pipeline Errors
    // =============================

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Unusable model output: {0}")]
    InvalidModelOutput(String),

    #[error("Verification failed: {0}")]
    Verification(String),

    #[error("{stage} stage failed: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: Box<AssistantError>,
    },

    // =============================
    // Voice Input
    // =============================

    #[error("Voice input unavailable: {0}")]
    VoiceUnavailable(String),

    #[error("Speech recognition failed: {0}")]
    Transcription(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssistantError {
    /// Attach the pipeline stage an error came from
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            already @ AssistantError::StageFailed { .. } => already,
            other => AssistantError::StageFailed {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage that failed, if the error came out of the pipeline
    pub fn stage(&self) -> Option<Stage> {
        match self {
            AssistantError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
