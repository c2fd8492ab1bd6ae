//! Runtime configuration
//!
//! Read from the process environment after `.env` has been loaded.
//! `OPENAI_API_KEY` is the only required value.

use crate::error::AssistantError;
use crate::Result;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Total per-request timeout; unset leaves the HTTP client's defaults
    pub request_timeout: Option<Duration>,
    /// Language of the composed answer, e.g. "English"
    pub language: String,
    /// ISO code handed to speech recognition, e.g. "en"
    pub speech_language: String,
    pub currency: String,
    pub verbose: bool,
    pub voice_record_command: Option<String>,
    pub transcription_model: String,
}

impl AssistantConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("OPENAI_API_KEY").ok_or_else(|| {
            AssistantError::Config(
                "OPENAI_API_KEY is not set. Add it to your environment or .env file".to_string(),
            )
        })?;

        let temperature = match get("ASSISTANT_TEMPERATURE") {
            Some(raw) => {
                let value: f32 = raw.parse().map_err(|_| {
                    AssistantError::Config(format!("ASSISTANT_TEMPERATURE is not a number: {}", raw))
                })?;
                if !(0.0..=2.0).contains(&value) {
                    return Err(AssistantError::Config(format!(
                        "ASSISTANT_TEMPERATURE must be between 0 and 2, got {}",
                        value
                    )));
                }
                value
            }
            None => DEFAULT_TEMPERATURE,
        };

        let request_timeout = match get("ASSISTANT_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().ok().filter(|s| *s > 0).ok_or_else(|| {
                    AssistantError::Config(format!(
                        "ASSISTANT_REQUEST_TIMEOUT_SECS must be a positive integer, got {}",
                        raw
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            api_key,
            base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: get("ASSISTANT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature,
            request_timeout,
            language: get("ASSISTANT_LANGUAGE").unwrap_or_else(|| "English".to_string()),
            speech_language: get("ASSISTANT_SPEECH_LANGUAGE").unwrap_or_else(|| "en".to_string()),
            currency: get("ASSISTANT_CURRENCY").unwrap_or_else(|| "euros".to_string()),
            verbose: get("ASSISTANT_VERBOSE").map(|v| is_truthy(&v)).unwrap_or(false),
            voice_record_command: get("ASSISTANT_VOICE_RECORD_CMD"),
            transcription_model: get("ASSISTANT_TRANSCRIPTION_MODEL")
                .unwrap_or_else(|| DEFAULT_TRANSCRIPTION_MODEL.to_string()),
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
