//! Language-model access
//!
//! Every pipeline stage issues exactly one completion request through
//! the `LanguageModel` trait. The production implementation talks to an
//! OpenAI-compatible chat API; `ScriptedModel` replays canned answers.

use crate::Result;
use async_trait::async_trait;

pub mod mock;
pub mod openai;

pub use mock::ScriptedModel;
pub use openai::{build_http_client, OpenAiClient};

/// Single-turn completion: persona in, instructions in, text out
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, system_prompt: &str, prompt: &str) -> Result<String>;
}
