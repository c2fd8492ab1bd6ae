//! Scripted language model for development & testing
//!
//! Replays queued answers in order and records every prompt it receives.
//! Keeps the pipeline exercisable without network access.

use crate::error::AssistantError;
use crate::llm::LanguageModel;
use crate::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub prompt: String,
}

#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful completion
    pub fn reply(self, text: &str) -> Self {
        self.push(Ok(text.to_string()));
        self
    }

    /// Queue a failed call (network error, rate limit...)
    pub fn fail(self, message: &str) -> Self {
        self.push(Err(message.to_string()));
        self
    }

    fn push(&self, reply: std::result::Result<String, String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, system_prompt: &str, prompt: &str) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                system_prompt: system_prompt.to_string(),
                prompt: prompt.to_string(),
            });
        }

        let next = self
            .replies
            .lock()
            .map_err(|_| AssistantError::Llm("scripted model poisoned".to_string()))?
            .pop_front();

        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(AssistantError::Llm(message)),
            None => Err(AssistantError::Llm("no scripted reply left".to_string())),
        }
    }
}
