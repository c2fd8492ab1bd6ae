//! OpenAI-compatible chat completions client
//!
//! Uses a long-lived reqwest::Client for connection pooling.
//! One request per call, no streaming, no conversation state.

use crate::config::AssistantConfig;
use crate::error::AssistantError;
use crate::llm::LanguageModel;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Reusable chat client (connection-pooled)
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

/// Pooled HTTP client shared by the chat and transcription calls
///
/// A total timeout is set only when one is configured.
pub fn build_http_client(config: &AssistantConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(8);

    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}

impl OpenAiClient {
    pub fn new(config: &AssistantConfig) -> Result<Self> {
        Ok(Self::with_client(build_http_client(config)?, config))
    }

    /// Share an already-built HTTP client
    pub fn with_client(client: Client, config: &AssistantConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    fn build_request(&self, system_prompt: &str, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.temperature,
            stream: false,
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, system_prompt: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = self.build_request(system_prompt, prompt);

        debug!(model = %self.model, prompt_chars = prompt.len(), "Calling chat completions API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Chat completions request failed: {}", e);
                AssistantError::Llm(format!("request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Chat completions error response: {}", error_text);
            return Err(AssistantError::Llm(format!(
                "API returned {}: {}",
                status,
                api_error_message(&error_text)
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!("Failed to parse chat completions response: {}", e);
            AssistantError::Llm(format!("response parse error: {}", e))
        })?;

        let answer = first_choice_text(completion)?;

        debug!(answer_chars = answer.len(), "Chat completion received");

        Ok(answer)
    }
}

/// Pull `error.message` out of an API error body, falling back to the raw text
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn first_choice_text(completion: ChatCompletionResponse) -> Result<String> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AssistantError::Llm("No choices in completion response".to_string()))?;

    if let Some(reason) = choice.finish_reason.as_deref() {
        if reason == "content_filter" {
            return Err(AssistantError::Llm(
                "Completion was blocked by the content filter".to_string(),
            ));
        }
    }

    choice
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AssistantError::Llm("Empty completion from model".to_string()))
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
