//! Optional voice input
//!
//! Voice is probed once at startup and injected as
//! `Option<Arc<dyn SpeechToText>>`. Capture is delegated to an external
//! recorder command that writes one WAV utterance to stdout; the audio is
//! then sent to an OpenAI-compatible transcription endpoint.

use crate::config::AssistantConfig;
use crate::error::AssistantError;
use crate::Result;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::collections::VecDeque;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Capture one utterance and return its transcript
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn listen(&self) -> Result<String>;
}

/// Probe for voice support; `None` means text-only
pub fn probe(config: &AssistantConfig, client: &Client) -> Option<Arc<dyn SpeechToText>> {
    let Some(raw) = config.voice_record_command.as_deref() else {
        info!("Voice input disabled: ASSISTANT_VOICE_RECORD_CMD not set");
        return None;
    };

    let Some((program, args)) = split_command(raw) else {
        warn!("Voice input disabled: ASSISTANT_VOICE_RECORD_CMD is empty");
        return None;
    };

    let Some(resolved) = resolve_program(&program) else {
        warn!(%program, "Voice input disabled: recorder not found on PATH");
        return None;
    };

    info!(recorder = %resolved.display(), "Voice input enabled");

    Some(Arc::new(RecorderTranscriber {
        program: resolved,
        args,
        client: client.clone(),
        api_key: config.api_key.clone(),
        base_url: config.base_url.clone(),
        model: config.transcription_model.clone(),
        language: config.speech_language.clone(),
    }))
}

/// Split a whitespace-separated command line into program and arguments
fn split_command(raw: &str) -> Option<(String, Vec<String>)> {
    let mut parts = raw.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

/// Locate an executable the way a shell would
fn resolve_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|full| full.is_file())
}

/// External recorder + hosted transcription
pub struct RecorderTranscriber {
    program: PathBuf,
    args: Vec<String>,
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    language: String,
}

impl RecorderTranscriber {
    async fn record(&self) -> Result<Vec<u8>> {
        debug!(recorder = %self.program.display(), "Recording utterance");

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| AssistantError::Transcription(format!("could not start recorder: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AssistantError::Transcription(format!(
                "recorder exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        if output.stdout.is_empty() {
            return Err(AssistantError::Transcription("no audio captured".to_string()));
        }

        Ok(output.stdout)
    }

    async fn transcribe(&self, audio: Vec<u8>) -> Result<String> {
        let file = Part::bytes(audio)
            .file_name("utterance.wav")
            .mime_str("audio/wav")?;

        let form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("language", self.language.clone());

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AssistantError::Transcription(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Transcription(format!(
                "service returned {}: {}",
                status,
                body.trim()
            )));
        }

        let transcript: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::Transcription(format!("invalid response: {}", e)))?;

        let text = transcript.text.trim().to_string();
        if text.is_empty() {
            return Err(AssistantError::Transcription("no speech recognized".to_string()));
        }

        Ok(text)
    }
}

#[async_trait]
impl SpeechToText for RecorderTranscriber {
    async fn listen(&self) -> Result<String> {
        let audio = self.record().await?;
        debug!(bytes = audio.len(), "Utterance captured");
        self.transcribe(audio).await
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Canned transcripts for development & testing
#[derive(Default)]
pub struct ScriptedSpeech {
    results: Mutex<VecDeque<std::result::Result<String, String>>>,
}

impl ScriptedSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hears(self, text: &str) -> Self {
        if let Ok(mut results) = self.results.lock() {
            results.push_back(Ok(text.to_string()));
        }
        self
    }

    pub fn fails(self, message: &str) -> Self {
        if let Ok(mut results) = self.results.lock() {
            results.push_back(Err(message.to_string()));
        }
        self
    }
}

#[async_trait]
impl SpeechToText for ScriptedSpeech {
    async fn listen(&self) -> Result<String> {
        let next = self
            .results
            .lock()
            .map_err(|_| AssistantError::Transcription("scripted speech poisoned".to_string()))?
            .pop_front();

        match next {
            Some(Ok(text)) => Ok(text.trim().to_string()),
            Some(Err(message)) => Err(AssistantError::Transcription(message)),
            None => Err(AssistantError::Transcription("no speech recognized".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_recorder(cmd: Option<&str>) -> AssistantConfig {
        let cmd = cmd.map(str::to_string);
        AssistantConfig::from_lookup(move |key| match key {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            "ASSISTANT_VOICE_RECORD_CMD" => cmd.clone(),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_split_command() {
        let (program, args) = split_command("arecord -q -d 5 -t wav").unwrap();
        assert_eq!(program, "arecord");
        assert_eq!(args, vec!["-q", "-d", "5", "-t", "wav"]);
        assert!(split_command("   ").is_none());
    }

    #[test]
    fn test_probe_without_recorder_disables_voice() {
        let client = Client::new();
        assert!(probe(&config_with_recorder(None), &client).is_none());
        assert!(probe(&config_with_recorder(Some("no-such-recorder-binary-4711")), &client).is_none());
        assert!(probe(&config_with_recorder(Some("/no/such/dir/recorder")), &client).is_none());
    }

    #[test]
    fn test_resolve_program_missing() {
        assert!(resolve_program("no-such-recorder-binary-4711").is_none());
    }

    #[tokio::test]
    async fn test_recorder_without_audio_is_transcription_error() {
        let Some(program) = resolve_program("true") else {
            return;
        };
        let transcriber = RecorderTranscriber {
            program,
            args: vec![],
            client: Client::new(),
            api_key: "sk-test".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            model: "whisper-1".to_string(),
            language: "en".to_string(),
        };

        let err = transcriber.listen().await.unwrap_err();
        assert!(matches!(err, AssistantError::Transcription(_)));
        assert!(err.to_string().contains("no audio captured"));
    }

    #[tokio::test]
    async fn test_scripted_speech() {
        let speech = ScriptedSpeech::new().hears("  quanto ho speso  ").fails("too noisy");
        assert_eq!(speech.listen().await.unwrap(), "quanto ho speso");
        assert!(speech.listen().await.is_err());
        assert!(speech.listen().await.is_err());
    }
}
