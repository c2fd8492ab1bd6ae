//! Console input channel
//!
//! Asks for a mode (`text`, `voice`, `exit`) and returns one request or an
//! exit signal. Invalid modes, missing voice support and recognition
//! failures are reported and the mode prompt is shown again.

use crate::voice::SpeechToText;
use crate::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Text,
    Voice,
    Exit,
}

impl InputMode {
    pub fn parse(raw: &str) -> Option<InputMode> {
        match raw.trim().to_lowercase().as_str() {
            "text" => Some(InputMode::Text),
            "voice" => Some(InputMode::Voice),
            "exit" => Some(InputMode::Exit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Trimmed request text, possibly empty
    Request(String),
    Exit,
}

pub struct InputChannel<R, W> {
    reader: R,
    writer: W,
    voice: Option<Arc<dyn SpeechToText>>,
}

impl<R, W> InputChannel<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, voice: Option<Arc<dyn SpeechToText>>) -> Self {
        Self {
            reader,
            writer,
            voice,
        }
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice.is_some()
    }

    /// Console writer, shared with the orchestrator for its output
    pub fn writer(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Prompt until the user gives a request or asks to leave
    pub async fn next_request(&mut self) -> Result<InputEvent> {
        self.say("\n💼 Multimodal financial assistant\n").await?;
        self.say("Choose the mode: [text] [voice] [exit]\n").await?;

        loop {
            self.say("👉 Input mode: ").await?;

            let Some(line) = self.read_line().await? else {
                debug!("Console closed, leaving");
                self.say("\n👋 Leaving the chat. See you soon!\n").await?;
                return Ok(InputEvent::Exit);
            };

            match InputMode::parse(&line) {
                Some(InputMode::Text) => {
                    self.say("✏️ Enter your request: ").await?;
                    let request = self.read_line().await?.unwrap_or_default();
                    return Ok(InputEvent::Request(request.trim().to_string()));
                }
                Some(InputMode::Voice) => {
                    let Some(voice) = self.voice.clone() else {
                        self.say("❌ Voice mode unavailable: no speech recognizer is configured.\n")
                            .await?;
                        continue;
                    };

                    self.say("🎤 Speak now\n").await?;
                    match voice.listen().await {
                        Ok(text) => {
                            let text = text.trim().to_string();
                            self.say(&format!("🎯 Request received: {}\n", text)).await?;
                            return Ok(InputEvent::Request(text));
                        }
                        Err(e) => {
                            warn!(error = %e, "Speech recognition failed");
                            self.say(&format!("❌ Speech recognition error: {}\n", e)).await?;
                        }
                    }
                }
                Some(InputMode::Exit) => {
                    self.say("👋 Leaving the chat. See you soon!\n").await?;
                    return Ok(InputEvent::Exit);
                }
                None => {
                    debug!(mode = %line.trim(), "Rejected input mode");
                    self.say("❌ Invalid mode.\n").await?;
                }
            }
        }
    }

    async fn say(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// `None` on end of input
    async fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            Ok(None)
        } else {
            Ok(Some(line))
        }
    }
}
