use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

/// Voice settings handed to the synthesis backend on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceParameters {
  pub language: String,
  pub speaker: String,
  pub speed: f32,
  pub device: String,
}

impl Default for VoiceParameters {
  fn default() -> Self {
    Self {
      language: String::from("KR"),
      speaker: String::from("KR"),
      speed: 1.3,
      device: String::from("cpu"),
    }
  }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Synthesizer: Send + Sync {
  /// Converts `text` into a WAV payload.
  async fn synthesize(&self, text: &str, voice: &VoiceParameters) -> Result<Bytes>;
}
