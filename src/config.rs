use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};

use crate::contracts::tts::VoiceParameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlaybackMode {
  /// Play on this machine.
  Local,
  /// Leave the file for another process and answer with a play command.
  FileDrop,
  /// Send a play command to a speaker server.
  Speaker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
  Bunyan,
  Tree,
}

/// Speaks text through a text-to-speech backend and relays the audio.
///
/// Every flag can also be set through the environment or a `.env` file.
#[derive(Debug, Parser)]
#[command(name = "tts_relay", version)]
pub struct Config {
  #[arg(long, env = "TTS_RELAY_HOST", default_value = "localhost")]
  pub host: String,

  /// Port on which the server runs
  #[arg(long, env = "TTS_RELAY_PORT", default_value_t = 5555)]
  pub port: u16,

  /// What to do with the audio once it is synthesized
  #[arg(long, env = "TTS_RELAY_MODE", value_enum, default_value_t = PlaybackMode::Local)]
  pub mode: PlaybackMode,

  /// Speaker server address, used in speaker mode
  #[arg(long, env = "TTS_RELAY_SPEAKER", default_value = "192.168.10.60:8080")]
  pub speaker: String,

  /// Where the server writes the audio files
  #[arg(long, env = "TTS_RELAY_FILE_LOCATION", default_value = "./audio")]
  pub file_location: PathBuf,

  /// How consumers reach `file_location`, e.g. a mount point on another machine.
  /// Defaults to `file_location` itself.
  #[arg(long, env = "TTS_RELAY_PUBLIC_LOCATION")]
  pub public_location: Option<String>,

  /// Text-to-speech model server
  #[arg(long, env = "TTS_RELAY_TTS_URL", default_value = "http://localhost:8888/tts")]
  pub tts_url: String,

  #[arg(long, env = "TTS_RELAY_TTS_TIMEOUT_SECS")]
  pub tts_timeout_secs: Option<u64>,

  /// Run a local program instead of calling the model server,
  /// e.g. "piper --model voice.onnx --output_file {output}"
  #[arg(long, env = "TTS_RELAY_TTS_COMMAND")]
  pub tts_command: Option<String>,

  #[arg(long, env = "TTS_RELAY_LANGUAGE", default_value = "KR")]
  pub language: String,

  #[arg(long, env = "TTS_RELAY_SPEAKER_ID", default_value = "KR")]
  pub speaker_id: String,

  #[arg(long, env = "TTS_RELAY_SPEED", default_value_t = 1.3)]
  pub speed: f32,

  /// Device the model runs on, e.g. cpu or cuda:0
  #[arg(long, env = "TTS_RELAY_DEVICE", default_value = "cpu")]
  pub device: String,

  /// Player used in local mode. The file path is appended to it.
  #[arg(long, env = "TTS_RELAY_PLAYER", default_value = "aplay -q")]
  pub player: String,

  /// Timeout for play commands sent to the speaker server
  #[arg(long, env = "TTS_RELAY_SPEAKER_TIMEOUT_SECS", default_value_t = 10)]
  pub speaker_timeout_secs: u64,

  #[arg(long, env = "TTS_RELAY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Bunyan)]
  pub log_format: LogFormat,
}

impl Config {
  pub fn voice(&self) -> VoiceParameters {
    VoiceParameters {
      language: self.language.clone(),
      speaker: self.speaker_id.clone(),
      speed: self.speed,
      device: self.device.clone(),
    }
  }

  pub fn tts_timeout(&self) -> Option<Duration> {
    self.tts_timeout_secs.map(Duration::from_secs)
  }

  pub fn speaker_timeout(&self) -> Duration {
    Duration::from_secs(self.speaker_timeout_secs)
  }
}
