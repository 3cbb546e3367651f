use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// A synthesized audio file on storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
  pub name: String,
  pub path: PathBuf,
}

/// What happened to an artifact after it was handed to a playback destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
  /// Played on this machine.
  Played,
  /// A play command was accepted by a speaker server.
  Forwarded { speaker: String },
  /// Left on storage for another process, which should run `command` on `data`.
  Dropped { command: String, data: String },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Playback: Send + Sync {
  async fn deliver(&self, artifact: &Artifact) -> Result<Delivery>;
}
