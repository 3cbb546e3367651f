use std::process::Stdio;

use crate::contracts::{
  self,
  playback::{Artifact, Delivery},
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

/// Plays the artifact on this machine's speakers and waits until it is done.
pub struct LocalPlayer {
  program: String,
  args: Vec<String>,
}

impl LocalPlayer {
  pub fn new(program: String, args: Vec<String>) -> Self {
    Self { program, args }
  }

  /// `aplay -q`, `paplay`, `ffplay -nodisp -autoexit`... The artifact path is
  /// appended as the last argument.
  pub fn parse(command: &str) -> Result<Self> {
    let mut words = command.split_whitespace().map(String::from);

    let program = words.next().context("player command is empty")?;

    Ok(Self::new(program, words.collect()))
  }
}

#[async_trait]
impl contracts::playback::Playback for LocalPlayer {
  #[tracing::instrument(name = "LocalPlayer::deliver", skip_all, fields(artifact = %artifact.name))]
  async fn deliver(&self, artifact: &Artifact) -> Result<Delivery> {
    let output = tokio::process::Command::new(&self.program)
      .args(&self.args)
      .arg(&artifact.path)
      .stdin(Stdio::null())
      .stdout(Stdio::null())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .output()
      .await
      .with_context(|| format!("unable to start player. program={}", self.program))?;

    if !output.status.success() {
      anyhow::bail!(
        "player failed. program={} status={} stderr={:?}",
        self.program,
        output.status,
        String::from_utf8_lossy(&output.stderr)
      );
    }

    info!("artifact played");

    Ok(Delivery::Played)
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use crate::contracts::playback::Playback;

  use super::*;

  fn artifact() -> Artifact {
    Artifact {
      name: "a.wav".to_string(),
      path: PathBuf::from("/srv/audio/a.wav"),
    }
  }

  #[test]
  fn parse() {
    let player = LocalPlayer::parse("ffplay -nodisp -autoexit").unwrap();

    assert_eq!("ffplay", player.program);
    assert_eq!(vec!["-nodisp", "-autoexit"], player.args);

    assert!(LocalPlayer::parse("  ").is_err());
  }

  #[tokio::test]
  async fn passes_the_artifact_path_to_the_player() -> Result<(), Box<dyn std::error::Error>> {
    let player = LocalPlayer::new(
      "sh".to_string(),
      vec![
        "-c".to_string(),
        r#"test "$1" = /srv/audio/a.wav"#.to_string(),
        "player".to_string(),
      ],
    );

    assert_eq!(Delivery::Played, player.deliver(&artifact()).await?);

    Ok(())
  }

  #[tokio::test]
  async fn player_failure_is_an_error() {
    let player = LocalPlayer::new("sh".to_string(), vec!["-c".to_string(), "exit 1".to_string()]);

    assert!(player.deliver(&artifact()).await.is_err());
  }

  #[tokio::test]
  async fn missing_player_is_an_error() {
    let player = LocalPlayer::new("tts-relay-no-such-player".to_string(), vec![]);

    assert!(player.deliver(&artifact()).await.is_err());
  }
}
