use crate::contracts::{
  self,
  playback::{Artifact, Delivery},
};
use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::{public_path, PLAY_COMMAND};

/// Leaves the artifact where it is and tells the caller where another process can
/// pick it up.
pub struct FileDrop {
  public_location: String,
}

impl FileDrop {
  pub fn new(public_location: String) -> Self {
    Self { public_location }
  }
}

#[async_trait]
impl contracts::playback::Playback for FileDrop {
  #[tracing::instrument(name = "FileDrop::deliver", skip_all, fields(artifact = %artifact.name))]
  async fn deliver(&self, artifact: &Artifact) -> Result<Delivery> {
    let data = public_path(&self.public_location, &artifact.name);

    info!("artifact dropped. data={}", data);

    Ok(Delivery::Dropped {
      command: PLAY_COMMAND.to_string(),
      data,
    })
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use crate::contracts::playback::Playback;

  use super::*;

  #[tokio::test]
  async fn points_at_the_public_location() -> Result<(), Box<dyn std::error::Error>> {
    let file_drop = FileDrop::new("/mnt/kiosk/".to_string());

    let delivery = file_drop
      .deliver(&Artifact {
        name: "a.wav".to_string(),
        path: PathBuf::from("/srv/audio/a.wav"),
      })
      .await?;

    assert_eq!(
      Delivery::Dropped {
        command: "play".to_string(),
        data: "/mnt/kiosk/a.wav".to_string(),
      },
      delivery
    );

    Ok(())
  }
}
