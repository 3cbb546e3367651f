use crate::contracts::{
  self,
  playback::{Artifact, Delivery},
  PostOptions,
};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

use super::{public_path, PLAY_COMMAND};

#[derive(Debug, Serialize)]
struct PlayCommand<'a> {
  command: &'a str,
  data: &'a str,
}

#[derive(Debug)]
pub struct Config {
  /// `host:port` of the speaker server.
  pub speaker: String,
  /// Prefix the speaker server uses to reach the artifacts.
  pub public_location: String,
  pub timeout: Option<Duration>,
}

/// Tells a speaker server on another machine to play the artifact.
pub struct SpeakerServer {
  config: Config,
  http_client: Arc<dyn contracts::HttpClient>,
}

impl SpeakerServer {
  pub fn new(config: Config, http_client: Arc<dyn contracts::HttpClient>) -> Self {
    Self {
      config,
      http_client,
    }
  }
}

#[async_trait]
impl contracts::playback::Playback for SpeakerServer {
  #[tracing::instrument(name = "SpeakerServer::deliver", skip_all, fields(artifact = %artifact.name))]
  async fn deliver(&self, artifact: &Artifact) -> Result<Delivery> {
    let data = public_path(&self.config.public_location, &artifact.name);
    let body = PlayCommand {
      command: PLAY_COMMAND,
      data: &data,
    };

    let response = self
      .http_client
      .post(
        &format!("http://{}/", self.config.speaker),
        serde_json::to_vec(&body)?,
        Some(PostOptions {
          headers: Some(vec![(
            "Content-Type".to_string(),
            "application/json".to_string(),
          )]),
          timeout: self.config.timeout,
        }),
      )
      .await?;

    if response.status != StatusCode::OK {
      let error = anyhow::anyhow!(
        "speaker server rejected play command. speaker={} status={} request_body={:?} response={:?}",
        self.config.speaker,
        response.status,
        &body,
        String::from_utf8_lossy(&response.body)
      );
      error!("error={:?}", error);
      return Err(error);
    }

    info!("play command sent. speaker={}", self.config.speaker);

    Ok(Delivery::Forwarded {
      speaker: self.config.speaker.clone(),
    })
  }
}
