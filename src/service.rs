use std::sync::Arc;

use anyhow::anyhow;
use tracing::warn;
use tracing_futures::Instrument;

use crate::{
  cache::AudioCache,
  contracts::{
    self,
    playback::{Artifact, Delivery},
  },
  error::{Error, Result},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spoken {
  pub artifact: Artifact,
  pub delivery: Delivery,
}

/// Turns text into audio and hands it to the configured playback destination.
pub struct Speaker {
  cache: Arc<AudioCache>,
  playback: Arc<dyn contracts::playback::Playback>,
}

impl Speaker {
  pub fn new(cache: AudioCache, playback: Arc<dyn contracts::playback::Playback>) -> Self {
    Self {
      cache: Arc::new(cache),
      playback,
    }
  }

  #[cfg(test)]
  pub fn cache(&self) -> &AudioCache {
    &self.cache
  }

  /// Runs on its own task: once started, synthesis and delivery finish even if
  /// the caller stops waiting, so a file written to storage always ends up cached.
  ///
  /// A failed delivery leaves the artifact cached, so speaking the same text
  /// again only retries the delivery.
  #[tracing::instrument(name = "Speaker::speak", skip_all)]
  pub async fn speak(&self, text: &str) -> Result<Spoken> {
    let cache = Arc::clone(&self.cache);
    let playback = Arc::clone(&self.playback);
    let text = text.to_owned();

    let handle = tokio::spawn(
      async move {
        let artifact = cache.resolve(&text).await?;

        let delivery = match playback.deliver(&artifact).await {
          Ok(delivery) => delivery,
          Err(err) => {
            warn!(
              "unable to deliver artifact. artifact_name={} error={:?}",
              artifact.name, err
            );
            return Err(Error::TransportFailure(err));
          }
        };

        Ok(Spoken { artifact, delivery })
      }
      .instrument(tracing::Span::current()),
    );

    match handle.await {
      Ok(result) => result,
      Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
      Err(err) => Err(Error::SynthesisFailure(anyhow!(
        "speak task did not finish. error={:?}",
        err
      ))),
    }
  }
}
