//! Maps text to the audio file it was synthesized into so repeated text is
//! only synthesized once.
//!
//! Entries live in memory only. An entry whose file has disappeared from
//! storage is treated as a miss and replaced by a freshly synthesized file
//! with a new name.

use std::{collections::HashMap, sync::Arc};

use rand::Rng;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::info;

use crate::{
  contracts::{self, playback::Artifact, tts::VoiceParameters},
  error::{Error, Result},
};

/// SHA-256 of the normalized text, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
  pub fn of(text: &str) -> Self {
    Self(hex::encode(Sha256::digest(text.as_bytes())))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
  pub key: CacheKey,
  pub artifact_name: String,
}

/// Entry currently stored for a key, if any.
type Slot = Arc<Mutex<Option<CacheEntry>>>;

pub struct AudioCache {
  storage: Arc<dyn contracts::storage::Storage>,
  synthesizer: Arc<dyn contracts::tts::Synthesizer>,
  voice: VoiceParameters,
  /// The slot lock is held while synthesizing, so concurrent misses on the
  /// same key wait for one synthesis instead of starting their own.
  slots: Mutex<HashMap<CacheKey, Slot>>,
}

/// Returns None when there is nothing to say.
fn normalize(text: &str) -> Option<&str> {
  let text = text.trim();
  if text.is_empty() {
    None
  } else {
    Some(text)
  }
}

impl AudioCache {
  pub fn new(
    storage: Arc<dyn contracts::storage::Storage>,
    synthesizer: Arc<dyn contracts::tts::Synthesizer>,
    voice: VoiceParameters,
  ) -> Self {
    Self {
      storage,
      synthesizer,
      voice,
      slots: Mutex::new(HashMap::new()),
    }
  }

  /// Returns the artifact holding `text` as speech, synthesizing it when there is
  /// no cached artifact or the cached one is gone from storage.
  #[tracing::instrument(name = "AudioCache::resolve", skip_all, fields(key, hit))]
  pub async fn resolve(&self, text: &str) -> Result<Artifact> {
    let text = normalize(text).ok_or(Error::InvalidInput)?;
    let key = CacheKey::of(text);

    tracing::Span::current().record("key", key.as_str());

    let slot = self.slot(&key).await;
    let mut entry = slot.lock().await;

    if let Some(cached) = entry.as_ref() {
      if self
        .storage
        .exists(&cached.artifact_name)
        .await
        .map_err(Error::Storage)?
      {
        tracing::Span::current().record("hit", &true);
        return Ok(self.artifact(&cached.artifact_name));
      }

      info!(
        "cached artifact is gone from storage. artifact_name={}",
        cached.artifact_name
      );
    }

    tracing::Span::current().record("hit", &false);

    let audio = self
      .synthesizer
      .synthesize(text, &self.voice)
      .await
      .map_err(Error::SynthesisFailure)?;

    let name = self.new_artifact_name(&key).await?;

    self
      .storage
      .write(&name, audio)
      .await
      .map_err(Error::Storage)?;

    info!("synthesized artifact. artifact_name={}", name);

    let artifact = self.artifact(&name);

    *entry = Some(CacheEntry {
      key,
      artifact_name: name,
    });

    Ok(artifact)
  }

  /// The entry currently mapped to `text`, without checking storage.
  #[cfg(test)]
  pub async fn entry(&self, text: &str) -> Option<CacheEntry> {
    let key = CacheKey::of(normalize(text)?);

    let slot = self.slots.lock().await.get(&key).cloned()?;

    let entry = slot.lock().await.clone();
    entry
  }

  /// Number of keys mapped to an artifact.
  #[cfg(test)]
  pub async fn len(&self) -> usize {
    let slots: Vec<Slot> = self.slots.lock().await.values().cloned().collect();

    let mut len = 0;
    for slot in slots {
      if slot.lock().await.is_some() {
        len += 1;
      }
    }

    len
  }

  async fn slot(&self, key: &CacheKey) -> Slot {
    let mut slots = self.slots.lock().await;
    Arc::clone(slots.entry(key.clone()).or_default())
  }

  fn artifact(&self, name: &str) -> Artifact {
    Artifact {
      name: name.to_owned(),
      path: self.storage.path(name),
    }
  }

  /// `<key prefix>-<random>.wav`, drawn again if a file with that name already exists.
  async fn new_artifact_name(&self, key: &CacheKey) -> Result<String> {
    loop {
      let suffix: u128 = rand::thread_rng().gen();
      let name = format!("{}-{:032x}.wav", &key.as_str()[..16], suffix);

      if !self.storage.exists(&name).await.map_err(Error::Storage)? {
        return Ok(name);
      }
    }
  }
}
