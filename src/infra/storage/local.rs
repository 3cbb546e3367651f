use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::contracts;
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug)]
pub struct Config {
  /// Directory the artifacts are written to. Created if it does not exist.
  pub root: PathBuf,
}

/// Keeps artifacts as plain files in a single directory.
#[derive(Debug)]
pub struct LocalStorage {
  root: PathBuf,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidArtifactName {
  #[error("artifact name is empty")]
  Empty,
  #[error("artifact name must be a plain file name: {0}")]
  NotAFileName(String),
}

impl LocalStorage {
  #[tracing::instrument(name = "LocalStorage::new", skip_all, fields(root = ?config.root))]
  pub async fn new(config: Config) -> Result<Self> {
    tokio::fs::create_dir_all(&config.root)
      .await
      .with_context(|| format!("unable to create artifact directory. root={:?}", config.root))?;

    let root = tokio::fs::canonicalize(&config.root)
      .await
      .with_context(|| format!("unable to resolve artifact directory. root={:?}", config.root))?;

    Ok(Self { root })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn checked_path(&self, name: &str) -> Result<PathBuf, InvalidArtifactName> {
    if name.is_empty() {
      return Err(InvalidArtifactName::Empty);
    }

    if name == "." || name == ".." || name.contains(['/', '\\']) {
      return Err(InvalidArtifactName::NotAFileName(name.to_owned()));
    }

    Ok(self.root.join(name))
  }
}

#[async_trait]
impl contracts::storage::Storage for LocalStorage {
  #[tracing::instrument(name = "LocalStorage::exists", skip_all, fields(name = %name))]
  async fn exists(&self, name: &str) -> Result<bool> {
    let path = self.checked_path(name)?;

    match tokio::fs::metadata(&path).await {
      Ok(metadata) => Ok(metadata.is_file()),
      Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
      Err(err) => Err(err).with_context(|| format!("unable to stat artifact. path={:?}", path)),
    }
  }

  #[tracing::instrument(name = "LocalStorage::write", skip_all, fields(name = %name, bytes = bytes.len()))]
  async fn write(&self, name: &str, bytes: Bytes) -> Result<()> {
    let path = self.checked_path(name)?;

    tokio::fs::write(&path, &bytes)
      .await
      .with_context(|| format!("unable to write artifact. path={:?}", path))?;

    Ok(())
  }

  fn path(&self, name: &str) -> PathBuf {
    self.root.join(name)
  }
}

#[cfg(test)]
mod tests {
  use crate::contracts::storage::Storage;

  use super::*;

  #[tokio::test]
  async fn basic() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;

    let storage = LocalStorage::new(Config {
      root: dir.path().join("audio"),
    })
    .await?;

    assert!(!storage.exists("i_dont_exist.wav").await?);

    storage
      .write("hello.wav", Bytes::from_static(b"RIFF"))
      .await?;

    assert!(storage.exists("hello.wav").await?);
    assert_eq!(b"RIFF".to_vec(), std::fs::read(storage.path("hello.wav"))?);

    std::fs::remove_file(storage.path("hello.wav"))?;

    assert!(!storage.exists("hello.wav").await?);

    Ok(())
  }

  #[tokio::test]
  async fn rejects_names_that_escape_the_root() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let storage = LocalStorage::new(Config {
      root: dir.path().to_path_buf(),
    })
    .await?;

    for name in ["", ".", "..", "../escape.wav", "nested/file.wav", "C:\\file.wav"] {
      assert!(
        storage.write(name, Bytes::from_static(b"RIFF")).await.is_err(),
        "name={}",
        name
      );
    }

    assert_eq!(
      Err(InvalidArtifactName::NotAFileName("../escape.wav".to_owned())),
      storage.checked_path("../escape.wav")
    );

    Ok(())
  }

  #[tokio::test]
  async fn a_directory_is_not_an_artifact() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let storage = LocalStorage::new(Config {
      root: dir.path().to_path_buf(),
    })
    .await?;

    std::fs::create_dir(dir.path().join("folder.wav"))?;

    assert!(!storage.exists("folder.wav").await?);

    Ok(())
  }
}
