use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Storage: Send + Sync {
  /// Returns true when an artifact called `name` is present.
  async fn exists(&self, name: &str) -> Result<bool>;

  /// Writes `bytes` to the artifact called `name`, replacing it if it exists.
  async fn write(&self, name: &str, bytes: Bytes) -> Result<()>;

  /// Where the artifact called `name` lives.
  fn path(&self, name: &str) -> PathBuf;
}
