use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use std::time::Duration;

pub mod playback;
pub mod storage;
pub mod tts;

#[derive(Debug, Default)]
pub struct PostOptions {
  pub headers: Option<Vec<(String, String)>>,
  pub timeout: Option<Duration>,
}

#[derive(Debug)]
pub struct PostResponse {
  pub status: StatusCode,
  pub body: Bytes,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
  /// Sends `body` and returns the response even when its status is not a success,
  /// callers decide what a failure looks like.
  async fn post(
    &self,
    url: &str,
    body: Vec<u8>,
    options: Option<PostOptions>,
  ) -> Result<PostResponse>;
}
