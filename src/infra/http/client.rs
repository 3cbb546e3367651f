use crate::contracts::{self, PostOptions, PostResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;

pub struct ReqwestHttpClient {
  client: reqwest::Client,
}

impl ReqwestHttpClient {
  pub fn new() -> Self {
    Self {
      client: reqwest::Client::new(),
    }
  }
}

#[async_trait]
impl contracts::HttpClient for ReqwestHttpClient {
  #[tracing::instrument(name = "ReqwestHttpClient::post", skip_all, fields(url = %url, status))]
  async fn post(
    &self,
    url: &str,
    body: Vec<u8>,
    options: Option<PostOptions>,
  ) -> Result<PostResponse> {
    let mut request_builder = self.client.post(url).body(body);

    if let Some(options) = options {
      if let Some(headers) = options.headers {
        for (key, value) in headers.into_iter() {
          request_builder = request_builder.header(key, value);
        }
      }

      if let Some(timeout) = options.timeout {
        request_builder = request_builder.timeout(timeout);
      }
    }

    let response = request_builder
      .send()
      .await
      .with_context(|| format!("unable to send request. url={}", url))?;

    let status = response.status();

    tracing::Span::current().record("status", &status.as_u16());

    let body = response
      .bytes()
      .await
      .with_context(|| format!("unable to read response body. url={} status={}", url, status))?;

    Ok(PostResponse { status, body })
  }
}
