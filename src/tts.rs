use std::{io::ErrorKind, path::Path, process::Stdio, sync::Arc, time::Duration};

use crate::contracts::{self, tts::VoiceParameters, PostOptions};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
  pub text: &'a str,
  #[serde(flatten)]
  pub voice: &'a VoiceParameters,
}

#[derive(Debug)]
pub struct Config {
  /// Endpoint of the model server, e.g. `http://localhost:8888/tts`.
  pub url: String,
  pub timeout: Option<Duration>,
}

/// Asks a model server over http to turn text into a wav file.
pub struct HttpSynthesizer {
  config: Config,
  http_client: Arc<dyn contracts::HttpClient>,
}

impl HttpSynthesizer {
  pub fn new(config: Config, http_client: Arc<dyn contracts::HttpClient>) -> Self {
    Self {
      config,
      http_client,
    }
  }
}

#[async_trait]
impl contracts::tts::Synthesizer for HttpSynthesizer {
  /// Sends `text` to the model server and returns the wav it answers with.
  #[tracing::instrument(name = "HttpSynthesizer::synthesize", skip_all, fields(text_len = text.len()))]
  async fn synthesize(&self, text: &str, voice: &VoiceParameters) -> Result<Bytes> {
    let body = SynthesizeRequest { text, voice };

    let response = self
      .http_client
      .post(
        &self.config.url,
        serde_json::to_vec(&body)?,
        Some(PostOptions {
          headers: Some(vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "audio/wav".to_string()),
          ]),
          timeout: self.config.timeout,
        }),
      )
      .await
      .with_context(|| format!("url={} request_body={:?}", self.config.url, &body))?;

    if !response.status.is_success() {
      let error = anyhow::anyhow!(
        "unexpected tts response. status={} request_body={:?} response={:?}",
        response.status,
        &body,
        String::from_utf8_lossy(&response.body)
      );
      error!("error={:?}", error);
      return Err(error);
    }

    if response.body.is_empty() {
      anyhow::bail!("tts returned an empty body. request_body={:?}", &body);
    }

    info!("synthesized audio. bytes={}", response.body.len());

    Ok(response.body)
  }
}

/// Placeholder replaced by the path the command must write the wav file to.
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Runs a local tts program, e.g. `piper --model voice.onnx --output_file {output}`.
///
/// The text is written to the program's stdin. Besides `{output}`, the arguments may
/// contain `{language}`, `{speaker}`, `{speed}` and `{device}`.
#[derive(Debug)]
pub struct CommandSynthesizer {
  program: String,
  args: Vec<String>,
}

impl CommandSynthesizer {
  pub fn new(program: String, args: Vec<String>) -> Result<Self> {
    if !args.iter().any(|arg| arg.contains(OUTPUT_PLACEHOLDER)) {
      anyhow::bail!(
        "tts command must contain an {} argument. program={} args={:?}",
        OUTPUT_PLACEHOLDER,
        program,
        args
      );
    }

    Ok(Self { program, args })
  }

  /// Splits `command` on whitespace. Quoting is not supported.
  pub fn parse(command: &str) -> Result<Self> {
    let mut words = command.split_whitespace().map(String::from);

    let program = words.next().context("tts command is empty")?;

    Self::new(program, words.collect())
  }

  fn args_for(&self, output: &str, voice: &VoiceParameters) -> Vec<String> {
    self
      .args
      .iter()
      .map(|arg| {
        arg
          .replace(OUTPUT_PLACEHOLDER, output)
          .replace("{language}", &voice.language)
          .replace("{speaker}", &voice.speaker)
          .replace("{speed}", &voice.speed.to_string())
          .replace("{device}", &voice.device)
      })
      .collect()
  }
}

#[async_trait]
impl contracts::tts::Synthesizer for CommandSynthesizer {
  #[tracing::instrument(name = "CommandSynthesizer::synthesize", skip_all, fields(text_len = text.len()))]
  async fn synthesize(&self, text: &str, voice: &VoiceParameters) -> Result<Bytes> {
    let output = std::env::temp_dir().join(format!(
      "tts_relay-{:032x}.wav",
      rand::thread_rng().gen::<u128>()
    ));

    let result = self.run(text, voice, &output).await;

    if let Err(err) = tokio::fs::remove_file(&output).await {
      if err.kind() != ErrorKind::NotFound {
        warn!("unable to remove tts output. path={:?} error={:?}", output, err);
      }
    }

    result
  }
}

impl CommandSynthesizer {
  async fn run(&self, text: &str, voice: &VoiceParameters, output: &Path) -> Result<Bytes> {
    let args = self.args_for(&output.to_string_lossy(), voice);

    let mut child = tokio::process::Command::new(&self.program)
      .args(&args)
      .stdin(Stdio::piped())
      .stdout(Stdio::null())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .spawn()
      .with_context(|| format!("unable to start tts command. program={}", self.program))?;

    let stdin = child.stdin.take();

    // Written while stderr is drained, otherwise a chatty program and a long text
    // can fill both pipes. Dropping stdin closes it so the program sees the end of
    // the text.
    let write_text = async move {
      if let Some(mut stdin) = stdin {
        match stdin.write_all(text.as_bytes()).await {
          Err(err) if err.kind() == ErrorKind::BrokenPipe => {
            debug!("tts command closed stdin before reading all of the text");
          }
          Err(err) => return Err(err),
          Ok(()) => {}
        }
      }

      Ok(())
    };

    let (written, result) = tokio::join!(write_text, child.wait_with_output());

    written.with_context(|| format!("unable to write text to tts command. program={}", self.program))?;
    let result = result?;

    if !result.status.success() {
      anyhow::bail!(
        "tts command failed. program={} status={} stderr={:?}",
        self.program,
        result.status,
        String::from_utf8_lossy(&result.stderr)
      );
    }

    let audio = tokio::fs::read(output)
      .await
      .with_context(|| format!("tts command did not write its output. path={:?}", output))?;

    if audio.is_empty() {
      anyhow::bail!("tts command wrote an empty file. program={}", self.program);
    }

    info!("synthesized audio. bytes={}", audio.len());

    Ok(Bytes::from(audio))
  }
}
