use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_futures::Instrument;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, Registry};
use tracing_tree::HierarchicalLayer;

use crate::{
  cache::AudioCache,
  config::{Config, LogFormat, PlaybackMode},
  contracts::{playback::Playback, tts::Synthesizer, HttpClient},
  infra::{
    http::ReqwestHttpClient,
    playback::{speaker, FileDrop, LocalPlayer, SpeakerServer},
    storage::{local, LocalStorage},
  },
  service::Speaker,
  tts::{CommandSynthesizer, HttpSynthesizer},
};

mod api;
mod cache;
mod config;
mod contracts;
mod error;
mod infra;
mod service;
mod tts;

fn init_tracing(log_format: LogFormat) -> Result<WorkerGuard> {
  let (non_blocking_writer, guard) = tracing_appender::non_blocking(std::io::stdout());

  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  match log_format {
    LogFormat::Bunyan => {
      let app_name = concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION")).to_string();

      let bunyan_formatting_layer = BunyanFormattingLayer::new(app_name, non_blocking_writer);

      let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(bunyan_formatting_layer);

      tracing::subscriber::set_global_default(subscriber)?;
    }
    LogFormat::Tree => {
      let subscriber = Registry::default().with(env_filter).with(
        HierarchicalLayer::new(2)
          .with_targets(true)
          .with_writer(non_blocking_writer),
      );

      tracing::subscriber::set_global_default(subscriber)?;
    }
  }

  Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  dotenv::dotenv().ok();

  let config = Config::parse();

  let _guard = init_tracing(config.log_format)?;

  info!("tts relay run with: config={:?}", config);

  let storage = Arc::new(
    LocalStorage::new(local::Config {
      root: config.file_location.clone(),
    })
    .await?,
  );

  let public_location = config
    .public_location
    .clone()
    .unwrap_or_else(|| storage.root().display().to_string());

  let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());

  let synthesizer: Arc<dyn Synthesizer> = match &config.tts_command {
    Some(command) => Arc::new(CommandSynthesizer::parse(command)?),
    None => Arc::new(HttpSynthesizer::new(
      tts::Config {
        url: config.tts_url.clone(),
        timeout: config.tts_timeout(),
      },
      Arc::clone(&http_client),
    )),
  };

  let playback: Arc<dyn Playback> = match config.mode {
    PlaybackMode::Local => Arc::new(LocalPlayer::parse(&config.player)?),
    PlaybackMode::FileDrop => Arc::new(FileDrop::new(public_location)),
    PlaybackMode::Speaker => Arc::new(SpeakerServer::new(
      speaker::Config {
        speaker: config.speaker.clone(),
        public_location,
        timeout: Some(config.speaker_timeout()),
      },
      Arc::clone(&http_client),
    )),
  };

  let cache = AudioCache::new(storage.clone(), synthesizer, config.voice());

  let app = api::router(Arc::new(api::State {
    speaker: Arc::new(Speaker::new(cache, playback)),
    artifacts_dir: storage.root().to_path_buf(),
  }));

  let addr = tokio::net::lookup_host((config.host.as_str(), config.port))
    .await?
    .next()
    .with_context(|| format!("unable to resolve address. host={}", config.host))?;

  info!("listening. addr={}", addr);

  axum::Server::bind(&addr)
    .serve(app.into_make_service())
    .instrument(tracing::info_span!("server", %addr))
    .await?;

  Ok(())
}
