//! Http surface: `POST /` speaks text, `GET /artifacts/<name>` serves synthesized audio
//! so a speaker on another machine can fetch it.

use std::{path::PathBuf, sync::Arc};

use axum::{
  body::{boxed, Body, BoxBody},
  extract::Extension,
  http::{Request, Response, Uri},
  routing::{get, post},
  Json, Router,
};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{error, info};

use crate::{contracts::playback::Delivery, error::Error, service::Speaker};

pub struct State {
  pub speaker: Arc<Speaker>,
  /// Directory served under `/artifacts`.
  pub artifacts_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
  pub text: Option<String>,
}

pub fn router(state: Arc<State>) -> Router {
  Router::new()
    .route("/", post(speak))
    .nest("/artifacts", get(get_artifact))
    .layer(Extension(state))
}

type ErrorResponse = (StatusCode, Json<Value>);

#[tracing::instrument(name = "POST /", skip_all)]
async fn speak(
  Extension(state): Extension<Arc<State>>,
  Json(request): Json<SpeakRequest>,
) -> Result<Json<Value>, ErrorResponse> {
  let text = request.text.unwrap_or_default();

  match state.speaker.speak(&text).await {
    Ok(spoken) => {
      info!("spoke. artifact_name={}", spoken.artifact.name);
      Ok(Json(match spoken.delivery {
        Delivery::Dropped { command, data } => json!({ "command": command, "data": data }),
        Delivery::Played | Delivery::Forwarded { .. } => {
          json!({ "message": "Audio played successfully" })
        }
      }))
    }
    Err(err) => Err(error_response(err)),
  }
}

fn error_response(err: Error) -> ErrorResponse {
  let (status, message) = match &err {
    Error::InvalidInput => (StatusCode::BAD_REQUEST, "No text provided"),
    Error::SynthesisFailure(_) | Error::Storage(_) => {
      (StatusCode::INTERNAL_SERVER_ERROR, "Failed to synthesize audio")
    }
    Error::TransportFailure(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to send play command"),
  };

  if status.is_server_error() {
    error!("error={:?}", err);
  }

  (status, Json(json!({ "error": message })))
}

#[tracing::instrument(name = "GET /artifacts", skip_all, fields(uri = ?uri))]
async fn get_artifact(
  Extension(state): Extension<Arc<State>>,
  uri: Uri,
) -> Result<Response<BoxBody>, (StatusCode, String)> {
  let req = Request::builder()
    .uri(uri)
    .body(Body::empty())
    .map_err(|err| (StatusCode::BAD_REQUEST, format!("Invalid uri: {}", err)))?;

  // `ServeDir` implements `tower::Service` so we can call it with `tower::ServiceExt::oneshot`
  match ServeDir::new(&state.artifacts_dir).oneshot(req).await {
    Ok(res) => Ok(res.map(boxed)),
    Err(err) => Err((
      StatusCode::INTERNAL_SERVER_ERROR,
      format!("Something went wrong: {}", err),
    )),
  }
}
