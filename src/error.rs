/// Failures surfaced to whoever asked for text to be spoken.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("no text provided")]
  InvalidInput,
  #[error("unable to synthesize audio: {0}")]
  SynthesisFailure(#[source] anyhow::Error),
  #[error("unable to access audio storage: {0}")]
  Storage(#[source] anyhow::Error),
  #[error("unable to deliver audio: {0}")]
  TransportFailure(#[source] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use anyhow::anyhow;

  use super::*;

  #[test]
  fn cause_is_shown_once() {
    let err = Error::TransportFailure(anyhow!("connection refused").context("speaker unreachable"));

    assert_eq!("unable to deliver audio: speaker unreachable", err.to_string());

    let source = std::error::Error::source(&err).unwrap();
    assert_eq!("speaker unreachable", source.to_string());
    assert_eq!(
      "connection refused",
      source.source().unwrap().to_string()
    );
  }
}
