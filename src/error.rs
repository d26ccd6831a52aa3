use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("Unable to reach the countries API: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("Countries API responded with {status}")]
  Response { status: StatusCode },
  #[error("Unable to read the countries payload: {0}")]
  Decode(#[source] reqwest::Error),
}

impl Error {
  /// Sorts a failure from reading the response body into a payload or a transport problem.
  pub fn from_body(err: reqwest::Error) -> Error {
    if err.is_decode() { Error::Decode(err) } else { Error::Transport(err) }
  }
}
