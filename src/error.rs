//! Error types for session-store and remote-client operations.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the session store.
#[derive(Debug, Error)]
pub enum Error {
  /// Remote access is not configured (endpoint URL, project, or access
  /// token missing). Every ensure operation checks this first.
  #[error("Team Services is not configured: set the endpoint URL, project and access token")]
  MissingConfiguration,

  /// The resolved iteration has no work items assigned to it.
  #[error("no user stories found in iteration '{path}'")]
  NoUserStories { path: String },

  /// Configuration file could not be located, read or parsed.
  #[error("configuration error: {0}")]
  Config(String),

  /// Transport or service failure, propagated verbatim from the client.
  #[error(transparent)]
  Remote(#[from] RemoteError),
}

/// Errors produced by a [`WorkTrackingClient`](crate::WorkTrackingClient)
/// implementation.
#[derive(Debug, Error)]
pub enum RemoteError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{operation} failed with HTTP {status}")]
  Api { operation: &'static str, status: u16 },

  #[error("failed to decode {operation} response: {source}")]
  Decode {
    operation: &'static str,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid endpoint URL: {0}")]
  InvalidUrl(#[from] url::ParseError),
}
