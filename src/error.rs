//! Typed failures for fetching and reporting.
//!
//! A non-success HTTP status is deliberately absent here: it ends a traversal
//! early and is reported through [`crate::cache::Completion::Truncated`].

use thiserror::Error;
use url::Url;

/// Failures that abort a traversal.
#[derive(Debug, Error)]
pub enum FetchError {
  /// The request never produced a usable response (connection refused,
  /// timeout, body read failure).
  #[error("GET {url} failed: {source}")]
  Transport {
    url: Url,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// The response was successful but its body was not the expected list.
  #[error("malformed response body from {url}: {source}")]
  Decode {
    url: Url,
    #[source]
    source: serde_json::Error,
  },

  /// An endpoint URL could not be built from the configured API base.
  #[error("invalid endpoint URL {url}: {source}")]
  InvalidUrl {
    url: String,
    #[source]
    source: url::ParseError,
  },
}

impl FetchError {
  pub fn transport(url: &Url, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
    Self::Transport {
      url: url.clone(),
      source: source.into(),
    }
  }
}

/// Failures while producing the summary report.
#[derive(Debug, Error)]
pub enum ReportError {
  #[error(transparent)]
  Fetch(#[from] FetchError),

  #[error("failed to write report: {0}")]
  Io(#[from] std::io::Error),
}
