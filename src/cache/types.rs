//! Core types for the in-memory caches.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use std::sync::Arc;
use url::Url;

/// How a paginated traversal ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
  /// The last page carried no next link.
  Complete,
  /// A page answered with a non-success status. Items from earlier pages are
  /// kept and treated as the final result.
  Truncated {
    url: Url,
    status: StatusCode,
    body: String,
  },
}

impl Completion {
  pub fn is_complete(&self) -> bool {
    matches!(self, Completion::Complete)
  }
}

/// A fully drained list, materialized before anything can reuse it.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
  items: Vec<T>,
  completion: Completion,
  fetched_at: DateTime<Utc>,
}

impl<T> Fetched<T> {
  pub fn complete(items: Vec<T>) -> Self {
    Self::new(items, Completion::Complete)
  }

  pub fn truncated(items: Vec<T>, url: Url, status: StatusCode, body: String) -> Self {
    Self::new(items, Completion::Truncated { url, status, body })
  }

  fn new(items: Vec<T>, completion: Completion) -> Self {
    Self {
      items,
      completion,
      fetched_at: Utc::now(),
    }
  }

  pub fn items(&self) -> &[T] {
    &self.items
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn completion(&self) -> &Completion {
    &self.completion
  }

  pub fn fetched_at(&self) -> DateTime<Utc> {
    self.fetched_at
  }
}

/// Per-key lifecycle of a cache entry.
///
/// Fetched-ness is explicit: an empty list is `Fetched` like any other.
#[derive(Debug)]
pub enum FetchState<V> {
  NotFetched,
  /// A fetch started and has not finished. Seen on entry only when an
  /// earlier fetch was dropped before completing.
  Fetching,
  Fetched(Arc<V>),
}

impl<V> Default for FetchState<V> {
  fn default() -> Self {
    FetchState::NotFetched
  }
}

impl<V> FetchState<V> {
  pub fn is_fetched(&self) -> bool {
    matches!(self, FetchState::Fetched(_))
  }
}

/// Result from a cache operation, including data and where it came from.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
}

impl<T> CacheResult<T> {
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
    }
  }

  pub fn from_cache(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
    }
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fetched by this call
  Network,
  /// Served from an earlier fetch, no I/O
  Cache,
}
