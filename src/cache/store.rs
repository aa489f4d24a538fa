//! Keyed in-memory cache with an explicit fetch lifecycle per key.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use tracing::{debug, warn};

use super::types::{CacheResult, FetchState};

/// Cache of values keyed by `K`.
///
/// Each key moves `NotFetched -> Fetching -> Fetched` once. There is no
/// refresh or invalidation path; a failed fetch returns the key to
/// `NotFetched`.
///
/// All mutation goes through `&mut self`, so a store cannot be shared between
/// concurrent callers without external synchronization.
#[derive(Debug)]
pub struct CacheStore<K, V> {
  entries: HashMap<K, FetchState<V>>,
}

impl<K, V> Default for CacheStore<K, V> {
  fn default() -> Self {
    Self {
      entries: HashMap::new(),
    }
  }
}

impl<K, V> CacheStore<K, V>
where
  K: Eq + Hash + Clone + Debug,
{
  pub fn new() -> Self {
    Self::default()
  }

  /// Whether `key` has been fully fetched. An empty value still counts.
  #[allow(dead_code)]
  pub fn is_fetched(&self, key: &K) -> bool {
    self.entries.get(key).is_some_and(FetchState::is_fetched)
  }

  /// The cached value, if `key` has been fully fetched.
  pub fn get(&self, key: &K) -> Option<Arc<V>> {
    match self.entries.get(key) {
      Some(FetchState::Fetched(value)) => Some(Arc::clone(value)),
      _ => None,
    }
  }

  /// Store an already computed value. An existing `Fetched` entry is kept.
  pub fn insert(&mut self, key: K, value: V) -> Arc<V> {
    if let Some(existing) = self.get(&key) {
      return existing;
    }
    let value = Arc::new(value);
    self
      .entries
      .insert(key, FetchState::Fetched(Arc::clone(&value)));
    value
  }

  /// Fetch with a cache-first strategy.
  ///
  /// 1. `Fetched` - return the cached value, the fetcher is not called
  /// 2. otherwise mark the key `Fetching` and await the fetcher
  /// 3. on success store `Fetched`, on failure reset to `NotFetched` and
  ///    propagate the error
  pub async fn get_or_fetch<E, F, Fut>(&mut self, key: K, fetcher: F) -> Result<CacheResult<Arc<V>>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>>,
  {
    match self.entries.get(&key) {
      Some(FetchState::Fetched(value)) => {
        debug!(key = ?key, "cache hit");
        return Ok(CacheResult::from_cache(Arc::clone(value)));
      }
      Some(FetchState::Fetching) => {
        warn!(key = ?key, "previous fetch was abandoned before completing, fetching again");
      }
      Some(FetchState::NotFetched) | None => {}
    }

    self.entries.insert(key.clone(), FetchState::Fetching);

    match fetcher().await {
      Ok(value) => {
        let value = Arc::new(value);
        self
          .entries
          .insert(key, FetchState::Fetched(Arc::clone(&value)));
        Ok(CacheResult::from_network(value))
      }
      Err(e) => {
        self.entries.remove(&key);
        Err(e)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheSource;
  use std::cell::Cell;

  #[tokio::test]
  async fn test_empty_value_is_cached() {
    let counter = Cell::new(0);
    let calls = &counter;
    let mut store: CacheStore<u64, Vec<u32>> = CacheStore::new();

    for _ in 0..3 {
      let result = store
        .get_or_fetch(7, || async move {
          calls.set(calls.get() + 1);
          Ok::<_, String>(Vec::new())
        })
        .await
        .unwrap();
      assert!(result.data.is_empty());
    }

    assert_eq!(calls.get(), 1);
    assert!(store.is_fetched(&7));
  }

  #[tokio::test]
  async fn test_second_call_served_from_cache() {
    let mut store: CacheStore<&str, Vec<u32>> = CacheStore::new();

    let first = store
      .get_or_fetch("projects", || async { Ok::<_, String>(vec![1, 2]) })
      .await
      .unwrap();
    assert_eq!(first.source, CacheSource::Network);

    let second = store
      .get_or_fetch("projects", || async { Ok::<_, String>(vec![9]) })
      .await
      .unwrap();
    assert_eq!(second.source, CacheSource::Cache);
    assert_eq!(*second.data, vec![1, 2]);
  }

  #[tokio::test]
  async fn test_failed_fetch_resets_key() {
    let mut store: CacheStore<u64, Vec<u32>> = CacheStore::new();

    let err = store
      .get_or_fetch(1, || async { Err::<Vec<u32>, _>("boom".to_string()) })
      .await
      .unwrap_err();
    assert_eq!(err, "boom");
    assert!(!store.is_fetched(&1));
    assert!(!store.entries.contains_key(&1));

    let retry = store
      .get_or_fetch(1, || async { Ok::<_, String>(vec![3]) })
      .await
      .unwrap();
    assert_eq!(retry.source, CacheSource::Network);
  }

  #[tokio::test]
  async fn test_abandoned_fetch_is_restarted() {
    let mut store: CacheStore<u64, Vec<u32>> = CacheStore::new();
    store.entries.insert(4, FetchState::Fetching);
    assert!(!store.is_fetched(&4));
    assert!(store.get(&4).is_none());

    let result = store
      .get_or_fetch(4, || async { Ok::<_, String>(vec![5]) })
      .await
      .unwrap();
    assert_eq!(result.source, CacheSource::Network);
    assert!(store.is_fetched(&4));
  }

  #[test]
  fn test_insert_keeps_existing_value() {
    let mut store: CacheStore<u64, &str> = CacheStore::new();
    store.insert(1, "first");
    let kept = store.insert(1, "second");
    assert_eq!(*kept, "first");
  }
}
