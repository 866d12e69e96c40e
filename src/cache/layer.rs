//! In-memory query cache with per-key request deduplication.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use super::keys::QueryKey;
use super::traits::CacheResult;
use crate::api::error::ApiError;

type CachedValue = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<CachedValue, ApiError>>>;

struct CacheEntry {
  data: Option<CachedValue>,
  stale: bool,
  /// Replaced on every invalidation so fetches started earlier can tell that
  /// their result is outdated. Drawn from a cache-wide counter, so an entry
  /// recreated after `clear` never matches a fetch from before it.
  generation: u64,
  in_flight: Option<SharedFetch>,
}

impl CacheEntry {
  fn new(generation: u64) -> Self {
    Self {
      data: None,
      stale: true,
      generation,
      in_flight: None,
    }
  }
}

/// Cache of server data keyed by [`QueryKey`].
///
/// The server is the source of truth. Entries never expire on their own;
/// they only go stale when a mutation declares them affected.
#[derive(Clone, Default)]
pub struct QueryCache {
  entries: Arc<Mutex<HashMap<QueryKey, CacheEntry>>>,
  generations: Arc<AtomicU64>,
}

impl QueryCache {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
    lock_entries(&self.entries)
  }

  fn next_generation(&self) -> u64 {
    self.generations.fetch_add(1, Ordering::Relaxed) + 1
  }

  /// Read `key`, calling `fetcher` only if the entry is missing or stale.
  ///
  /// Concurrent reads of the same stale key share one request. The request
  /// runs on its own task, so its result lands in the cache even if every
  /// caller stops waiting.
  pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<CacheResult<Arc<T>>, ApiError>
  where
    T: Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    let pending = {
      let mut entries = self.lock();
      let entry = entries
        .entry(key.clone())
        .or_insert_with(|| CacheEntry::new(self.next_generation()));

      if !entry.stale {
        if let Some(data) = entry.data.clone() {
          if let Ok(data) = data.downcast::<T>() {
            return Ok(CacheResult::from_cache(data));
          }
        }
      }

      match &entry.in_flight {
        Some(pending) => {
          debug!(%key, "joining in-flight fetch");
          pending.clone()
        }
        None => {
          debug!(%key, "fetching");
          let pending = self.spawn_fetch(key.clone(), entry.generation, fetcher());
          entry.in_flight = Some(pending.clone());
          pending
        }
      }
    };

    let data = pending.await?;
    data
      .downcast::<T>()
      .map(CacheResult::from_network)
      .map_err(|_| ApiError::Unknown(format!("cached value for {} has an unexpected type", key)))
  }

  fn spawn_fetch<T, Fut>(&self, key: QueryKey, generation: u64, fut: Fut) -> SharedFetch
  where
    T: Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    let entries = Arc::clone(&self.entries);
    let handle = tokio::spawn(async move {
      let result = fut.await.map(|data| Arc::new(data) as CachedValue);
      store_result(&entries, &key, generation, &result);
      result
    });

    async move {
      handle
        .await
        .unwrap_or_else(|e| Err(ApiError::Unknown(format!("fetch task failed: {}", e))))
    }
    .boxed()
    .shared()
  }

  /// Run a mutation; on success mark every key in `affected` stale.
  /// On failure the cache is left untouched.
  pub async fn mutate<T, Fut>(&self, affected: &[QueryKey], mutation: Fut) -> Result<T, ApiError>
  where
    Fut: Future<Output = Result<T, ApiError>>,
  {
    match mutation.await {
      Ok(value) => {
        for key in affected {
          self.invalidate(key);
        }
        Ok(value)
      }
      Err(e) => {
        warn!(error = %e, "mutation failed");
        Err(e)
      }
    }
  }

  /// Mark `key` stale so the next read refetches.
  pub fn invalidate(&self, key: &QueryKey) {
    if let Some(entry) = self.lock().get_mut(key) {
      debug!(%key, "invalidated");
      entry.stale = true;
      entry.generation = self.next_generation();
      entry.in_flight = None;
    }
  }

  /// Whether the next read of `key` will hit the network.
  #[cfg(test)]
  pub fn is_stale(&self, key: &QueryKey) -> bool {
    self.lock().get(key).map(|e| e.stale).unwrap_or(true)
  }

  /// Drop every entry. Fetches still running finish for their own callers
  /// but never write into the emptied cache.
  pub fn clear(&self) {
    self.lock().clear();
    debug!("cache cleared");
  }
}

fn lock_entries(
  entries: &Mutex<HashMap<QueryKey, CacheEntry>>,
) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
  entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Apply a finished fetch, unless the key was invalidated or cleared while it ran.
fn store_result(
  entries: &Mutex<HashMap<QueryKey, CacheEntry>>,
  key: &QueryKey,
  generation: u64,
  result: &Result<CachedValue, ApiError>,
) {
  let mut entries = lock_entries(entries);
  let Some(entry) = entries.get_mut(key) else {
    return;
  };
  if entry.generation != generation {
    debug!(%key, "discarding result of superseded fetch");
    return;
  }

  entry.in_flight = None;
  match result {
    Ok(data) => {
      entry.data = Some(Arc::clone(data));
      entry.stale = false;
    }
    Err(e) => warn!(%key, error = %e, "fetch failed"),
  }
}
