//! The cache store: single-flight fetching with stale-while-revalidate.

use super::key::{KeyPrefix, QueryKey};
use crate::error::{Error, Result};
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Type-erased cached value. Entries are replaced wholesale, never mutated,
/// so readers hold immutable snapshots.
type DynValue = Arc<dyn Any + Send + Sync>;

/// A fetch that concurrent readers of one key can all await.
type SharedFetch = Shared<BoxFuture<'static, Result<DynValue>>>;

struct Entry {
  data: Option<DynValue>,
  fetched_at: Option<Instant>,
  /// Set by `invalidate`; the next read must refetch before serving.
  invalidated: bool,
  /// Replaced by `invalidate` so a fetch started before the invalidation can
  /// still resolve its joined readers but cannot overwrite newer state.
  /// Allocated from the cache-wide counter: an entry recreated after `clear`
  /// never shares a generation with a fetch started against its predecessor.
  generation: u64,
  /// At most one in-flight fetch per key.
  inflight: Option<SharedFetch>,
}

impl Entry {
  fn new(generation: u64) -> Self {
    Self {
      data: None,
      fetched_at: None,
      invalidated: false,
      generation,
      inflight: None,
    }
  }
}

/// Keyed cache of query results. Cheap to clone; clones share one store.
#[derive(Clone, Default)]
pub struct QueryCache {
  entries: Arc<Mutex<HashMap<QueryKey, Entry>>>,
  /// Source of entry generations, monotonic across the cache's lifetime.
  generations: Arc<AtomicU64>,
}

impl QueryCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Read through the cache.
  ///
  /// - cached, valid and younger than `stale_after`: returned immediately.
  /// - cached, valid but older: returned immediately, and a background
  ///   refresh replaces the entry when it resolves (at most one per key).
  /// - absent or invalidated: joins the in-flight fetch for this key if one
  ///   exists, otherwise starts one, and awaits it.
  ///
  /// The fetcher closure is called synchronously only to obtain the future;
  /// the fetch itself runs without the cache lock held. If the fetch fails,
  /// the in-flight marker is cleared (later reads retry), any previous entry
  /// stays intact, and every joined reader receives the same error.
  pub async fn read<T, F, Fut>(
    &self,
    key: QueryKey,
    stale_after: Duration,
    fetcher: F,
  ) -> Result<Arc<T>>
  where
    T: Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
  {
    let shared = {
      let mut entries = self.entries.lock();
      let entry = entries
        .entry(key.clone())
        .or_insert_with(|| Entry::new(self.generations.fetch_add(1, Ordering::Relaxed)));

      let cached = entry.data.clone();
      if let Some(data) = cached {
        if !entry.invalidated {
          let age = entry
            .fetched_at
            .map(|t| t.elapsed())
            .unwrap_or(Duration::MAX);
          if age <= stale_after {
            return downcast::<T>(&key, data);
          }

          // Stale: serve the old snapshot now, refresh in the background.
          if entry.inflight.is_none() {
            debug!(key = %key, "stale entry, scheduling background refresh");
            let fetch = make_fetch(&self.entries, key.clone(), entry.generation, fetcher());
            entry.inflight = Some(fetch.clone());
            tokio::spawn(async move {
              let _ = fetch.await;
            });
          }
          return downcast::<T>(&key, data);
        }
      }

      // Absent or invalidated: single-flight.
      match &entry.inflight {
        Some(fetch) => fetch.clone(),
        None => {
          debug!(key = %key, "cache miss, fetching");
          let fetch = make_fetch(&self.entries, key.clone(), entry.generation, fetcher());
          entry.inflight = Some(fetch.clone());
          fetch
        }
      }
    };

    let value = shared.await?;
    downcast::<T>(&key, value)
  }

  /// Flag every entry matching `prefix`: the next read for such a key must
  /// complete a fresh fetch before serving. A fetch already in flight is
  /// detached: its joined readers still resolve, but it can no longer
  /// become the entry's data.
  pub fn invalidate(&self, prefix: &KeyPrefix) {
    let mut entries = self.entries.lock();
    for (key, entry) in entries.iter_mut() {
      if key.matches(prefix) {
        debug!(key = %key, "invalidated");
        entry.invalidated = true;
        entry.generation = self.generations.fetch_add(1, Ordering::Relaxed);
        entry.inflight = None;
      }
    }
  }

  /// Cached data for `key` without triggering a fetch. Absent and
  /// invalidated entries both report `None`; an invalidated entry must not
  /// be served until refetched.
  pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
    let entries = self.entries.lock();
    let entry = entries.get(key)?;
    if entry.invalidated {
      return None;
    }
    let data = entry.data.clone()?;
    data.downcast::<T>().ok()
  }

  /// Drop everything (the logout path).
  pub fn clear(&self) {
    self.entries.lock().clear();
  }
}

/// Wrap a fetch future so that resolving it also stores the result, then
/// make it joinable by any number of readers.
fn make_fetch<T, Fut>(
  entries: &Arc<Mutex<HashMap<QueryKey, Entry>>>,
  key: QueryKey,
  generation: u64,
  fut: Fut,
) -> SharedFetch
where
  T: Send + Sync + 'static,
  Fut: Future<Output = Result<T>> + Send + 'static,
{
  let entries = Arc::clone(entries);
  async move {
    let result = fut.await;

    let mut map = entries.lock();
    // The entry disappears entirely on `clear`; a fetch that outlives it
    // resolves its readers but stores nothing.
    let Some(entry) = map.get_mut(&key) else {
      return result.map(|value| Arc::new(value) as DynValue);
    };
    if entry.generation != generation {
      // Invalidated (or cleared) while in flight: hand the value to joined
      // readers but leave the entry to the post-invalidation fetch.
      return result.map(|value| Arc::new(value) as DynValue);
    }

    entry.inflight = None;
    match result {
      Ok(value) => {
        let value: DynValue = Arc::new(value);
        entry.data = Some(Arc::clone(&value));
        entry.fetched_at = Some(Instant::now());
        entry.invalidated = false;
        Ok(value)
      }
      Err(e) => {
        debug!(key = %key, error = %e, "fetch failed, keeping previous entry");
        Err(e)
      }
    }
  }
  .boxed()
  .shared()
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, value: DynValue) -> Result<Arc<T>> {
  value.downcast::<T>().map_err(|_| Error::TypeMismatch {
    key: key.to_string(),
    expected: std::any::type_name::<T>(),
  })
}
