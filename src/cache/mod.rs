// src/cache/mod.rs
//
// Time-boxed cache of normalized table rows with request de-duplication.
// Per table name the cache guarantees at most one outstanding fetch: the
// decision to join an in-flight fetch is taken synchronously under the lock,
// before any await point, so concurrent callers can never race a second
// network call into existence.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::schema::Record;

/// How long a fetched table stays Fresh. Stale entries remain servable as a
/// fallback when a refresh fails.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

type SharedFetch = Shared<BoxFuture<'static, Arc<Vec<Record>>>>;

struct CacheEntry {
    records: Arc<Vec<Record>>,
    fetched_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    inflight: HashMap<String, SharedFetch>,
}

/// Per-process cache service. Construct one per client; tests construct
/// their own isolated instances.
pub struct TableCache {
    ttl: Duration,
    state: Arc<Mutex<CacheState>>,
}

impl TableCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    /// Return `table`'s rows, fetching through `fetch` only when the cache
    /// cannot answer. Rules, in order:
    ///
    /// - Fresh entry and no `bypass`: cached rows, no network.
    /// - A fetch already in flight: join it, never start a second one.
    /// - Otherwise start `fetch`; on success the entry is replaced
    ///   wholesale, on failure the previous entry (if any) is retained and
    ///   served, else the result is empty. Fetch errors never escape.
    pub async fn get_or_fetch<F>(&self, table: &str, bypass: bool, fetch: F) -> Arc<Vec<Record>>
    where
        F: Future<Output = anyhow::Result<Vec<Record>>> + Send + 'static,
    {
        let pending = {
            let mut state = self.state.lock().unwrap();

            if !bypass {
                if let Some(entry) = state.entries.get(table) {
                    if entry.fetched_at.elapsed() < self.ttl {
                        debug!(table, "cache hit");
                        return entry.records.clone();
                    }
                }
            }

            if let Some(inflight) = state.inflight.get(table) {
                debug!(table, "joining in-flight fetch");
                inflight.clone()
            } else {
                debug!(table, bypass, "starting fetch");
                let settled = settle(self.state.clone(), table.to_string(), fetch)
                    .boxed()
                    .shared();
                state.inflight.insert(table.to_string(), settled.clone());
                settled
            }
        };

        pending.await
    }
}

/// Run one fetch to completion and fold its outcome into the cache. The
/// in-flight marker is removed unconditionally; the entry map is only
/// touched on success.
async fn settle<F>(state: Arc<Mutex<CacheState>>, table: String, fetch: F) -> Arc<Vec<Record>>
where
    F: Future<Output = anyhow::Result<Vec<Record>>> + Send + 'static,
{
    let outcome = fetch.await;

    let mut guard = state.lock().unwrap();
    guard.inflight.remove(&table);

    match outcome {
        Ok(rows) => {
            let records = Arc::new(rows);
            debug!(table = %table, rows = records.len(), "fetch settled");
            guard.entries.insert(
                table,
                CacheEntry {
                    records: records.clone(),
                    fetched_at: Instant::now(),
                },
            );
            records
        }
        Err(err) => match guard.entries.get(&table) {
            Some(entry) => {
                warn!(table = %table, error = %err, "fetch failed; serving last known good");
                entry.records.clone()
            }
            None => {
                warn!(table = %table, error = %err, "fetch failed with no fallback; serving empty");
                Arc::new(Vec::new())
            }
        },
    }
}
