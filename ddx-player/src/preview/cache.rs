//! Preview URL cache
//!
//! Maps a beat id to a short-lived signed preview URL. Entries expire after
//! the TTL and are then treated as absent. Concurrent misses for one id share
//! a single request; the request runs as its own task so a caller dropping
//! its future never aborts it. Results are ordered by request generation: a
//! slow request never overwrites an entry stored by a newer one.

use super::clock::{Clock, SystemClock};
use super::url_repair::repair_preview_url;
use crate::api::CatalogApi;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Signed preview URLs are minted for a few minutes; 2 minutes keeps a margin
pub const DEFAULT_PREVIEW_TTL: Duration = Duration::from_secs(120);

type PendingUrl = Shared<BoxFuture<'static, Option<String>>>;

#[derive(Debug, Clone)]
struct CacheEntry {
    url: String,
    fetched_at: Instant,
    /// Generation of the request (or `set`) that stored this entry
    generation: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// In-flight resolutions, tagged with a generation so a finished request
    /// only removes its own slot
    in_flight: HashMap<String, (u64, PendingUrl)>,
    next_generation: u64,
}

impl CacheState {
    fn bump_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }

    /// Store `url` unless a newer request already stored one
    fn store(&mut self, id: &str, url: String, fetched_at: Instant, generation: u64) -> bool {
        if matches!(self.entries.get(id), Some(existing) if existing.generation > generation) {
            return false;
        }
        self.entries.insert(
            id.to_string(),
            CacheEntry {
                url,
                fetched_at,
                generation,
            },
        );
        true
    }
}

struct Inner {
    api: Arc<dyn CatalogApi>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl Inner {
    fn is_live(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.fetched_at) < self.ttl
    }
}

/// TTL cache of signed preview URLs with in-flight coalescing
///
/// Cheap to clone; clones share the same entries. Must be used from within a
/// Tokio runtime (resolutions are spawned).
#[derive(Clone)]
pub struct PreviewUrlCache {
    inner: Arc<Inner>,
}

impl PreviewUrlCache {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self::with_clock(api, Arc::new(SystemClock), DEFAULT_PREVIEW_TTL)
    }

    pub fn with_clock(api: Arc<dyn CatalogApi>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                clock,
                ttl,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Resolve the preview URL for `id`
    ///
    /// Without `force`, a live entry is returned without a network call and
    /// an in-flight request for the same id is joined. With `force`, a new
    /// request is always issued. `None` means the item should be skipped.
    pub async fn get(&self, id: &str, force: bool) -> Option<String> {
        let pending = {
            let mut state = self.inner.state.lock().await;

            if force {
                self.start_fetch(&mut state, id)
            } else {
                let now = self.inner.clock.now();
                let live = state
                    .entries
                    .get(id)
                    .filter(|entry| self.inner.is_live(entry, now))
                    .map(|entry| entry.url.clone());
                if live.is_some() {
                    return live;
                }

                let joined = state.in_flight.get(id).map(|(_, pending)| pending.clone());
                match joined {
                    Some(pending) => {
                        debug!(id = %id, "Joining in-flight preview URL request");
                        pending
                    }
                    None => self.start_fetch(&mut state, id),
                }
            }
        };

        pending.await
    }

    /// Forced refresh, shorthand for `get(id, true)`
    pub async fn refresh(&self, id: &str) -> Option<String> {
        self.get(id, true).await
    }

    /// Live entry for `id`, never touching the network
    pub async fn peek(&self, id: &str) -> Option<String> {
        let state = self.inner.state.lock().await;
        let now = self.inner.clock.now();
        state
            .entries
            .get(id)
            .filter(|entry| self.inner.is_live(entry, now))
            .map(|entry| entry.url.clone())
    }

    /// Store a URL obtained elsewhere (e.g. a catalog row that came with one)
    pub async fn set(&self, id: impl Into<String>, url: impl Into<String>) {
        let mut state = self.inner.state.lock().await;
        let fetched_at = self.inner.clock.now();
        let generation = state.bump_generation();
        let id: String = id.into();
        state.store(&id, repair_preview_url(&url.into()), fetched_at, generation);
    }

    pub async fn invalidate(&self, id: &str) {
        self.inner.state.lock().await.entries.remove(id);
    }

    pub async fn clear(&self) {
        self.inner.state.lock().await.entries.clear();
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.inner.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn start_fetch(&self, state: &mut CacheState, id: &str) -> PendingUrl {
        let generation = state.bump_generation();

        let inner = Arc::clone(&self.inner);
        let key = id.to_string();

        let handle = tokio::spawn(async move {
            let url = match inner.api.preview_url(&key).await {
                Ok(raw) if !raw.trim().is_empty() => Some(repair_preview_url(&raw)),
                Ok(_) => {
                    warn!(id = %key, "Preview URL endpoint returned an empty URL");
                    None
                }
                Err(e) => {
                    warn!(id = %key, error = %e, "Preview URL resolution failed");
                    None
                }
            };

            let mut state = inner.state.lock().await;
            if let Some(url) = &url {
                let fetched_at = inner.clock.now();
                if !state.store(&key, url.clone(), fetched_at, generation) {
                    debug!(id = %key, "Newer preview URL already cached, dropping stale result");
                }
            }
            if matches!(state.in_flight.get(&key), Some((g, _)) if *g == generation) {
                state.in_flight.remove(&key);
            }

            url
        });

        let pending: PendingUrl = handle
            .map(|joined| match joined {
                Ok(url) => url,
                Err(e) => {
                    warn!(error = %e, "Preview URL task did not complete");
                    None
                }
            })
            .boxed()
            .shared();

        state
            .in_flight
            .insert(id.to_string(), (generation, pending.clone()));
        pending
    }
}
