//! Lookahead Prefetcher
//!
//! Warms the preview cache for the tracks right after the current one.
//! Always runs after the queue has been dispatched, on its own task.
//!
//! The dispatched list is not patched afterwards: the queue host keeps the
//! URLs it was given. Warmed entries pay off when the same rows are hydrated
//! again (a re-click, a rebuild after the queue ended, an append), which then
//! hits the cache instead of the network.

use crate::preview::PreviewUrlCache;
use ddx_common::models::PlaylistItem;
use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::debug;

pub const DEFAULT_LOOKAHEAD: usize = 3;

#[derive(Clone)]
pub struct LookaheadPrefetcher {
    cache: PreviewUrlCache,
}

impl LookaheadPrefetcher {
    pub fn new(cache: PreviewUrlCache) -> Self {
        Self { cache }
    }

    /// Resolve URLs for the window of `n` items after `current_index` that
    /// have no URL yet
    ///
    /// Fire-and-forget: returns immediately. The handle yields how many URLs
    /// were obtained and may be dropped.
    pub fn prefetch(&self, list: &[PlaylistItem], current_index: usize, n: usize) -> JoinHandle<usize> {
        let ids: Vec<String> = list
            .iter()
            .skip(current_index.saturating_add(1))
            .take(n)
            .filter(|item| !item.is_playable())
            .map(|item| item.id.clone())
            .collect();

        let cache = self.cache.clone();
        tokio::spawn(async move {
            if ids.is_empty() {
                return 0;
            }

            let results = join_all(ids.iter().map(|id| cache.get(id, false))).await;
            let warmed = results.iter().filter(|url| url.is_some()).count();
            debug!(requested = ids.len(), warmed, "Lookahead prefetch complete");
            warmed
        })
    }
}
