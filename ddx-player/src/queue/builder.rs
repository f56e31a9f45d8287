//! Queue Builder
//!
//! Turns catalog rows into a playable list. Missing URLs are resolved
//! concurrently through the preview cache; one failed resolution never
//! aborts the batch, the row just keeps an empty `audio_url`.

use crate::preview::PreviewUrlCache;
use ddx_common::models::{CatalogRow, PlaylistItem};
use futures::future::join_all;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct QueueBuilder {
    cache: PreviewUrlCache,
}

impl QueueBuilder {
    pub fn new(cache: PreviewUrlCache) -> Self {
        Self { cache }
    }

    /// Hydrate `rows` into playlist items, preserving order
    ///
    /// Rows without an audio URL are resolved from the cache. The row at
    /// `force_index` (the one the user just clicked) is always refreshed; if
    /// that refresh fails it keeps the URL it came with.
    pub async fn hydrate(&self, rows: Vec<CatalogRow>, force_index: Option<usize>) -> Vec<PlaylistItem> {
        let resolutions = rows.iter().enumerate().map(|(index, row)| {
            let forced = force_index == Some(index);
            let cache = &self.cache;
            async move {
                if forced || row.needs_resolution() {
                    Some(cache.get(&row.id, forced).await)
                } else {
                    None
                }
            }
        });
        let resolved = join_all(resolutions).await;

        let attempted = resolved.iter().filter(|r| r.is_some()).count();
        let failed = resolved.iter().filter(|r| matches!(r, Some(None))).count();
        if failed > 0 {
            warn!(attempted, failed, "Some preview URLs could not be resolved");
        } else {
            debug!(rows = rows.len(), attempted, "Queue hydrated");
        }

        rows.into_iter()
            .zip(resolved)
            .map(|(row, resolution)| {
                let mut item = PlaylistItem::from(row);
                if let Some(Some(url)) = resolution {
                    item.audio_url = url;
                }
                item
            })
            .collect()
    }
}
