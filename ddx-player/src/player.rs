//! Player façade
//!
//! What pages call to start, extend and control preview playback. Builds
//! queues through the QueueBuilder, dispatches them on the QueueBus and
//! kicks off lookahead prefetching once the dispatch is out.

use crate::api::CatalogApi;
use crate::error::{Error, Result};
use crate::preview::PreviewUrlCache;
use crate::queue::{ClickAction, LookaheadPrefetcher, PlayButton, QueueBuilder, DEFAULT_LOOKAHEAD};
use ddx_common::config::PlayerConfig;
use ddx_common::events::{QueueBus, QueueEvent};
use ddx_common::models::{CatalogRow, PlaylistItem, SourceKey};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct Player {
    api: Arc<dyn CatalogApi>,
    cache: PreviewUrlCache,
    builder: QueueBuilder,
    prefetcher: LookaheadPrefetcher,
    bus: QueueBus,
    lookahead: usize,
}

impl Player {
    /// Player with the default TTL and lookahead
    pub fn new(api: Arc<dyn CatalogApi>, bus: QueueBus) -> Self {
        let cache = PreviewUrlCache::new(Arc::clone(&api));
        Self::with_cache(api, cache, bus, DEFAULT_LOOKAHEAD)
    }

    pub fn with_cache(
        api: Arc<dyn CatalogApi>,
        cache: PreviewUrlCache,
        bus: QueueBus,
        lookahead: usize,
    ) -> Self {
        Self {
            api,
            builder: QueueBuilder::new(cache.clone()),
            prefetcher: LookaheadPrefetcher::new(cache.clone()),
            cache,
            bus,
            lookahead,
        }
    }

    pub fn from_config(config: &PlayerConfig, api: Arc<dyn CatalogApi>, bus: QueueBus) -> Self {
        let cache = PreviewUrlCache::with_clock(
            Arc::clone(&api),
            Arc::new(crate::preview::SystemClock),
            config.preview_ttl(),
        );
        Self::with_cache(api, cache, bus, config.lookahead)
    }

    pub fn bus(&self) -> &QueueBus {
        &self.bus
    }

    pub fn cache(&self) -> &PreviewUrlCache {
        &self.cache
    }

    /// Hydrate `rows`, dispatch `audio:play-list` at `index`, then prefetch
    ///
    /// The clicked row is force-refreshed so it never starts on a stale link.
    /// Unplayable rows stay in the list so indexes match the page; if none is
    /// playable nothing is dispatched and `NoPlayableItems` is returned.
    pub async fn play_rows(
        &self,
        source_key: SourceKey,
        rows: Vec<CatalogRow>,
        index: usize,
    ) -> Result<Vec<PlaylistItem>> {
        let list = self.builder.hydrate(rows, Some(index)).await;
        if !list.iter().any(PlaylistItem::is_playable) {
            warn!(source_key = %source_key, items = list.len(), "Nothing playable in queue");
            return Err(Error::NoPlayableItems(source_key.to_string()));
        }

        info!(source_key = %source_key, items = list.len(), index, "Starting queue");
        self.dispatch(QueueEvent::PlayList {
            list: list.clone(),
            index,
            source_key,
        });

        // Prefetch only after dispatch so playback start is never delayed.
        // Warmed URLs serve the next hydrate or re-dispatch of these rows.
        self.prefetcher.prefetch(&list, index, self.lookahead);
        Ok(list)
    }

    /// Play a single beat row under `beat:<id>`
    pub async fn play_beat(&self, row: CatalogRow) -> Result<Vec<PlaylistItem>> {
        let key = SourceKey::beat(row.id.clone());
        self.play_rows(key, vec![row], 0).await
    }

    pub async fn play_pack(&self, pack_id: &str) -> Result<Vec<PlaylistItem>> {
        self.play_source(SourceKey::pack(pack_id)).await
    }

    pub async fn play_kit(&self, kit_id: &str) -> Result<Vec<PlaylistItem>> {
        self.play_source(SourceKey::kit(kit_id)).await
    }

    /// Load the preview playlist of a pack or kit, dropping unplayable entries
    ///
    /// Fails with `NoPlayableItems` when nothing is left, including when the
    /// playlist request itself failed.
    pub async fn preview_playlist(&self, source_key: &SourceKey) -> Result<Vec<PlaylistItem>> {
        let fetched = match source_key {
            SourceKey::Pack(id) => self.api.pack_preview_playlist(id).await,
            SourceKey::Kit(id) => self.api.kit_preview_playlist(id).await,
            SourceKey::Beat(_) => {
                return Err(ddx_common::Error::InvalidInput(format!(
                    "{} has no preview playlist; play it from catalog rows",
                    source_key
                ))
                .into())
            }
        };

        let tracks = match fetched {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!(source_key = %source_key, error = %e, "Preview playlist request failed");
                Vec::new()
            }
        };

        let items: Vec<PlaylistItem> = tracks
            .into_iter()
            .map(PlaylistItem::from)
            .map(|mut item| {
                item.audio_url = crate::preview::repair_preview_url(&item.audio_url);
                item
            })
            .filter(PlaylistItem::is_playable)
            .collect();

        if items.is_empty() {
            return Err(Error::NoPlayableItems(source_key.to_string()));
        }
        Ok(items)
    }

    /// Append catalog rows to the current queue
    ///
    /// On an empty queue this starts playback at the first row, adopting
    /// `source_key` when given.
    pub async fn append(
        &self,
        rows: Vec<CatalogRow>,
        source_key: Option<SourceKey>,
    ) -> Result<Vec<PlaylistItem>> {
        let items: Vec<PlaylistItem> = self
            .builder
            .hydrate(rows, None)
            .await
            .into_iter()
            .filter(PlaylistItem::is_playable)
            .collect();

        if items.is_empty() {
            let what = source_key.map_or_else(|| "appended rows".to_string(), |k| k.to_string());
            return Err(Error::NoPlayableItems(what));
        }

        self.dispatch(QueueEvent::QueueAppend {
            items: items.clone(),
            source_key,
        });
        Ok(items)
    }

    /// "Add pack/kit to playlist"
    pub async fn append_source(&self, source_key: SourceKey) -> Result<Vec<PlaylistItem>> {
        let items = self.preview_playlist(&source_key).await?;
        self.dispatch(QueueEvent::QueueAppend {
            items: items.clone(),
            source_key: Some(source_key),
        });
        Ok(items)
    }

    pub fn pause(&self) {
        self.dispatch(QueueEvent::Pause);
    }

    pub fn resume(&self) {
        self.dispatch(QueueEvent::Resume);
    }

    /// Ask the audio bar to re-broadcast `audio:state`
    pub fn request_state(&self) {
        self.dispatch(QueueEvent::GetState);
    }

    /// Handle a click on a row-based button (beat cards, beat lists)
    ///
    /// `rows` and `index` describe the queue to build if the click starts one.
    /// A start that finds nothing playable resets the button.
    pub async fn click_rows(
        &self,
        button: &mut PlayButton,
        rows: Vec<CatalogRow>,
        index: usize,
    ) -> Result<ClickAction> {
        let action = button.click();
        match action {
            ClickAction::StartQueue => {
                if let Err(e) = self.play_rows(button.source_key().clone(), rows, index).await {
                    button.reset();
                    return Err(e);
                }
            }
            ClickAction::Pause => self.pause(),
            ClickAction::Resume => self.resume(),
        }
        Ok(action)
    }

    /// Handle a click on a pack or kit button
    pub async fn click_source(&self, button: &mut PlayButton) -> Result<ClickAction> {
        let action = button.click();
        match action {
            ClickAction::StartQueue => {
                if let Err(e) = self.play_source(button.source_key().clone()).await {
                    button.reset();
                    return Err(e);
                }
            }
            ClickAction::Pause => self.pause(),
            ClickAction::Resume => self.resume(),
        }
        Ok(action)
    }

    async fn play_source(&self, source_key: SourceKey) -> Result<Vec<PlaylistItem>> {
        let list = self.preview_playlist(&source_key).await?;

        info!(source_key = %source_key, items = list.len(), "Starting preview playlist");
        self.dispatch(QueueEvent::PlayList {
            list: list.clone(),
            index: 0,
            source_key,
        });
        Ok(list)
    }

    fn dispatch(&self, event: QueueEvent) {
        let topic = event.event_type();
        if self.bus.emit(event).is_err() {
            warn!(event = topic, "No audio bar listening on the queue bus");
        }
    }
}
