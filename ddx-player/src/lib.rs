//! # Drilldex Preview Player Library (ddx-player)
//!
//! Client-side preview playback queue.
//!
//! **Purpose:** Resolve short-lived signed preview URLs, cache them with a
//! TTL, build playable queues from catalog rows, prefetch upcoming tracks and
//! drive the audio bar over the queue bus.
//!
//! **Architecture:** `CatalogApi` → `PreviewUrlCache` → `QueueBuilder` /
//! `LookaheadPrefetcher` → `QueueBus` → `QueueHost`, with `PlayButton`
//! reconciling per-card UI state from `audio:state` broadcasts.

pub mod api;
pub mod error;
pub mod player;
pub mod preview;
pub mod queue;

pub use error::{Error, Result};
pub use player::Player;
pub use preview::{Clock, ManualClock, PreviewUrlCache, SystemClock};
pub use queue::{ClickAction, LookaheadPrefetcher, PlayButton, QueueBuilder, QueueHost};
