//! # Drilldex Common Library
//!
//! Shared code for the Drilldex preview playback crates:
//! - Catalog and playlist models
//! - Queue bus event types (QueueEvent enum) and the QueueBus
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod events;
pub mod models;

pub use error::{Error, Result};
pub use events::{QueueBus, QueueEvent, QueueStateSnapshot};
pub use models::{CatalogRow, PlaylistItem, SourceKey};
