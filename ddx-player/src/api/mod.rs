//! Drilldex REST collaborators
//!
//! Only the three preview endpoints the playback queue depends on.

mod client;

pub use client::HttpCatalogApi;

use crate::error::Result;
use ddx_common::models::PreviewTrack;

/// Preview endpoints of the catalog API
///
/// Implemented over HTTP by [`HttpCatalogApi`]; tests substitute fakes.
#[async_trait::async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /beats/{id}/preview-url`: signed, time-limited URL as returned
    /// by the server (not yet repaired)
    async fn preview_url(&self, beat_id: &str) -> Result<String>;

    /// `GET /packs/{id}/preview-playlist`
    async fn pack_preview_playlist(&self, pack_id: &str) -> Result<Vec<PreviewTrack>>;

    /// `GET /kits/{id}/preview-playlist`
    async fn kit_preview_playlist(&self, kit_id: &str) -> Result<Vec<PreviewTrack>>;
}
