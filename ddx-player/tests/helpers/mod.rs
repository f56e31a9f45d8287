//! Test helpers for ddx-player integration tests
//!
//! - FakeCatalogApi: in-memory catalog that counts preview URL requests
//! - TestServer: axum stand-in for the Drilldex REST API

#![allow(dead_code)]

pub mod fake_api;
pub mod test_server;

pub use fake_api::FakeCatalogApi;
pub use test_server::TestServer;

use ddx_common::models::{CatalogRow, PlaylistItem};

/// Catalog row without an audio URL
pub fn row(id: &str) -> CatalogRow {
    CatalogRow::new(id, id.to_uppercase())
}

/// Catalog row that already carries a URL
pub fn row_with_url(id: &str, url: &str) -> CatalogRow {
    row(id).with_audio_url(url)
}

pub fn ids(items: &[PlaylistItem]) -> Vec<&str> {
    items.iter().map(|item| item.id.as_str()).collect()
}
