//! In-memory `CatalogApi`

use async_trait::async_trait;
use ddx_common::models::PreviewTrack;
use ddx_player::api::CatalogApi;
use ddx_player::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// Catalog that serves `https://cdn.test/<id>.mp3?sig=<n>` for every beat,
/// where `n` is the per-id call number, so refreshed URLs are distinguishable
#[derive(Default)]
pub struct FakeCatalogApi {
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    overrides: Mutex<HashMap<String, String>>,
    playlists: Mutex<HashMap<String, Vec<PreviewTrack>>>,
    slow_calls: Mutex<HashMap<(String, usize), Duration>>,
    delay: Option<Duration>,
}

impl FakeCatalogApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every preview URL request sleeps for `delay` before answering
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Delay only the `call_number`-th request for `id` (1-based)
    pub fn slow_call(&self, id: &str, call_number: usize, delay: Duration) {
        self.slow_calls
            .lock()
            .unwrap()
            .insert((id.to_string(), call_number), delay);
    }

    pub fn fail(&self, id: &str) {
        self.failing.lock().unwrap().insert(id.to_string());
    }

    /// Serve `url` verbatim for `id`
    pub fn serve(&self, id: &str, url: &str) {
        self.overrides
            .lock()
            .unwrap()
            .insert(id.to_string(), url.to_string());
    }

    /// Register a pack or kit playlist under `kind:id`
    pub fn playlist(&self, key: &str, tracks: Vec<PreviewTrack>) {
        self.playlists
            .lock()
            .unwrap()
            .insert(key.to_string(), tracks);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, id: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == id).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn lookup_playlist(&self, key: &str) -> Result<Vec<PreviewTrack>> {
        self.playlists
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or(Error::Api {
                status: 404,
                body: format!("{} not found", key),
            })
    }
}

#[async_trait]
impl CatalogApi for FakeCatalogApi {
    async fn preview_url(&self, beat_id: &str) -> Result<String> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(beat_id.to_string());
            calls.iter().filter(|c| *c == beat_id).count()
        };

        let delay = self
            .slow_calls
            .lock()
            .unwrap()
            .get(&(beat_id.to_string(), call_number))
            .copied()
            .or(self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(beat_id) {
            return Err(Error::Api {
                status: 500,
                body: "signing failed".to_string(),
            });
        }

        if let Some(url) = self.overrides.lock().unwrap().get(beat_id) {
            return Ok(url.clone());
        }
        Ok(format!("https://cdn.test/{}.mp3?sig={}", beat_id, call_number))
    }

    async fn pack_preview_playlist(&self, pack_id: &str) -> Result<Vec<PreviewTrack>> {
        self.lookup_playlist(&format!("pack:{}", pack_id))
    }

    async fn kit_preview_playlist(&self, kit_id: &str) -> Result<Vec<PreviewTrack>> {
        self.lookup_playlist(&format!("kit:{}", kit_id))
    }
}

/// Preview playlist entry
pub fn track(id: &str, preview_url: &str) -> PreviewTrack {
    PreviewTrack {
        id: id.to_string(),
        title: id.to_uppercase(),
        artist_name: "Producer".to_string(),
        cover_url: String::new(),
        preview_url: preview_url.to_string(),
        duration_in_seconds: 30.0,
    }
}
