//! HTTP implementation of [`CatalogApi`]

use super::CatalogApi;
use crate::error::{Error, Result};
use ddx_common::config::PlayerConfig;
use ddx_common::models::PreviewTrack;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use urlencoding::encode;

const USER_AGENT: &str = concat!("ddx-player/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct PreviewUrlResponse {
    url: String,
}

/// reqwest-backed catalog client
#[derive(Clone)]
pub struct HttpCatalogApi {
    http_client: Client,
    base_url: String,
}

impl HttpCatalogApi {
    /// Create a client for `base_url` (e.g. `https://drilldex.com/api`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));

        let http_client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &PlayerConfig) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Catalog API request");

        let response = self.http_client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn preview_url(&self, beat_id: &str) -> Result<String> {
        let response: PreviewUrlResponse = self
            .get_json(&format!("/beats/{}/preview-url", encode(beat_id)))
            .await?;
        Ok(response.url)
    }

    async fn pack_preview_playlist(&self, pack_id: &str) -> Result<Vec<PreviewTrack>> {
        self.get_json(&format!("/packs/{}/preview-playlist", encode(pack_id)))
            .await
    }

    async fn kit_preview_playlist(&self, kit_id: &str) -> Result<Vec<PreviewTrack>> {
        self.get_json(&format!("/kits/{}/preview-playlist", encode(kit_id)))
            .await
    }
}
