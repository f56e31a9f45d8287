//! Catalog and playlist data model
//!
//! Wire shapes follow the Drilldex REST API (camelCase JSON). Catalog ids are
//! opaque strings; numeric ids in JSON are accepted and stringified.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Catalog row as returned by browse/search endpoints
///
/// `audio_url` absent, null or empty means the row needs URL resolution
/// before it can be played. Unknown fields are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRow {
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artist_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub album_cover_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration_in_seconds: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CatalogRow {
    /// Minimal row with only an id and title set
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist_name: String::new(),
            album_cover_url: String::new(),
            audio_url: None,
            duration_in_seconds: 0.0,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_audio_url(mut self, url: impl Into<String>) -> Self {
        self.audio_url = Some(url.into());
        self
    }

    /// True when the row carries no usable audio URL
    pub fn needs_resolution(&self) -> bool {
        self.audio_url.as_deref().map_or(true, str::is_empty)
    }
}

/// Normalized queue entry handed to the audio bar
///
/// `audio_url` is empty when resolution failed; such items are kept in the
/// list so indexes stay stable, but are skipped at play time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artist_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub album_cover_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub audio_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration_in_seconds: f64,
}

impl PlaylistItem {
    pub fn is_playable(&self) -> bool {
        !self.audio_url.is_empty()
    }
}

impl From<CatalogRow> for PlaylistItem {
    fn from(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            artist_name: row.artist_name,
            album_cover_url: row.album_cover_url,
            audio_url: row.audio_url.unwrap_or_default(),
            duration_in_seconds: row.duration_in_seconds,
        }
    }
}

/// Entry of a pack or kit preview playlist
/// (`GET /packs/{id}/preview-playlist`, `GET /kits/{id}/preview-playlist`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewTrack {
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artist_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cover_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preview_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration_in_seconds: f64,
}

impl From<PreviewTrack> for PlaylistItem {
    fn from(track: PreviewTrack) -> Self {
        Self {
            id: track.id,
            title: track.title,
            artist_name: track.artist_name,
            album_cover_url: track.cover_url,
            audio_url: track.preview_url,
            duration_in_seconds: track.duration_in_seconds,
        }
    }
}

/// Which catalog entity owns the playback queue
///
/// Serialized as `beat:<id>`, `pack:<id>` or `kit:<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SourceKey {
    Beat(String),
    Pack(String),
    Kit(String),
}

impl SourceKey {
    pub fn beat(id: impl Into<String>) -> Self {
        SourceKey::Beat(id.into())
    }

    pub fn pack(id: impl Into<String>) -> Self {
        SourceKey::Pack(id.into())
    }

    pub fn kit(id: impl Into<String>) -> Self {
        SourceKey::Kit(id.into())
    }

    /// Namespace prefix ("beat", "pack", "kit")
    pub fn kind(&self) -> &'static str {
        match self {
            SourceKey::Beat(_) => "beat",
            SourceKey::Pack(_) => "pack",
            SourceKey::Kit(_) => "kit",
        }
    }

    /// Catalog id without the namespace
    pub fn id(&self) -> &str {
        match self {
            SourceKey::Beat(id) | SourceKey::Pack(id) | SourceKey::Kit(id) => id,
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

impl FromStr for SourceKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidInput(format!("Source key without namespace: {}", s)))?;

        if id.is_empty() {
            return Err(Error::InvalidInput(format!("Source key without id: {}", s)));
        }

        match kind {
            "beat" => Ok(SourceKey::Beat(id.to_string())),
            "pack" => Ok(SourceKey::Pack(id.to_string())),
            "kit" => Ok(SourceKey::Kit(id.to_string())),
            other => Err(Error::InvalidInput(format!("Unknown source kind: {}", other))),
        }
    }
}

impl TryFrom<String> for SourceKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SourceKey> for String {
    fn from(key: SourceKey) -> Self {
        key.to_string()
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("invalid catalog id: {}", other))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
