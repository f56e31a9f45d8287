//! Error types for ddx-player
//!
//! URL resolution failures never surface here: they degrade to empty URLs
//! inside the cache. Only API plumbing and the explicit "nothing playable"
//! user action produce errors.

use thiserror::Error;

/// Main error type for ddx-player
#[derive(Error, Debug)]
pub enum Error {
    /// Transport or body decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// REST API answered with a non-success status
    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// An explicit user action produced zero playable items
    #[error("No playable items for {0}")]
    NoPlayableItems(String),

    /// Configuration or input error from ddx-common
    #[error(transparent)]
    Common(#[from] ddx_common::Error),
}

/// Convenience Result type using ddx-player Error
pub type Result<T> = std::result::Result<T, Error>;
