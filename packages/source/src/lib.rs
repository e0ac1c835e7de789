#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rain observation snapshot sources and normalization logic.
//!
//! The event store delivers full snapshots of every report ever written.
//! A [`SnapshotSource`] knows how to fetch one; [`normalize::normalize_snapshot`]
//! turns it into canonical observations.

pub mod category_mapping;
pub mod normalize;
pub mod parsing;
pub mod retry;
pub mod snapshot;

use async_trait::async_trait;

/// Errors that can occur while fetching a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The event store could not be reached or refused the request.
    #[error("Source unavailable: {message}")]
    Unavailable {
        /// Description of what went wrong.
        message: String,
    },
}

/// Anything that can hand over a full raw snapshot of the event store.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Fetches the whole collection as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the store is unreachable or the payload
    /// is not JSON.
    async fn fetch_snapshot(&self) -> Result<serde_json::Value, SourceError>;
}
