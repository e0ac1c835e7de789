//! Concrete [`SnapshotSource`] implementations.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::retry::{self, DEFAULT_MAX_RETRIES};
use crate::{SnapshotSource, SourceError};

/// Reads a snapshot exported to a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    /// Creates a source for the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshotSource {
    fn name(&self) -> &str {
        self.path.to_str().unwrap_or("<snapshot file>")
    }

    async fn fetch_snapshot(&self) -> Result<serde_json::Value, SourceError> {
        let bytes = tokio::fs::read(&self.path).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Fetches the whole collection from a REST endpoint, e.g. a realtime
/// database `rainpoints.json` URL.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    url: String,
    max_retries: u32,
}

impl HttpSnapshotSource {
    /// Creates a source for `url` with a 30 second request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Overrides the number of retries after the first attempt.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The endpoint being polled.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    fn name(&self) -> &str {
        &self.url
    }

    async fn fetch_snapshot(&self) -> Result<serde_json::Value, SourceError> {
        log::debug!("Fetching snapshot from {}", self.url);
        retry::send_json(|| self.client.get(&self.url), self.max_retries).await
    }
}
