//! Content sources: where the content document comes from.
//!
//! `HttpSource` is used when the configured location is a URL, `FileSource`
//! otherwise. Both return raw bytes; parsing happens in the loader.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("content request returned status {0}")]
    Status(u16),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed content document: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<u8>, LoadError>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP
// ────────────────────────────────────────────────────────────────────────────

pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LoadError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        debug!(url = %self.url, "Fetching content document");
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }

    fn location(&self) -> String {
        self.url.clone()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Local file
// ────────────────────────────────────────────────────────────────────────────

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ContentSource for FileSource {
    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        debug!(path = %self.path.display(), "Reading content document");
        tokio::fs::read(&self.path).await.map_err(|source| LoadError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Picks the source for a configured location: URLs go over HTTP, anything else is a path.
pub fn source_from_location(
    location: &str,
    timeout: Duration,
) -> Result<Arc<dyn ContentSource>, LoadError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Arc::new(HttpSource::new(location, timeout)?))
    } else {
        Ok(Arc::new(FileSource::new(location)))
    }
}
