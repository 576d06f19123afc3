//! Catalog Sources
//!
//! Fetches the raw bytes behind a locator. Remote documents go through
//! reqwest; anything without an http(s) scheme is read from disk.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{CanvasError, CanvasResult};

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self, locator: &str) -> CanvasResult<Vec<u8>>;
}

pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("controls-canvas/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
        }
    }

    fn is_remote(locator: &str) -> bool {
        locator.starts_with("http://") || locator.starts_with("https://")
    }

    async fn fetch_remote(&self, locator: &str) -> CanvasResult<Vec<u8>> {
        let fetch_err = |reason: String| CanvasError::Fetch {
            locator: locator.to_string(),
            reason,
        };

        let response = self
            .client
            .get(locator)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP {}", status)));
        }

        let body = response.bytes().await.map_err(|e| fetch_err(e.to_string()))?;
        Ok(body.to_vec())
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogSource for HttpSource {
    async fn fetch(&self, locator: &str) -> CanvasResult<Vec<u8>> {
        debug!("Fetching catalog document {}", locator);
        if Self::is_remote(locator) {
            self.fetch_remote(locator).await
        } else {
            tokio::fs::read(locator).await.map_err(|source| CanvasError::Read {
                path: locator.into(),
                source,
            })
        }
    }
}
