//! Catalog Cache
//!
//! Stores the merged record set on disk, keyed by a fingerprint of the
//! locator list, so repeated runs skip the network.

use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

use super::Catalog;
use crate::error::{CanvasError, CanvasResult};

const CACHE_PREFIX: &str = "controls-canvas-";

/// Order-sensitive fingerprint of a locator list: the first 8 bytes of the
/// SHA-256 digest of the locators joined by `|`, hex encoded.
pub fn fingerprint(locators: &[String]) -> String {
    let joined = locators.join("|");
    let digest = Sha256::digest(joined.as_bytes());
    hex::encode(&digest[..8])
}

pub struct CatalogCache {
    dir: PathBuf,
}

impl CatalogCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, locators: &[String]) -> PathBuf {
        self.dir.join(format!("{}{}.yaml", CACHE_PREFIX, fingerprint(locators)))
    }

    /// Read a cached record set. Any error here is a cache miss for the caller.
    pub async fn load(&self, locators: &[String]) -> CanvasResult<Catalog> {
        let path = self.path_for(locators);
        let bytes = fs::read(&path).await.map_err(|source| CanvasError::Read {
            path: path.clone(),
            source,
        })?;
        debug!("Read {} cached bytes from {:?}", bytes.len(), path);
        Catalog::from_yaml(&bytes, &path.to_string_lossy())
    }

    /// Write the record set, creating the cache directory on first use.
    pub async fn save(&self, locators: &[String], catalog: &Catalog) -> CanvasResult<PathBuf> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).await.map_err(|source| CanvasError::Write {
                path: self.dir.clone(),
                source,
            })?;
        }

        let yaml = catalog.to_yaml()?;
        let path = self.path_for(locators);
        fs::write(&path, yaml).await.map_err(|source| CanvasError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
