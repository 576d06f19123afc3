//! Catalog Source Loader
//!
//! Cache first, then fetch every locator and merge the documents. A fresh
//! fetch is written back to the cache on a best-effort basis.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{Catalog, CatalogCache, CatalogSource};
use crate::error::{CanvasError, CanvasResult};

pub struct CatalogLoader {
    cache: CatalogCache,
    source: Arc<dyn CatalogSource>,
}

impl CatalogLoader {
    pub fn new(cache: CatalogCache, source: Arc<dyn CatalogSource>) -> Self {
        Self { cache, source }
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    pub async fn load(&self, locators: &[String]) -> CanvasResult<Catalog> {
        if locators.is_empty() {
            return Err(CanvasError::NoSources);
        }

        match self.cache.load(locators).await {
            Ok(catalog) => {
                info!("Catalog cache hit at {:?}", self.cache.path_for(locators));
                return Ok(catalog);
            }
            Err(e) => debug!("Catalog cache miss: {}", e),
        }

        let catalog = self.fetch_all(locators).await?;

        match self.cache.save(locators, &catalog).await {
            Ok(path) => info!("Cached catalog at {:?}", path),
            Err(e) => warn!("Failed to cache catalog: {}", e),
        }

        Ok(catalog)
    }

    async fn fetch_all(&self, locators: &[String]) -> CanvasResult<Catalog> {
        let mut catalog = Catalog::default();
        for locator in locators {
            let bytes = self.source.fetch(locator).await?;
            catalog.merge(Catalog::from_yaml(&bytes, locator)?);
        }
        info!(
            "Fetched {} capabilities, {} threats, {} control families from {} sources",
            catalog.capabilities.len(),
            catalog.threats.len(),
            catalog.control_families.len(),
            locators.len()
        );
        Ok(catalog)
    }
}
