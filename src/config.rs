//! Configuration for the canvas: where the cache, log and output files
//! live, which namespace links records, and which documents make up the
//! reference catalog.

use std::path::PathBuf;

use crate::catalog::CCC_REFERENCE_ID;

const DEFAULT_LOCATORS: [&str; 3] = [
    "https://raw.githubusercontent.com/finos/common-cloud-controls/refs/heads/dev/common/controls.yaml",
    "https://raw.githubusercontent.com/finos/common-cloud-controls/refs/heads/dev/common/threats.yaml",
    "https://raw.githubusercontent.com/finos/common-cloud-controls/refs/heads/dev/common/capabilities.yaml",
];

#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig {
    /// Directory holding fingerprinted catalog caches
    pub cache_dir: PathBuf,
    /// Where the finished catalog is written
    pub output_path: PathBuf,
    /// Directory for the log file
    pub log_dir: PathBuf,
    /// Reference namespace honored when linking records
    pub reference_id: String,
    /// Documents that make up the reference catalog, in merge order
    pub catalog_locators: Vec<String>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("tmp"),
            output_path: PathBuf::from("output.yaml"),
            log_dir: PathBuf::from("tmp"),
            reference_id: CCC_REFERENCE_ID.to_string(),
            catalog_locators: DEFAULT_LOCATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CanvasConfig {
    /// Defaults, overridden by a `.env` file and `CONTROLS_CANVAS_*` variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(dir) = get("CONTROLS_CANVAS_CACHE_DIR") {
            self.cache_dir = dir.into();
        }
        if let Some(path) = get("CONTROLS_CANVAS_OUTPUT") {
            self.output_path = path.into();
        }
        if let Some(dir) = get("CONTROLS_CANVAS_LOG_DIR") {
            self.log_dir = dir.into();
        }
        if let Some(reference_id) = get("CONTROLS_CANVAS_REFERENCE_ID") {
            self.reference_id = reference_id;
        }
        if let Some(sources) = get("CONTROLS_CANVAS_SOURCES") {
            let locators: Vec<String> = sources
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if !locators.is_empty() {
                self.catalog_locators = locators;
            }
        }
        self
    }
}
