//! Controls Canvas
//!
//! Interactive terminal tool for assembling a custom cloud-security catalog
//! from the Common Cloud Controls reference.

use anyhow::Result;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use controls_canvas::catalog::{CatalogCache, CatalogLoader, HttpSource};
use controls_canvas::logging::init_logging;
use controls_canvas::tui::{self, SessionEnd};
use controls_canvas::{CanvasConfig, Workflow};

// ──────────────────────────────────────────────────────────────────────────────
// MAIN ENTRY POINT
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let config = CanvasConfig::from_env();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = match init_logging(&config.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        }
    };
    info!("Starting controls canvas with {} catalog sources", config.catalog_locators.len());

    let loader = CatalogLoader::new(
        CatalogCache::new(config.cache_dir.clone()),
        Arc::new(HttpSource::new()),
    );
    let mut workflow = Workflow::new(config, loader);

    match tui::run(&mut workflow).await? {
        SessionEnd::Finished => {
            if let Some(path) = workflow.written() {
                println!("Wrote {} capabilities to {}", workflow.selection().len(), path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        SessionEnd::Fatal(e) => {
            error!("Exiting after fatal error: {}", e);
            eprintln!("Error loading catalog: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
