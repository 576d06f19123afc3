//! Controls Canvas
//!
//! Build a custom catalog of cloud-security capabilities by picking from a
//! reference catalog that cross-links capabilities, threats and controls:
//! - Fingerprinted on-disk cache for source documents
//! - Capability → threat → control association resolution
//! - Interactive selection workflow in the terminal
//! - Sorted, deduplicated YAML output

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod selection;
pub mod tui;
pub mod workflow;

// Re-exports for convenience
pub use catalog::{Catalog, CatalogLoader};
pub use config::CanvasConfig;
pub use error::CanvasError;
pub use selection::SelectionSet;
pub use workflow::Workflow;
