//! Output Synthesizer
//!
//! Reduces the selection into the shared capability, threat and control
//! identifier lists and writes them out as YAML.

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

use crate::catalog::{Mapping, Metadata};
use crate::error::{CanvasError, CanvasResult};
use crate::selection::SelectionSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputCatalog {
    #[serde(skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    pub shared_capabilities: Vec<Mapping>,
    pub shared_threats: Vec<Mapping>,
    pub shared_controls: Vec<Mapping>,
}

impl OutputCatalog {
    /// Attach the operator-chosen catalog name.
    pub fn titled(mut self, title: &str) -> Self {
        self.metadata.title = title.to_string();
        self
    }

    pub fn capability_ids(&self) -> &[String] {
        first_identifiers(&self.shared_capabilities)
    }

    pub fn threat_ids(&self) -> &[String] {
        first_identifiers(&self.shared_threats)
    }

    pub fn control_ids(&self) -> &[String] {
        first_identifiers(&self.shared_controls)
    }

    pub fn to_yaml(&self) -> CanvasResult<String> {
        serde_yaml::to_string(self).map_err(CanvasError::Serialize)
    }

    pub fn persist(&self, path: &Path) -> CanvasResult<()> {
        let yaml = self.to_yaml()?;
        std::fs::write(path, yaml).map_err(|source| CanvasError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn first_identifiers(mappings: &[Mapping]) -> &[String] {
    mappings.first().map(|m| m.identifiers.as_slice()).unwrap_or(&[])
}

/// Union every identifier reachable from the selection. Each list is
/// deduplicated, sorted, and wrapped in a single `namespace` mapping.
pub fn synthesize(selection: &SelectionSet, namespace: &str) -> OutputCatalog {
    let mut capabilities = BTreeSet::new();
    let mut threats = BTreeSet::new();
    let mut controls = BTreeSet::new();

    for capability in selection.iter() {
        capabilities.insert(capability.id().to_string());
        threats.extend(capability.threat_ids().map(str::to_string));
        controls.extend(capability.control_ids().map(str::to_string));
    }

    let wrap = |ids: BTreeSet<String>| vec![Mapping::new(namespace, ids.into_iter().collect())];

    OutputCatalog {
        metadata: Metadata::default(),
        shared_capabilities: wrap(capabilities),
        shared_threats: wrap(threats),
        shared_controls: wrap(controls),
    }
}
