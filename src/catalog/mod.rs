//! Catalog Records
//!
//! The raw capability, threat and control records as they appear in the
//! source YAML documents, plus loading, caching and association resolution.

pub mod cache;
pub mod loader;
pub mod resolver;
pub mod source;

pub use cache::CatalogCache;
pub use loader::CatalogLoader;
pub use resolver::{resolve, EnrichedCapability, EnrichedControl, EnrichedThreat};
pub use source::{CatalogSource, HttpSource};

use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, CanvasResult};

/// Reference namespace honored when linking records together.
pub const CCC_REFERENCE_ID: &str = "CCC";

/// A set of identifiers tagged with the taxonomy they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Mapping {
    #[serde(default)]
    pub reference_id: String,
    #[serde(default)]
    pub identifiers: Vec<String>,
}

impl Mapping {
    pub fn new(reference_id: impl Into<String>, identifiers: Vec<String>) -> Self {
        Self { reference_id: reference_id.into(), identifiers }
    }

    /// Number of entries equal to `id` when this mapping belongs to `namespace`.
    pub fn count_links(&self, namespace: &str, id: &str) -> usize {
        if self.reference_id != namespace {
            return 0;
        }
        self.identifiers.iter().filter(|candidate| *candidate == id).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_modified: String,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self == &Metadata::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Capability {
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.title.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threat {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<Mapping>,
}

impl Threat {
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.title.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Control {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub objective: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub threat_mappings: Vec<Mapping>,
}

impl Control {
    // Controls carry no title requirement; only the identifier is checked.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlFamily {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub controls: Vec<Control>,
}

/// The combined record set parsed from one or more catalog documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Catalog {
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_families: Vec<ControlFamily>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub threats: Vec<Threat>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<Capability>,
}

impl Catalog {
    /// Parse a single YAML document. `origin` only feeds the error message.
    pub fn from_yaml(bytes: &[u8], origin: &str) -> CanvasResult<Self> {
        // An empty document deserializes to unit, not to an empty catalog.
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Catalog::default());
        }
        serde_yaml::from_slice(bytes).map_err(|source| CanvasError::Parse {
            origin: origin.to_string(),
            source,
        })
    }

    pub fn to_yaml(&self) -> CanvasResult<String> {
        serde_yaml::to_string(self).map_err(CanvasError::Serialize)
    }

    /// Append another document's records after this one's.
    pub fn merge(&mut self, other: Catalog) {
        if self.metadata.is_empty() {
            self.metadata = other.metadata;
        }
        self.control_families.extend(other.control_families);
        self.threats.extend(other.threats);
        self.capabilities.extend(other.capabilities);
    }

    pub fn is_empty(&self) -> bool {
        self.control_families.is_empty() && self.threats.is_empty() && self.capabilities.is_empty()
    }
}
