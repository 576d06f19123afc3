//! Association Resolver
//!
//! Builds, for every valid capability, the threats that reference it and the
//! controls that reference those threats. Links are append-only: redundant
//! mapping entries produce repeated associations here and are only collapsed
//! when the output document is synthesized.

use std::collections::HashSet;

use super::{Capability, Catalog, Control, Threat};

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedControl {
    pub control: Control,
    pub family_title: String,
    pub family_description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedThreat {
    pub threat: Threat,
    pub controls: Vec<EnrichedControl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedCapability {
    pub capability: Capability,
    pub threats: Vec<EnrichedThreat>,
}

impl EnrichedCapability {
    pub fn id(&self) -> &str {
        &self.capability.id
    }

    /// Threat identifiers in association order, repeats included.
    pub fn threat_ids(&self) -> impl Iterator<Item = &str> {
        self.threats.iter().map(|t| t.threat.id.as_str())
    }

    /// Control identifiers across every associated threat, repeats included.
    pub fn control_ids(&self) -> impl Iterator<Item = &str> {
        self.threats
            .iter()
            .flat_map(|t| t.controls.iter().map(|c| c.control.id.as_str()))
    }

    pub fn threat_count(&self) -> usize {
        self.threats.len()
    }

    pub fn distinct_control_count(&self) -> usize {
        self.control_ids().collect::<HashSet<_>>().len()
    }
}

/// Resolve every valid capability in source order against `namespace`.
pub fn resolve(catalog: &Catalog, namespace: &str) -> Vec<EnrichedCapability> {
    catalog
        .capabilities
        .iter()
        .filter(|cap| cap.is_valid())
        .map(|cap| EnrichedCapability {
            capability: cap.clone(),
            threats: threats_for(catalog, namespace, &cap.id),
        })
        .collect()
}

fn threats_for(catalog: &Catalog, namespace: &str, capability_id: &str) -> Vec<EnrichedThreat> {
    let mut threats = Vec::new();
    for threat in catalog.threats.iter().filter(|t| t.is_valid()) {
        let links: usize = threat
            .capabilities
            .iter()
            .map(|m| m.count_links(namespace, capability_id))
            .sum();
        for _ in 0..links {
            threats.push(EnrichedThreat {
                threat: threat.clone(),
                controls: controls_for(catalog, namespace, &threat.id),
            });
        }
    }
    threats
}

fn controls_for(catalog: &Catalog, namespace: &str, threat_id: &str) -> Vec<EnrichedControl> {
    let mut controls = Vec::new();
    for family in &catalog.control_families {
        for control in family.controls.iter().filter(|c| c.is_valid()) {
            let links: usize = control
                .threat_mappings
                .iter()
                .map(|m| m.count_links(namespace, threat_id))
                .sum();
            for _ in 0..links {
                controls.push(EnrichedControl {
                    control: control.clone(),
                    family_title: family.title.clone(),
                    family_description: family.description.clone(),
                });
            }
        }
    }
    controls
}
