//! Selection State
//!
//! The capabilities the operator has chosen so far, plus a per-capability
//! flag remembering that a duplicate selection was already attempted.

use std::collections::{BTreeMap, HashMap};

use crate::catalog::EnrichedCapability;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected,
    AlreadySelected,
    AlreadySelectedAgain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeselectOutcome {
    Removed,
    NotPresent,
}

#[derive(Debug, Default, Clone)]
pub struct SelectionSet {
    selected: BTreeMap<String, EnrichedCapability>,
    // Invariant: every key here is also a key in `selected`.
    reselect_attempted: HashMap<String, bool>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, capability: &EnrichedCapability) -> SelectOutcome {
        let id = capability.id();
        if !self.selected.contains_key(id) {
            self.selected.insert(id.to_string(), capability.clone());
            return SelectOutcome::Selected;
        }

        if self.reselect_attempted.get(id).copied().unwrap_or(false) {
            SelectOutcome::AlreadySelectedAgain
        } else {
            self.reselect_attempted.insert(id.to_string(), true);
            SelectOutcome::AlreadySelected
        }
    }

    pub fn deselect(&mut self, capability_id: &str) -> DeselectOutcome {
        self.reselect_attempted.remove(capability_id);
        match self.selected.remove(capability_id) {
            Some(_) => DeselectOutcome::Removed,
            None => DeselectOutcome::NotPresent,
        }
    }

    pub fn contains(&self, capability_id: &str) -> bool {
        self.selected.contains_key(capability_id)
    }

    pub fn get(&self, capability_id: &str) -> Option<&EnrichedCapability> {
        self.selected.get(capability_id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected capabilities ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &EnrichedCapability> {
        self.selected.values()
    }
}
