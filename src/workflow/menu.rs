//! Menu presentation: the items shown in the selectable list, their
//! width-aware descriptions, and the list's cursor and filter state.

use crate::catalog::EnrichedCapability;

/// Description width used before the first resize event arrives.
pub const DEFAULT_DESC_WIDTH: usize = 80;
/// At or below this width only the statistics suffix is shown.
pub const MIN_STATS_WIDTH: usize = 20;

const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    /// A real reference catalog backed by source documents
    Reference,
    /// Stand-in entry; choosing it ends the session
    Placeholder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogChoice {
    pub title: String,
    pub description: String,
    pub locators: Vec<String>,
    pub kind: CatalogKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityChoice {
    pub description: String,
    pub capability: EnrichedCapability,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuItem {
    Catalog(CatalogChoice),
    Capability(CapabilityChoice),
}

impl MenuItem {
    pub fn title(&self) -> String {
        match self {
            MenuItem::Catalog(choice) => choice.title.clone(),
            MenuItem::Capability(choice) => {
                let cap = &choice.capability.capability;
                format!("{}: {}", cap.id, cap.title)
            }
        }
    }

    pub fn description(&self) -> &str {
        match self {
            MenuItem::Catalog(choice) => &choice.description,
            MenuItem::Capability(choice) => &choice.description,
        }
    }

    pub fn filter_value(&self) -> &str {
        match self {
            MenuItem::Catalog(choice) => &choice.title,
            MenuItem::Capability(choice) => &choice.capability.capability.title,
        }
    }

    pub fn capability_id(&self) -> Option<&str> {
        match self {
            MenuItem::Capability(choice) => Some(choice.capability.id()),
            MenuItem::Catalog(_) => None,
        }
    }
}

pub fn catalog_items(reference_locators: &[String]) -> Vec<MenuItem> {
    vec![
        MenuItem::Catalog(CatalogChoice {
            title: "Common Cloud Controls".into(),
            description: "Default catalog with cloud security controls".into(),
            locators: reference_locators.to_vec(),
            kind: CatalogKind::Reference,
        }),
        MenuItem::Catalog(CatalogChoice {
            title: "Future reference options will be added here".into(),
            description: "(Selecting this placeholder will just close the program)".into(),
            locators: Vec::new(),
            kind: CatalogKind::Placeholder,
        }),
    ]
}

/// Capability items sorted by identifier, described for `width` columns.
pub fn capability_items(resolved: &[EnrichedCapability], width: usize) -> Vec<MenuItem> {
    let mut items: Vec<MenuItem> = resolved
        .iter()
        .map(|capability| {
            MenuItem::Capability(CapabilityChoice {
                description: describe(capability, width),
                capability: capability.clone(),
            })
        })
        .collect();
    items.sort_by(|a, b| a.capability_id().cmp(&b.capability_id()));
    items
}

/// First description line, cut to fit next to the statistics suffix.
pub fn describe(capability: &EnrichedCapability, width: usize) -> String {
    let stats = format!(
        " | Threats: {} | Controls: {}",
        capability.threat_count(),
        capability.distinct_control_count()
    );

    if width <= MIN_STATS_WIDTH {
        return stats;
    }

    let available = width.saturating_sub(stats.chars().count());
    if available == 0 {
        return stats;
    }

    let first_line = capability.capability.description.lines().next().unwrap_or("");
    let description = if first_line.chars().count() > available {
        let mut cut: String = first_line.chars().take(available - 1).collect();
        cut.push(ELLIPSIS);
        cut
    } else {
        first_line.to_string()
    };

    description + &stats
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    Unfiltered,
    /// Query line is open and receiving keystrokes
    Filtering,
    /// Query was accepted and still narrows the list
    Applied,
}

#[derive(Debug, Clone)]
pub struct MenuList {
    pub title: String,
    items: Vec<MenuItem>,
    cursor: usize,
    query: String,
    filter_state: FilterState,
}

impl MenuList {
    pub fn new(title: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            title: title.into(),
            items,
            cursor: 0,
            query: String::new(),
            filter_state: FilterState::Unfiltered,
        }
    }

    /// Swap the items, keeping the cursor on the same row where possible.
    pub fn set_items(&mut self, items: Vec<MenuItem>) {
        self.items = items;
        self.clamp_cursor();
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn visible(&self) -> Vec<&MenuItem> {
        if self.filter_state == FilterState::Unfiltered || self.query.is_empty() {
            return self.items.iter().collect();
        }
        let needle = self.query.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.filter_value().to_lowercase().contains(&needle))
            .collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&MenuItem> {
        self.visible().get(self.cursor).copied()
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.visible().len() {
            self.cursor += 1;
        }
    }

    pub fn filter_state(&self) -> FilterState {
        self.filter_state
    }

    pub fn is_filtering(&self) -> bool {
        self.filter_state == FilterState::Filtering
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn start_filter(&mut self) {
        self.filter_state = FilterState::Filtering;
        self.cursor = 0;
    }

    pub fn push_query(&mut self, c: char) {
        self.query.push(c);
        self.cursor = 0;
    }

    pub fn pop_query(&mut self) {
        self.query.pop();
        self.cursor = 0;
    }

    pub fn apply_filter(&mut self) {
        self.filter_state = if self.query.is_empty() {
            FilterState::Unfiltered
        } else {
            FilterState::Applied
        };
        self.clamp_cursor();
    }

    /// Drop the query and keep the cursor on the item it was on.
    pub fn clear_filter(&mut self) {
        let current = self.selected().cloned();
        self.query.clear();
        self.filter_state = FilterState::Unfiltered;
        match current.and_then(|item| self.items.iter().position(|i| *i == item)) {
            Some(index) => self.cursor = index,
            None => self.clamp_cursor(),
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }
}
