//! Workflow State Machine
//!
//! Drives catalog choice, naming, capability selection and confirmation.
//! `Workflow` is the single context object the event loop owns; every input
//! is routed through `handle` and nothing here touches the terminal.

pub mod menu;

pub use menu::{CatalogKind, FilterState, MenuItem, MenuList};

use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::catalog::{resolve, CatalogLoader, EnrichedCapability};
use crate::config::CanvasConfig;
use crate::error::CanvasError;
use crate::output::{synthesize, OutputCatalog};
use crate::selection::{DeselectOutcome, SelectOutcome, SelectionSet};

pub const TITLE_TEXT: &str = "Controls Canvas";
pub const MAX_NAME_LEN: usize = 64;
/// Below this terminal width only a size warning is drawn.
pub const MIN_WINDOW_WIDTH: u16 = 60;
/// Horizontal padding the outer frame takes from the terminal width.
pub const FRAME_WIDTH: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ChoosingCatalog,
    NamingCatalog,
    SelectingCapabilities,
    ConfirmingOutput,
}

/// Terminal-independent input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Up,
    Down,
    Enter,
    Backspace,
    Delete,
    Esc,
    Char(char),
    /// Ctrl+C; ends the session from any stage
    Interrupt,
    Resize { width: u16, height: u16 },
}

#[derive(Debug)]
pub enum Flow {
    Continue,
    Exit,
    /// The reference catalog could not be loaded
    Fatal(CanvasError),
}

pub struct Workflow {
    config: CanvasConfig,
    loader: CatalogLoader,
    stage: Stage,
    list: MenuList,
    resolved: Vec<EnrichedCapability>,
    selection: SelectionSet,
    catalog_name: String,
    preview: String,
    status: Option<String>,
    width: u16,
    height: u16,
    desc_width: usize,
    size_warning: bool,
    show_full_help: bool,
    written: Option<PathBuf>,
}

impl Workflow {
    pub fn new(config: CanvasConfig, loader: CatalogLoader) -> Self {
        let list = MenuList::new("Select Catalog", menu::catalog_items(&config.catalog_locators));
        Self {
            config,
            loader,
            stage: Stage::ChoosingCatalog,
            list,
            resolved: Vec::new(),
            selection: SelectionSet::new(),
            catalog_name: String::new(),
            preview: String::new(),
            status: None,
            width: 0,
            height: 0,
            desc_width: menu::DEFAULT_DESC_WIDTH,
            size_warning: false,
            show_full_help: false,
            written: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn list(&self) -> &MenuList {
        &self.list
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn catalog_name(&self) -> &str {
        &self.catalog_name
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn desc_width(&self) -> usize {
        self.desc_width
    }

    pub fn size_warning(&self) -> Option<&'static str> {
        self.size_warning
            .then_some("Window too small. Please resize to view content.")
    }

    pub fn show_full_help(&self) -> bool {
        self.show_full_help
    }

    /// Path of the output file, once it has been written.
    pub fn written(&self) -> Option<&PathBuf> {
        self.written.as_ref()
    }

    /// The output document for the current selection, recomputed each call.
    pub fn output(&self) -> OutputCatalog {
        synthesize(&self.selection, &self.config.reference_id).titled(&self.catalog_name)
    }

    pub fn help(&self) -> Vec<(&'static str, &'static str)> {
        help_entries(self.stage, self.list.is_filtering(), self.show_full_help)
    }

    pub async fn handle(&mut self, input: Input) -> Flow {
        if let Input::Resize { width, height } = input {
            self.on_resize(width, height);
            return Flow::Continue;
        }
        if input == Input::Interrupt {
            return Flow::Exit;
        }

        let uses_list = matches!(self.stage, Stage::ChoosingCatalog | Stage::SelectingCapabilities);
        if uses_list && self.list.is_filtering() {
            self.on_filter_input(input);
            return Flow::Continue;
        }

        match self.stage {
            Stage::ChoosingCatalog => self.on_choosing(input).await,
            Stage::NamingCatalog => self.on_naming(input),
            Stage::SelectingCapabilities => self.on_selecting(input),
            Stage::ConfirmingOutput => self.on_confirming(input),
        }
    }

    fn transition(&mut self, next: Stage) {
        info!("Workflow {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }

    fn on_resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.size_warning = width < MIN_WINDOW_WIDTH;
        self.desc_width = if self.size_warning {
            0
        } else {
            (usize::from(width.saturating_sub(FRAME_WIDTH)) / 2).saturating_sub(10)
        };

        if self.stage == Stage::SelectingCapabilities {
            self.list.set_items(menu::capability_items(&self.resolved, self.desc_width));
        }
    }

    fn on_filter_input(&mut self, input: Input) {
        match input {
            Input::Char(c) => self.list.push_query(c),
            Input::Backspace => self.list.pop_query(),
            Input::Enter => self.list.apply_filter(),
            Input::Esc => self.list.clear_filter(),
            Input::Up => self.list.move_up(),
            Input::Down => self.list.move_down(),
            _ => {}
        }
    }

    fn on_list_navigation(&mut self, input: Input) -> bool {
        match input {
            Input::Up | Input::Char('k') => self.list.move_up(),
            Input::Down | Input::Char('j') => self.list.move_down(),
            Input::Char('/') => self.list.start_filter(),
            Input::Esc if self.list.filter_state() == FilterState::Applied => self.list.clear_filter(),
            _ => return false,
        }
        true
    }

    async fn on_choosing(&mut self, input: Input) -> Flow {
        if self.on_list_navigation(input) {
            return Flow::Continue;
        }
        match input {
            Input::Enter => self.choose_catalog().await,
            Input::Char('q') | Input::Esc => Flow::Exit,
            _ => Flow::Continue,
        }
    }

    async fn choose_catalog(&mut self) -> Flow {
        let Some(MenuItem::Catalog(choice)) = self.list.selected().cloned() else {
            return Flow::Continue;
        };

        if choice.kind == CatalogKind::Placeholder {
            info!("Placeholder catalog chosen, exiting");
            return Flow::Exit;
        }

        let catalog = match self.loader.load(&choice.locators).await {
            Ok(catalog) => catalog,
            Err(e) => {
                error!("Error loading catalog: {}", e);
                return Flow::Fatal(e);
            }
        };

        self.resolved = resolve(&catalog, &self.config.reference_id);
        info!("Resolved {} capabilities from {}", self.resolved.len(), choice.title);

        self.list = MenuList::new(
            TITLE_TEXT,
            menu::capability_items(&self.resolved, self.desc_width),
        );
        self.transition(Stage::NamingCatalog);
        Flow::Continue
    }

    fn on_naming(&mut self, input: Input) -> Flow {
        match input {
            Input::Enter if !self.catalog_name.is_empty() => {
                self.list.title = format!("{}: {}", TITLE_TEXT, self.catalog_name);
                self.transition(Stage::SelectingCapabilities);
            }
            Input::Backspace => {
                self.catalog_name.pop();
            }
            Input::Char(c) if !c.is_control() && self.catalog_name.chars().count() < MAX_NAME_LEN => {
                self.catalog_name.push(c);
            }
            Input::Esc => return Flow::Exit,
            _ => {}
        }
        Flow::Continue
    }

    fn on_selecting(&mut self, input: Input) -> Flow {
        if self.on_list_navigation(input) {
            return Flow::Continue;
        }
        match input {
            Input::Enter => self.select_current(),
            Input::Char('x') | Input::Backspace | Input::Delete => self.deselect_current(),
            Input::Char(' ') => self.finalize(),
            Input::Char('H') => self.show_full_help = !self.show_full_help,
            Input::Char('q') => return Flow::Exit,
            _ => {}
        }
        Flow::Continue
    }

    fn select_current(&mut self) {
        let Some(MenuItem::Capability(choice)) = self.list.selected() else {
            return;
        };
        let id = choice.capability.id().to_string();
        let outcome = self.selection.select(&choice.capability);
        debug!("Select {}: {:?}", id, outcome);

        self.status = Some(match outcome {
            SelectOutcome::Selected => format!("Selected {}", id),
            SelectOutcome::AlreadySelected => format!("Already selected {}", id),
            SelectOutcome::AlreadySelectedAgain => format!("You can stop clicking on {}", id),
        });
    }

    fn deselect_current(&mut self) {
        let Some(id) = self.list.selected().and_then(MenuItem::capability_id).map(str::to_string) else {
            return;
        };
        let outcome = self.selection.deselect(&id);
        debug!("Deselect {}: {:?}", id, outcome);

        if outcome == DeselectOutcome::Removed {
            self.status = Some(format!("Deselected {}", id));
        }
    }

    fn finalize(&mut self) {
        match self.output().to_yaml() {
            Ok(yaml) => {
                self.preview = yaml;
                self.status = None;
                self.transition(Stage::ConfirmingOutput);
            }
            Err(e) => {
                warn!("Failed to generate preview: {}", e);
                self.status = Some(format!("Failed to generate preview: {}", e));
            }
        }
    }

    fn on_confirming(&mut self, input: Input) -> Flow {
        match input {
            Input::Char('y') | Input::Char('Y') => {
                let path = self.config.output_path.clone();
                match self.output().persist(&path) {
                    Ok(()) => {
                        info!("Wrote {} capabilities to {:?}", self.selection.len(), path);
                        self.written = Some(path);
                        return Flow::Exit;
                    }
                    Err(e) => {
                        error!("Failed to write output: {}", e);
                        self.status = Some(format!("Failed to write {}: {}", path.display(), e));
                    }
                }
            }
            Input::Char('n') | Input::Char('N') => {
                self.status = None;
                self.transition(Stage::SelectingCapabilities);
            }
            Input::Char('q') => return Flow::Exit,
            _ => {}
        }
        Flow::Continue
    }
}

/// Key help for a stage. Filtering hides every workflow binding.
pub fn help_entries(stage: Stage, filtering: bool, full: bool) -> Vec<(&'static str, &'static str)> {
    if filtering {
        return vec![("enter", "apply filter"), ("esc", "cancel filter")];
    }

    let mut entries = match stage {
        Stage::ChoosingCatalog => vec![("↑/↓", "move"), ("enter", "choose"), ("q", "quit")],
        Stage::NamingCatalog => vec![("enter", "continue"), ("esc", "quit")],
        Stage::SelectingCapabilities => vec![
            ("enter", "choose"),
            ("x", "delete"),
            ("space", "generate output"),
            ("H", "toggle help"),
        ],
        Stage::ConfirmingOutput => vec![("y", "write file"), ("n", "back to selection")],
    };

    if full && stage == Stage::SelectingCapabilities {
        entries.extend([("↑/↓", "move"), ("/", "filter"), ("q", "quit"), ("ctrl+c", "quit")]);
    }
    entries
}
