use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

use controls_canvas::catalog::{CatalogCache, CatalogLoader, CatalogSource};
use controls_canvas::error::{CanvasError, CanvasResult};
use controls_canvas::workflow::{Flow, Input, MenuItem, Stage, Workflow};
use controls_canvas::CanvasConfig;

const CAPABILITIES: &str = r#"
capabilities:
  - id: A
    title: Alpha
    description: |
      Alpha capability with a fairly long first line of description text.
      Second line.
  - id: B
    title: Beta
    description: Beta capability
  - id: ""
    title: Nameless
"#;

const THREATS: &str = r#"
threats:
  - id: T1
    title: Shared threat
    capabilities:
      - reference-id: CCC
        identifiers: [A, B]
      - reference-id: NIST
        identifiers: [A]
"#;

const CONTROLS: &str = r#"
control-families:
  - title: Data
    description: Data protection
    controls:
      - id: C1
        title: Encrypt
        threat-mappings:
          - reference-id: CCC
            identifiers: [T1]
      - id: C2
        title: Rotate keys
        threat-mappings:
          - reference-id: CCC
            identifiers: [T1]
"#;

struct FixtureSource {
    docs: HashMap<String, &'static str>,
}

#[async_trait]
impl CatalogSource for FixtureSource {
    async fn fetch(&self, locator: &str) -> CanvasResult<Vec<u8>> {
        self.docs
            .get(locator)
            .map(|doc| doc.as_bytes().to_vec())
            .ok_or_else(|| CanvasError::Fetch {
                locator: locator.to_string(),
                reason: "HTTP 404 Not Found".into(),
            })
    }
}

struct Harness {
    _dir: TempDir,
    output_path: PathBuf,
    workflow: Workflow,
}

fn harness_with(locators: &[&str], output_path: Option<PathBuf>) -> Harness {
    let dir = tempdir().unwrap();
    let output_path = output_path.unwrap_or_else(|| dir.path().join("output.yaml"));

    let config = CanvasConfig {
        cache_dir: dir.path().join("tmp"),
        output_path: output_path.clone(),
        log_dir: dir.path().join("tmp"),
        catalog_locators: locators.iter().map(|s| s.to_string()).collect(),
        ..CanvasConfig::default()
    };

    let source = Arc::new(FixtureSource {
        docs: HashMap::from([
            ("capabilities.yaml".to_string(), CAPABILITIES),
            ("threats.yaml".to_string(), THREATS),
            ("controls.yaml".to_string(), CONTROLS),
        ]),
    });
    let loader = CatalogLoader::new(CatalogCache::new(config.cache_dir.clone()), source);

    Harness { _dir: dir, output_path, workflow: Workflow::new(config, loader) }
}

fn harness() -> Harness {
    harness_with(&["controls.yaml", "threats.yaml", "capabilities.yaml"], None)
}

async fn send(workflow: &mut Workflow, inputs: &[Input]) -> Flow {
    let mut last = Flow::Continue;
    for input in inputs {
        last = workflow.handle(*input).await;
    }
    last
}

async fn type_text(workflow: &mut Workflow, text: &str) {
    for c in text.chars() {
        workflow.handle(Input::Char(c)).await;
    }
}

async fn reach_selection(workflow: &mut Workflow) {
    send(workflow, &[Input::Resize { width: 100, height: 40 }, Input::Enter]).await;
    assert_eq!(workflow.stage(), Stage::NamingCatalog);
    type_text(workflow, "Team Catalog").await;
    send(workflow, &[Input::Enter]).await;
    assert_eq!(workflow.stage(), Stage::SelectingCapabilities);
}

fn written_lists(path: &Path) -> (Vec<String>, Vec<String>, Vec<String>) {
    let yaml: serde_yaml::Value = serde_yaml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    let ids = |key: &str| -> Vec<String> {
        yaml[key][0]["identifiers"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    };
    (ids("shared-capabilities"), ids("shared-threats"), ids("shared-controls"))
}

#[tokio::test]
async fn test_select_two_capabilities_and_write() {
    let mut h = harness();
    reach_selection(&mut h.workflow).await;

    send(&mut h.workflow, &[Input::Enter, Input::Down, Input::Enter]).await;
    assert_eq!(h.workflow.selection().len(), 2);

    send(&mut h.workflow, &[Input::Char(' ')]).await;
    assert_eq!(h.workflow.stage(), Stage::ConfirmingOutput);
    assert!(h.workflow.preview().contains("title: Team Catalog"));

    let flow = send(&mut h.workflow, &[Input::Char('y')]).await;
    assert!(matches!(flow, Flow::Exit));
    assert_eq!(h.workflow.written(), Some(&h.output_path));

    let (caps, threats, controls) = written_lists(&h.output_path);
    assert_eq!(caps, vec!["A", "B"]);
    assert_eq!(threats, vec!["T1"]);
    assert_eq!(controls, vec!["C1", "C2"]);
}

#[tokio::test]
async fn test_reject_then_deselect_yields_empty_output() {
    let mut h = harness();
    reach_selection(&mut h.workflow).await;

    send(&mut h.workflow, &[Input::Enter, Input::Char(' '), Input::Char('n')]).await;
    assert_eq!(h.workflow.stage(), Stage::SelectingCapabilities);
    assert!(h.workflow.selection().contains("A"));

    send(&mut h.workflow, &[Input::Char('x')]).await;
    assert_eq!(h.workflow.status(), Some("Deselected A"));

    send(&mut h.workflow, &[Input::Char(' ')]).await;
    let flow = send(&mut h.workflow, &[Input::Char('Y')]).await;
    assert!(matches!(flow, Flow::Exit));

    let (caps, threats, controls) = written_lists(&h.output_path);
    assert!(caps.is_empty());
    assert!(threats.is_empty());
    assert!(controls.is_empty());
}

#[tokio::test]
async fn test_duplicate_selection_messages() {
    let mut h = harness();
    reach_selection(&mut h.workflow).await;

    send(&mut h.workflow, &[Input::Enter]).await;
    assert_eq!(h.workflow.status(), Some("Selected A"));
    send(&mut h.workflow, &[Input::Enter]).await;
    assert_eq!(h.workflow.status(), Some("Already selected A"));
    send(&mut h.workflow, &[Input::Enter]).await;
    assert_eq!(h.workflow.status(), Some("You can stop clicking on A"));
    assert_eq!(h.workflow.selection().len(), 1);
}

#[tokio::test]
async fn test_invalid_capabilities_are_not_listed() {
    let mut h = harness();
    reach_selection(&mut h.workflow).await;

    let ids: Vec<_> = h
        .workflow
        .list()
        .items()
        .iter()
        .filter_map(MenuItem::capability_id)
        .collect();
    assert_eq!(ids, vec!["A", "B"]);
}

#[tokio::test]
async fn test_placeholder_catalog_exits() {
    let mut h = harness();
    let flow = send(&mut h.workflow, &[Input::Down, Input::Enter]).await;
    assert!(matches!(flow, Flow::Exit));
    assert_eq!(h.workflow.stage(), Stage::ChoosingCatalog);
}

#[tokio::test]
async fn test_unloadable_catalog_is_fatal() {
    let mut h = harness_with(&["capabilities.yaml", "missing.yaml"], None);
    let flow = send(&mut h.workflow, &[Input::Enter]).await;
    assert!(matches!(flow, Flow::Fatal(CanvasError::Fetch { .. })));
}

#[tokio::test]
async fn test_empty_name_is_not_accepted() {
    let mut h = harness();
    send(&mut h.workflow, &[Input::Enter, Input::Enter]).await;
    assert_eq!(h.workflow.stage(), Stage::NamingCatalog);

    type_text(&mut h.workflow, "ab").await;
    send(&mut h.workflow, &[Input::Backspace, Input::Backspace, Input::Enter]).await;
    assert_eq!(h.workflow.stage(), Stage::NamingCatalog);

    type_text(&mut h.workflow, "q").await;
    send(&mut h.workflow, &[Input::Enter]).await;
    assert_eq!(h.workflow.stage(), Stage::SelectingCapabilities);
    assert_eq!(h.workflow.list().title, "Controls Canvas: q");
}

#[tokio::test]
async fn test_name_length_is_capped() {
    let mut h = harness();
    send(&mut h.workflow, &[Input::Enter]).await;
    type_text(&mut h.workflow, &"n".repeat(80)).await;
    assert_eq!(h.workflow.catalog_name().len(), 64);
}

#[tokio::test]
async fn test_filter_mode_suppresses_bindings() {
    let mut h = harness();
    reach_selection(&mut h.workflow).await;

    send(&mut h.workflow, &[Input::Char('/')]).await;
    type_text(&mut h.workflow, "bet q ").await;
    assert_eq!(h.workflow.stage(), Stage::SelectingCapabilities);
    assert!(h.workflow.selection().is_empty());
    assert_eq!(h.workflow.list().query(), "bet q ");

    send(&mut h.workflow, &[Input::Backspace, Input::Backspace, Input::Backspace]).await;
    send(&mut h.workflow, &[Input::Enter, Input::Enter]).await;
    assert!(h.workflow.selection().contains("B"));

    send(&mut h.workflow, &[Input::Esc]).await;
    assert_eq!(h.workflow.list().visible().len(), 2);
    assert_eq!(h.workflow.list().selected().and_then(MenuItem::capability_id), Some("B"));
}

#[tokio::test]
async fn test_resize_rederives_descriptions_while_selecting() {
    let mut h = harness();
    reach_selection(&mut h.workflow).await;

    assert_eq!(
        h.workflow.list().items()[0].description(),
        "Alpha capa… | Threats: 1 | Controls: 2"
    );

    send(&mut h.workflow, &[Input::Resize { width: 50, height: 20 }]).await;
    assert!(h.workflow.size_warning().is_some());
    assert_eq!(h.workflow.list().items()[0].description(), " | Threats: 1 | Controls: 2");

    send(&mut h.workflow, &[Input::Resize { width: 200, height: 50 }]).await;
    assert!(h.workflow.size_warning().is_none());
    assert_eq!(h.workflow.desc_width(), 88);
    let wide = h.workflow.list().items()[0].description().to_string();
    assert_eq!(wide.chars().count(), 88);
    assert!(wide.starts_with("Alpha capability with a fairly long first line"));
    assert!(wide.contains('…'));
}

#[tokio::test]
async fn test_resize_outside_selection_keeps_list() {
    const NARROW: &str = "Alpha capa… | Threats: 1 | Controls: 2";

    let mut h = harness();
    send(&mut h.workflow, &[Input::Resize { width: 100, height: 40 }, Input::Enter]).await;
    assert_eq!(h.workflow.stage(), Stage::NamingCatalog);
    assert_eq!(h.workflow.list().items()[0].description(), NARROW);

    send(&mut h.workflow, &[Input::Resize { width: 200, height: 50 }]).await;
    assert_eq!(h.workflow.desc_width(), 88);
    assert_eq!(h.workflow.list().items()[0].description(), NARROW);

    send(&mut h.workflow, &[Input::Resize { width: 50, height: 20 }]).await;
    assert!(h.workflow.size_warning().is_some());
    assert_eq!(h.workflow.desc_width(), 0);
    assert_eq!(h.workflow.list().items()[0].description(), NARROW);

    send(&mut h.workflow, &[Input::Resize { width: 100, height: 40 }]).await;
    type_text(&mut h.workflow, "Team").await;
    send(&mut h.workflow, &[Input::Enter, Input::Char(' ')]).await;
    assert_eq!(h.workflow.stage(), Stage::ConfirmingOutput);

    send(&mut h.workflow, &[Input::Resize { width: 200, height: 50 }]).await;
    assert_eq!(h.workflow.size(), (200, 50));
    assert_eq!(h.workflow.desc_width(), 88);
    assert_eq!(h.workflow.list().items()[0].description(), NARROW);

    send(&mut h.workflow, &[Input::Char('n')]).await;
    assert_eq!(h.workflow.stage(), Stage::SelectingCapabilities);
    assert_eq!(h.workflow.list().items()[0].description(), NARROW);

    send(&mut h.workflow, &[Input::Resize { width: 200, height: 50 }]).await;
    assert_eq!(h.workflow.list().items()[0].description().chars().count(), 88);
}

#[tokio::test]
async fn test_full_help_toggle() {
    let mut h = harness();
    reach_selection(&mut h.workflow).await;
    let short = h.workflow.help().len();

    send(&mut h.workflow, &[Input::Char('H')]).await;
    assert!(h.workflow.show_full_help());
    assert!(h.workflow.help().contains(&("/", "filter")));
    assert!(h.workflow.help().len() > short);

    send(&mut h.workflow, &[Input::Char('H')]).await;
    assert!(!h.workflow.show_full_help());
    assert_eq!(h.workflow.help().len(), short);
}

#[tokio::test]
async fn test_write_failure_keeps_confirming_state() {
    let dir = tempdir().unwrap();
    let bad_path = dir.path().join("no-such-dir").join("output.yaml");
    let mut h = harness_with(&["controls.yaml", "threats.yaml", "capabilities.yaml"], Some(bad_path));
    reach_selection(&mut h.workflow).await;

    send(&mut h.workflow, &[Input::Enter, Input::Char(' ')]).await;
    let flow = send(&mut h.workflow, &[Input::Char('y')]).await;

    assert!(matches!(flow, Flow::Continue));
    assert_eq!(h.workflow.stage(), Stage::ConfirmingOutput);
    assert!(h.workflow.status().unwrap().starts_with("Failed to write"));
    assert!(h.workflow.selection().contains("A"));
    assert!(h.workflow.written().is_none());
}

#[tokio::test]
async fn test_interrupt_exits_from_any_stage() {
    let mut h = harness();
    send(&mut h.workflow, &[Input::Enter]).await;
    assert!(matches!(send(&mut h.workflow, &[Input::Interrupt]).await, Flow::Exit));
}
