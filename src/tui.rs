//! Terminal front end: draws the workflow with ratatui and feeds crossterm
//! events back into it, one event at a time.

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{stdout, Stdout};

use crate::error::CanvasError;
use crate::workflow::{FilterState, Flow, Input, MenuItem, Stage, Workflow};

const TWO_COLUMN_WIDTH: u16 = 120;
const PADDED_MIN_WIDTH: u16 = 80;
const PADDED_MIN_HEIGHT: u16 = 24;

const ACCENT: Color = Color::Rgb(0x25, 0xA0, 0x65);
const STATUS: Color = Color::Rgb(0x04, 0xB5, 0x75);

pub enum SessionEnd {
    Finished,
    Fatal(CanvasError),
}

/// Translate a terminal event into a workflow input. Key releases and
/// unbound keys yield `None`.
pub fn translate(event: Event) -> Option<Input> {
    match event {
        Event::Resize(width, height) => Some(Input::Resize { width, height }),
        Event::Key(key) if key.kind == KeyEventKind::Press => translate_key(key),
        _ => None,
    }
}

fn translate_key(key: KeyEvent) -> Option<Input> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(Input::Interrupt);
    }
    match key.code {
        KeyCode::Up => Some(Input::Up),
        KeyCode::Down => Some(Input::Down),
        KeyCode::Enter => Some(Input::Enter),
        KeyCode::Backspace => Some(Input::Backspace),
        KeyCode::Delete => Some(Input::Delete),
        KeyCode::Esc => Some(Input::Esc),
        KeyCode::Char(c) => Some(Input::Char(c)),
        _ => None,
    }
}

pub async fn run(workflow: &mut Workflow) -> Result<SessionEnd> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let result = match enter_screen() {
        Ok(mut terminal) => event_loop(&mut terminal, workflow).await,
        Err(e) => Err(e),
    };

    finish(result, restore_terminal)
}

fn enter_screen() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    stdout()
        .execute(EnterAlternateScreen)
        .context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout())).context("Failed to create terminal")
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Always runs `restore`. A session error takes precedence over a restore error.
fn finish<T>(result: Result<T>, restore: impl FnOnce() -> Result<()>) -> Result<T> {
    let restored = restore();
    let value = result?;
    restored?;
    Ok(value)
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    workflow: &mut Workflow,
) -> Result<SessionEnd> {
    // crossterm reports no initial size, so seed one.
    let size = terminal.size()?;
    workflow
        .handle(Input::Resize { width: size.width, height: size.height })
        .await;

    loop {
        terminal.draw(|f| ui(f, workflow))?;

        let Some(input) = translate(event::read()?) else {
            continue;
        };

        match workflow.handle(input).await {
            Flow::Continue => {}
            Flow::Exit => return Ok(SessionEnd::Finished),
            Flow::Fatal(e) => return Ok(SessionEnd::Fatal(e)),
        }
    }
}

fn ui(f: &mut Frame, workflow: &Workflow) {
    let area = f.area();

    if let Some(warning) = workflow.size_warning() {
        f.render_widget(Paragraph::new(warning).wrap(Wrap { trim: true }), area);
        return;
    }

    let block = if area.width >= PADDED_MIN_WIDTH && area.height >= PADDED_MIN_HEIGHT {
        Block::default().padding(Padding::symmetric(2, 1))
    } else {
        Block::default()
    };
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let title = Paragraph::new(Span::styled(
        format!(" {} ", workflow.list().title),
        Style::default().fg(Color::Rgb(0xFF, 0xFD, 0xF5)).bg(ACCENT),
    ));
    f.render_widget(title, chunks[0]);

    match workflow.stage() {
        Stage::ChoosingCatalog => render_list(f, chunks[1], workflow),
        Stage::NamingCatalog => {
            let prompt = Paragraph::new(Line::from(vec![
                Span::raw("Enter catalog name: "),
                Span::styled(workflow.catalog_name(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("_"),
            ]));
            f.render_widget(prompt, chunks[1]);
        }
        Stage::SelectingCapabilities => {
            let (width, _) = workflow.size();
            if width >= TWO_COLUMN_WIDTH {
                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .split(chunks[1]);
                render_list(f, columns[0], workflow);
                render_live_preview(f, columns[1], workflow);
            } else {
                render_list(f, chunks[1], workflow);
            }
        }
        Stage::ConfirmingOutput => {
            let mut lines = vec![Line::from("Preview of output catalog:")];
            lines.extend(workflow.preview().lines().map(|l| Line::from(l.to_string())));
            lines.push(Line::from(""));
            lines.push(Line::from("Write to file? (Y/N)"));
            f.render_widget(Paragraph::new(lines), chunks[1]);
        }
    }

    let status = workflow.status().unwrap_or_default();
    f.render_widget(
        Paragraph::new(status).style(Style::default().fg(STATUS)),
        chunks[2],
    );

    let help = workflow
        .help()
        .iter()
        .map(|(key, action)| format!("{} {}", key, action))
        .collect::<Vec<_>>()
        .join(" • ");
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );
}

fn render_list(f: &mut Frame, area: Rect, workflow: &Workflow) {
    let list = workflow.list();
    let selection = workflow.selection();

    let mut area = area;
    if list.filter_state() != FilterState::Unfiltered {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area);
        let cursor = if list.is_filtering() { "_" } else { "" };
        f.render_widget(Paragraph::new(format!("Filter: {}{}", list.query(), cursor)), rows[0]);
        area = rows[1];
    }

    let items: Vec<ListItem> = list
        .visible()
        .into_iter()
        .map(|item| {
            let marker = match item {
                MenuItem::Capability(choice) if selection.contains(choice.capability.id()) => "✓ ",
                _ => "  ",
            };
            ListItem::new(vec![
                Line::from(format!("{}{}", marker, item.title())),
                Line::from(Span::styled(
                    format!("  {}", item.description()),
                    Style::default().fg(Color::Rgb(0xA8, 0xA8, 0xA8)),
                )),
            ])
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(list.cursor()));

    let widget = List::new(items)
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .highlight_symbol("│");
    f.render_stateful_widget(widget, area, &mut state);
}

fn render_live_preview(f: &mut Frame, area: Rect, workflow: &Workflow) {
    let text = workflow
        .output()
        .to_yaml()
        .unwrap_or_else(|_| "Error generating catalog preview".to_string());
    let preview = Paragraph::new(text)
        .block(Block::default().borders(Borders::LEFT).padding(Padding::left(2)))
        .wrap(Wrap { trim: false });
    f.render_widget(preview, area);
}
