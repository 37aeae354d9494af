use ratatui::Terminal;
use ratatui::backend::TestBackend;

use super::*;
use crate::app::{Effect, Message, Model, update};
use crate::catalog::Catalog;
use crate::export::{ExportCompletion, ExportError, ExportFormat};
use crate::layout::{PointerId, Resizer, SidebarBounds};
use crate::pipeline::{FetchCompletion, FetchError, RenderRequest};
use crate::theme::{Theme, ThemeController};

fn create_model(width: u16, height: u16) -> Model {
    let catalog = Catalog::new(["notes/Intro.md", "notes/Setup.md", "notes/Usage.md"]).unwrap();
    Model::new(
        catalog,
        ThemeController::load_initial(None, Theme::Light),
        Resizer::new(SidebarBounds::default(), None, width),
        "exports",
        (width, height),
    )
}

fn fetch_request(model: &mut Model) -> RenderRequest {
    model
        .take_effects()
        .into_iter()
        .find_map(|effect| match effect {
            Effect::Fetch(request) => Some(request),
            _ => None,
        })
        .expect("a fetch was requested")
}

fn open(model: Model, identifier: &str, source: &str) -> Model {
    let mut model = update(model, Message::SelectDocument(identifier.to_string()));
    let request = fetch_request(&mut model);
    update(
        model,
        Message::FetchCompleted(FetchCompletion {
            request,
            result: Ok(source.to_string()),
        }),
    )
}

fn draw(model: &Model) -> String {
    let (width, height) = model.terminal_size;
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|frame| render(model, frame)).unwrap();
    let buffer = terminal.backend().buffer().clone();
    (0..height)
        .map(|y| {
            (0..width)
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_committed_document_fills_content_pane() {
    let model = open(create_model(100, 30), "notes/Intro.md", "# Welcome\n\nFirst steps.");
    let screen = draw(&model);
    assert!(screen.contains("Welcome"));
    assert!(screen.contains("First steps."));
    assert!(screen.contains("▶ Intro"));
    assert!(screen.contains("Setup"));
    assert!(!screen.contains("[loading]"));
}

#[test]
fn test_busy_marker_while_fetch_outstanding() {
    let mut model = update(create_model(100, 30), Message::NextDocument);
    let _ = fetch_request(&mut model);
    assert!(draw(&model).contains("[loading]"));
}

#[test]
fn test_load_failure_message() {
    let mut model = update(
        create_model(100, 30),
        Message::SelectDocument("notes/Setup.md".to_string()),
    );
    let request = fetch_request(&mut model);
    let model = update(
        model,
        Message::FetchCompleted(FetchCompletion {
            request,
            result: Err(FetchError::NotFound("notes/Setup.md".to_string())),
        }),
    );
    assert!(draw(&model).contains("Unable to load notes/Setup.md."));
}

#[test]
fn test_header_shows_pager_and_theme_labels() {
    let model = open(create_model(120, 30), "notes/Setup.md", "body");
    let screen = draw(&model);
    let header = screen.lines().next().unwrap();
    assert!(header.contains("◀ Intro"));
    assert!(header.contains("Usage ▶"));
    assert!(header.contains("Switch to Dark"));
    assert!(header.contains("Download ▾"));
}

#[test]
fn test_first_document_shows_start_label() {
    let model = open(create_model(120, 30), "notes/Intro.md", "body");
    let header = draw(&model).lines().next().unwrap().to_string();
    assert!(header.contains("◀ Start"));
}

#[test]
fn test_download_menu_lists_formats_and_working_state() {
    let model = open(create_model(100, 30), "notes/Intro.md", "# Title");
    let model = update(model, Message::ToggleDownloadMenu);
    let screen = draw(&model);
    assert!(screen.contains("Image (PNG)"));
    assert!(screen.contains("Document (PDF)"));

    let model = update(model, Message::Export(ExportFormat::Pdf));
    let screen = draw(&model);
    assert!(screen.contains("Preparing..."));
    assert!(screen.contains("Image (PNG)"));
    assert!(!screen.contains("Document (PDF)"));
}

#[test]
fn test_export_failure_shows_alert() {
    let model = open(create_model(100, 30), "notes/Intro.md", "# Title");
    let model = update(model, Message::Export(ExportFormat::Png));
    let model = update(
        model,
        Message::ExportFinished(ExportCompletion {
            format: ExportFormat::Png,
            result: Err(ExportError::Capture("boom".to_string())),
        }),
    );
    let screen = draw(&model);
    assert!(screen.contains("Unable to prepare the download."));
    assert!(screen.contains("Notice"));
}

#[test]
fn test_narrow_layout_stacks_sidebar() {
    let model = open(create_model(60, 30), "notes/Intro.md", "# Narrow");
    let screen = draw(&model);
    let rows: Vec<&str> = screen.lines().collect();
    let docs_row = rows.iter().position(|r| r.contains("Documents")).unwrap();
    let heading_row = rows.iter().position(|r| r.contains("Narrow")).unwrap();
    assert!(docs_row < heading_row);
    assert!(!screen.contains('┃'));
}

#[test]
fn test_divider_highlights_while_dragging() {
    let model = open(create_model(100, 30), "notes/Intro.md", "text");
    assert!(!draw(&model).contains('┃'));
    let model = update(model, Message::BeginDrag(PointerId(0)));
    assert!(draw(&model).contains('┃'));
}

#[test]
fn test_filter_hides_non_matching_entries() {
    let model = open(create_model(100, 30), "notes/Intro.md", "text");
    let model = update(model, Message::StartFilter);
    let model = update(model, Message::FilterInput("SET".to_string()));
    let screen = draw(&model);
    assert!(screen.contains("/ SET"));
    assert!(screen.contains("Setup"));
    assert!(!screen.contains("Usage"));
}

#[test]
fn test_filter_without_matches() {
    let model = update(create_model(100, 30), Message::FilterInput("zzz".to_string()));
    assert!(draw(&model).contains("No matches"));
}

#[test]
fn test_help_overlay_lists_keys() {
    let model = update(create_model(100, 40), Message::ToggleHelp);
    let screen = draw(&model);
    assert!(screen.contains("Previous / next document"));
    assert!(screen.contains("Toggle light / dark"));
}

#[test]
fn test_wide_table_scrolls_horizontally() {
    let source = "| Key | Value |\n|---|---|\n| alpha | a value long enough to overflow a narrow content pane by a lot |\n";
    let model = open(create_model(80, 20), "notes/Intro.md", source);
    assert!(draw(&model).contains("alpha"));

    let mut model = model;
    for _ in 0..3 {
        model = update(model, Message::ScrollTableRight);
    }
    assert!(model.viewport.column() > 0);
    assert!(!draw(&model).contains("alpha"));
}
