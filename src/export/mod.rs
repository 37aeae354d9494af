//! Download menu state and the PNG/PDF export jobs behind it.
//!
//! The orchestrator owns the menu and one control per format. Starting an
//! export yields an [`ExportJob`] that runs off the UI thread; its
//! [`ExportCompletion`] is fed back through [`ExportOrchestrator::finish`].

mod capture;
mod pdf;

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use image::{ImageFormat, RgbaImage};
use thiserror::Error;

pub use capture::{PaneSnapshot, RegionCapture, SnapshotRun, SvgCapture};
pub use pdf::{A4_HEIGHT_PT, A4_WIDTH_PT, DocumentAssembly, PdfAssembler, page_offsets};

/// Alert shown for any export failure.
pub const EXPORT_FAILED_MESSAGE: &str = "Unable to prepare the download. Please try again.";
/// Label of a control while its export runs.
pub const PREPARING_LABEL: &str = "Preparing...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Pdf,
}

impl ExportFormat {
    /// Menu order.
    pub const ALL: [Self; 2] = [Self::Png, Self::Pdf];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Png => "Image (PNG)",
            Self::Pdf => "Document (PDF)",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Png => 0,
            Self::Pdf => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("capture failed: {0}")]
    Capture(String),
    #[error("document assembly failed: {0}")]
    Assemble(String),
    #[error("saving {path} failed: {message}")]
    Save { path: PathBuf, message: String },
}

/// Why an export request was refused before any work started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExportRejected {
    #[error("an export is already in progress")]
    Busy,
}

/// Where keyboard focus sits within the download menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuFocus {
    Trigger,
    Item(usize),
    /// Focus left the menu entirely (outside click).
    Elsewhere,
}

/// The download dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportMenu {
    open: bool,
    focus: MenuFocus,
}

impl Default for ExportMenu {
    fn default() -> Self {
        Self {
            open: false,
            focus: MenuFocus::Elsewhere,
        }
    }
}

impl ExportMenu {
    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub const fn focus(&self) -> MenuFocus {
        self.focus
    }

    /// Open and focus the first option.
    pub const fn open(&mut self) {
        self.open = true;
        self.focus = MenuFocus::Item(0);
    }

    /// Close. With `return_focus` the trigger takes focus, as after Escape.
    pub const fn close(&mut self, return_focus: bool) {
        self.open = false;
        self.focus = if return_focus {
            MenuFocus::Trigger
        } else {
            MenuFocus::Elsewhere
        };
    }

    pub const fn toggle(&mut self) {
        if self.open {
            self.close(true);
        } else {
            self.open();
        }
    }

    pub fn focus_next(&mut self) {
        if let MenuFocus::Item(idx) = self.focus {
            self.focus = MenuFocus::Item((idx + 1) % ExportFormat::ALL.len());
        }
    }

    pub fn focus_previous(&mut self) {
        if let MenuFocus::Item(idx) = self.focus {
            let len = ExportFormat::ALL.len();
            self.focus = MenuFocus::Item((idx + len - 1) % len);
        }
    }

    /// Format under focus, when an option has it.
    pub fn focused_format(&self) -> Option<ExportFormat> {
        match self.focus {
            MenuFocus::Item(idx) if self.open => ExportFormat::ALL.get(idx).copied(),
            _ => None,
        }
    }
}

/// One menu option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportControl {
    format: ExportFormat,
    working: bool,
}

impl ExportControl {
    const fn new(format: ExportFormat) -> Self {
        Self {
            format,
            working: false,
        }
    }

    pub const fn format(&self) -> ExportFormat {
        self.format
    }

    pub const fn label(&self) -> &'static str {
        if self.working {
            PREPARING_LABEL
        } else {
            self.format.label()
        }
    }

    pub const fn is_disabled(&self) -> bool {
        self.working
    }

    pub const fn is_busy(&self) -> bool {
        self.working
    }
}

/// Everything a worker needs to produce one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    pub format: ExportFormat,
    pub snapshot: PaneSnapshot,
    pub directory: PathBuf,
    pub file_name: String,
}

impl ExportJob {
    pub fn destination(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportCompletion {
    pub format: ExportFormat,
    pub result: Result<PathBuf, ExportError>,
}

/// Menu, controls and the single in-flight export slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOrchestrator {
    menu: ExportMenu,
    controls: [ExportControl; 2],
    directory: PathBuf,
    in_flight: Option<ExportFormat>,
}

impl ExportOrchestrator {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            menu: ExportMenu::default(),
            controls: ExportFormat::ALL.map(ExportControl::new),
            directory: directory.into(),
            in_flight: None,
        }
    }

    pub const fn menu(&self) -> &ExportMenu {
        &self.menu
    }

    pub const fn menu_mut(&mut self) -> &mut ExportMenu {
        &mut self.menu
    }

    pub const fn controls(&self) -> &[ExportControl; 2] {
        &self.controls
    }

    pub const fn control(&self, format: ExportFormat) -> &ExportControl {
        &self.controls[format.index()]
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub const fn in_flight(&self) -> Option<ExportFormat> {
        self.in_flight
    }

    /// Mark `format` busy and describe the work.
    ///
    /// `stem` is the current document's label; the file is `<stem>.<ext>`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportRejected::Busy`] while another export runs.
    pub fn begin(
        &mut self,
        format: ExportFormat,
        snapshot: PaneSnapshot,
        stem: &str,
    ) -> Result<ExportJob, ExportRejected> {
        if let Some(running) = self.in_flight {
            tracing::warn!(?running, requested = ?format, "export already in progress");
            return Err(ExportRejected::Busy);
        }
        self.in_flight = Some(format);
        self.controls[format.index()].working = true;
        Ok(ExportJob {
            format,
            snapshot,
            directory: self.directory.clone(),
            file_name: format!("{stem}.{}", format.extension()),
        })
    }

    /// Restore the control, close the menu and return focus to the trigger.
    /// Runs for success and failure alike.
    pub fn finish(&mut self, completion: &ExportCompletion) {
        self.controls[completion.format.index()].working = false;
        if self.in_flight == Some(completion.format) {
            self.in_flight = None;
        }
        self.menu.close(true);
        match &completion.result {
            Ok(path) => tracing::info!(path = %path.display(), "export saved"),
            Err(err) => tracing::error!(%err, format = ?completion.format, "export failed"),
        }
    }
}

/// The capture and assembly capabilities an export needs.
#[derive(Clone)]
pub struct ExportBackend {
    pub capture: Arc<dyn RegionCapture>,
    pub assembly: Arc<dyn DocumentAssembly>,
}

impl std::fmt::Debug for ExportBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportBackend").finish_non_exhaustive()
    }
}

impl Default for ExportBackend {
    fn default() -> Self {
        Self {
            capture: Arc::new(SvgCapture::default()),
            assembly: Arc::new(PdfAssembler::default()),
        }
    }
}

/// Produce and save the file for `job`.
///
/// # Errors
///
/// Returns the first capture, assembly or save failure.
pub fn run_export(job: &ExportJob, backend: &ExportBackend) -> Result<PathBuf, ExportError> {
    let image = backend.capture.capture(&job.snapshot)?;
    let bytes = match job.format {
        ExportFormat::Png => encode_png(&image)?,
        ExportFormat::Pdf => backend.assembly.assemble(&image)?,
    };
    let destination = job.destination();
    save_atomically(&destination, &bytes)?;
    Ok(destination)
}

/// Run `job` on a worker thread and hand the completion to `on_done`.
///
/// # Errors
///
/// Returns an error if the worker thread cannot be spawned.
pub fn spawn_export<F>(
    job: ExportJob,
    backend: ExportBackend,
    on_done: F,
) -> std::io::Result<thread::JoinHandle<()>>
where
    F: FnOnce(ExportCompletion) + Send + 'static,
{
    thread::Builder::new()
        .name(format!("export-{}", job.format.extension()))
        .spawn(move || {
            let result = run_export(&job, &backend);
            on_done(ExportCompletion {
                format: job.format,
                result,
            });
        })
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| ExportError::Capture(err.to_string()))?;
    Ok(cursor.into_inner())
}

/// Write through a sibling temp file so a failure never leaves a partial file.
fn save_atomically(destination: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let save_error = |err: std::io::Error| ExportError::Save {
        path: destination.to_path_buf(),
        message: err.to_string(),
    };
    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(save_error)?;
    }
    let file_name = destination
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let partial = destination.with_file_name(format!(".{file_name}.part"));

    let written = fs::File::create(&partial)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&partial, destination));
    if let Err(err) = written {
        let _ = fs::remove_file(&partial);
        return Err(save_error(err));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;
    use crate::theme::{Rgb, Theme};
    use tempfile::tempdir;

    struct FailingCapture;

    impl RegionCapture for FailingCapture {
        fn capture(&self, _snapshot: &PaneSnapshot) -> Result<RgbaImage, ExportError> {
            Err(ExportError::Capture("no canvas".to_string()))
        }
    }

    struct SolidCapture;

    impl RegionCapture for SolidCapture {
        fn capture(&self, _snapshot: &PaneSnapshot) -> Result<RgbaImage, ExportError> {
            Ok(RgbaImage::from_pixel(40, 30, image::Rgba([1, 2, 3, 255])))
        }
    }

    fn snapshot() -> PaneSnapshot {
        PaneSnapshot {
            lines: Vec::new(),
            background: Rgb(0, 0, 0),
        }
    }

    #[test]
    fn test_menu_open_focuses_first_option() {
        let mut menu = ExportMenu::default();
        menu.toggle();
        assert!(menu.is_open());
        assert_eq!(menu.focused_format(), Some(ExportFormat::Png));
        menu.focus_next();
        assert_eq!(menu.focused_format(), Some(ExportFormat::Pdf));
        menu.focus_next();
        assert_eq!(menu.focused_format(), Some(ExportFormat::Png));
        menu.focus_previous();
        assert_eq!(menu.focused_format(), Some(ExportFormat::Pdf));
    }

    #[test]
    fn test_menu_close_variants() {
        let mut menu = ExportMenu::default();
        menu.open();
        menu.close(true);
        assert!(!menu.is_open());
        assert_eq!(menu.focus(), MenuFocus::Trigger);

        menu.open();
        menu.close(false);
        assert_eq!(menu.focus(), MenuFocus::Elsewhere);
        assert_eq!(menu.focused_format(), None);
    }

    #[test]
    fn test_begin_marks_control_busy() {
        let mut orchestrator = ExportOrchestrator::new("/tmp/out");
        let job = orchestrator
            .begin(ExportFormat::Pdf, snapshot(), "BS_3")
            .unwrap();
        assert_eq!(job.file_name, "BS_3.pdf");
        assert_eq!(job.destination(), PathBuf::from("/tmp/out/BS_3.pdf"));

        let control = orchestrator.control(ExportFormat::Pdf);
        assert_eq!(control.label(), "Preparing...");
        assert!(control.is_disabled());
        assert!(control.is_busy());
        assert_eq!(orchestrator.control(ExportFormat::Png).label(), "Image (PNG)");
    }

    #[test]
    fn test_second_export_is_rejected_while_busy() {
        let mut orchestrator = ExportOrchestrator::new("/tmp/out");
        orchestrator.begin(ExportFormat::Png, snapshot(), "A").unwrap();
        assert_eq!(
            orchestrator.begin(ExportFormat::Pdf, snapshot(), "A"),
            Err(ExportRejected::Busy)
        );
        assert!(!orchestrator.control(ExportFormat::Pdf).is_busy());
    }

    #[test]
    fn test_finish_restores_control_and_closes_menu() {
        let mut orchestrator = ExportOrchestrator::new("/tmp/out");
        orchestrator.menu_mut().open();
        orchestrator.begin(ExportFormat::Png, snapshot(), "A").unwrap();
        orchestrator.finish(&ExportCompletion {
            format: ExportFormat::Png,
            result: Err(ExportError::Capture("boom".to_string())),
        });

        let control = orchestrator.control(ExportFormat::Png);
        assert_eq!(control.label(), "Image (PNG)");
        assert!(!control.is_disabled());
        assert!(!orchestrator.menu().is_open());
        assert_eq!(orchestrator.menu().focus(), MenuFocus::Trigger);
        assert_eq!(orchestrator.in_flight(), None);
    }

    #[test]
    fn test_capture_failure_writes_nothing() {
        let dir = tempdir().unwrap();
        let mut orchestrator = ExportOrchestrator::new(dir.path());
        let job = orchestrator.begin(ExportFormat::Pdf, snapshot(), "A").unwrap();
        let backend = ExportBackend {
            capture: Arc::new(FailingCapture),
            assembly: Arc::new(PdfAssembler::default()),
        };
        assert!(matches!(run_export(&job, &backend), Err(ExportError::Capture(_))));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_png_export_writes_decodable_file() {
        let dir = tempdir().unwrap();
        let mut orchestrator = ExportOrchestrator::new(dir.path());
        let job = orchestrator.begin(ExportFormat::Png, snapshot(), "notes").unwrap();
        let backend = ExportBackend {
            capture: Arc::new(SolidCapture),
            assembly: Arc::new(PdfAssembler::default()),
        };
        let path = run_export(&job, &backend).unwrap();
        assert_eq!(path, dir.path().join("notes.png"));

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_default_backend_exports_real_document() {
        let dir = tempdir().unwrap();
        let doc = parse("# Heading\n\nSome text\n\n```rust\nfn main() {}\n```");
        let mut orchestrator = ExportOrchestrator::new(dir.path());
        let job = orchestrator
            .begin(
                ExportFormat::Pdf,
                PaneSnapshot::from_document(&doc, Theme::Dark.palette()),
                "doc",
            )
            .unwrap();
        let path = run_export(&job, &ExportBackend::default()).unwrap();
        let bytes = fs::read(path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
