// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. export::ExportJob)
    clippy::module_name_repetitions
)]

//! # notedeck
//!
//! A terminal viewer for a fixed, ordered deck of markdown notes.
//!
//! notedeck shows one document at a time next to a sidebar listing the deck:
//! - Previous/next paging and a filterable sidebar
//! - Syntax-highlighted code blocks and horizontally scrollable tables
//! - Light and dark themes, remembered between runs
//! - A resizable sidebar, remembered between runs
//! - Export of the content pane as PNG or paginated PDF
//!
//! ## Architecture
//!
//! notedeck uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions that request I/O as effects
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`catalog`]: The ordered deck of documents
//! - [`navigation`]: Current selection and paging
//! - [`pipeline`]: Fetching documents and discarding superseded renders
//! - [`document`]: Markdown parsing and rendering
//! - [`highlight`]: Syntax highlighting
//! - [`layout`]: Sidebar width and divider dragging
//! - [`theme`]: Light/dark palettes
//! - [`prefs`]: Persisted preferences
//! - [`export`]: PNG and PDF export
//! - [`ui`]: Terminal UI components
//! - [`config`]: Saved command-line defaults

pub mod app;
pub mod catalog;
pub mod config;
pub mod document;
pub mod export;
pub mod highlight;
pub mod layout;
pub mod navigation;
pub mod pipeline;
pub mod prefs;
pub mod theme;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::catalog::Catalog;
    pub use crate::document::Document;
    pub use crate::ui::viewport::Viewport;
}
