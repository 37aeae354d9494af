//! Terminal UI components.
//!
//! - [`screen`]: Region geometry shared with mouse hit-testing
//! - [`viewport`]: Scroll position of the content pane
//! - [`style`]: Palette-driven styles

pub mod screen;
pub mod style;
pub mod viewport;

mod overlays;
mod render;
mod status;

pub use render::{header_buttons, render};

#[cfg(test)]
mod tests;
