//! Document fetch and render sequencing.
//!
//! Every selection takes a fresh token. Fetches run on worker threads and
//! may finish in any order; only the completion carrying the latest token
//! is allowed to touch the content pane or the busy flag.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::thread;

use thiserror::Error;

use crate::catalog::DocumentRef;

/// Monotonic request identifier. Larger tokens supersede smaller ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RenderToken(u64);

impl RenderToken {
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// One fetch-and-render attempt for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub token: RenderToken,
    pub identifier: String,
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    Idle,
    Loading,
    Committed,
    Failed,
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{identifier} lies outside the document root")]
    OutsideRoot { identifier: String },
    #[error("failed to read {identifier}: {message}")]
    Io { identifier: String, message: String },
}

/// Result of a fetch, tagged with the request that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCompletion {
    pub request: RenderRequest,
    pub result: Result<String, FetchError>,
}

/// Retrieves raw markup for an identifier.
pub trait ContentFetcher: Send + Sync {
    /// Fetch the text of `identifier`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be retrieved.
    fn fetch(&self, identifier: &str) -> Result<String, FetchError>;
}

/// Reads documents from a directory. Identifiers are paths relative to it.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, identifier: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(identifier);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(FetchError::OutsideRoot {
                identifier: identifier.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl ContentFetcher for FsFetcher {
    fn fetch(&self, identifier: &str) -> Result<String, FetchError> {
        let path = self.resolve(identifier)?;
        std::fs::read_to_string(&path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(identifier.to_string())
            } else {
                FetchError::Io {
                    identifier: identifier.to_string(),
                    message: err.to_string(),
                }
            }
        })
    }
}

/// Run `request` on a worker thread and hand the completion to `on_done`.
///
/// # Errors
///
/// Returns an error if the worker thread cannot be spawned.
pub fn spawn_fetch<F>(
    fetcher: Arc<dyn ContentFetcher>,
    request: RenderRequest,
    on_done: F,
) -> std::io::Result<thread::JoinHandle<()>>
where
    F: FnOnce(FetchCompletion) + Send + 'static,
{
    thread::Builder::new()
        .name(format!("fetch-{}", request.token.value()))
        .spawn(move || {
            let result = fetcher.fetch(&request.identifier);
            tracing::debug!(
                token = request.token.value(),
                identifier = %request.identifier,
                ok = result.is_ok(),
                "fetch finished"
            );
            on_done(FetchCompletion { request, result });
        })
}

/// Token counter plus the busy indicator it guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPipeline {
    counter: u64,
    busy: bool,
    phase: RenderPhase,
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPipeline {
    pub const fn new() -> Self {
        Self {
            counter: 0,
            busy: false,
            phase: RenderPhase::Idle,
        }
    }

    /// Start a render of `document`, superseding any request in flight.
    pub fn request(&mut self, document: &DocumentRef) -> RenderRequest {
        self.counter += 1;
        self.busy = true;
        self.phase = RenderPhase::Loading;
        RenderRequest {
            token: RenderToken(self.counter),
            identifier: document.identifier().to_string(),
            position: document.position(),
        }
    }

    pub const fn is_live(&self, token: RenderToken) -> bool {
        token.0 == self.counter
    }

    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    pub const fn phase(&self) -> RenderPhase {
        self.phase
    }

    /// Resolve a finished fetch. Stale requests leave all state untouched.
    pub fn settle(&mut self, request: &RenderRequest, fetch_ok: bool) -> RenderPhase {
        if !self.is_live(request.token) {
            tracing::debug!(
                token = request.token.value(),
                latest = self.counter,
                "discarding superseded render"
            );
            return RenderPhase::Superseded;
        }
        self.busy = false;
        self.phase = if fetch_ok {
            RenderPhase::Committed
        } else {
            RenderPhase::Failed
        };
        self.phase
    }
}
