use std::sync::Arc;
use std::sync::mpsc::Sender;

use crate::app::{App, Effect, Message, Preference};
use crate::export::{ExportCompletion, ExportError, spawn_export};
use crate::pipeline::{FetchCompletion, FetchError, spawn_fetch};

impl App {
    /// Carry out one effect. Worker results come back on `tx`.
    pub(super) fn execute(&mut self, effect: Effect, tx: &Sender<Message>) {
        match effect {
            Effect::Fetch(request) => {
                let done = tx.clone();
                let fallback = request.clone();
                let spawned = spawn_fetch(Arc::clone(&self.fetcher), request, move |completion| {
                    let _ = done.send(Message::FetchCompleted(completion));
                });
                if let Err(err) = spawned {
                    tracing::error!(%err, identifier = %fallback.identifier, "failed to start fetch worker");
                    let result = Err(FetchError::Io {
                        identifier: fallback.identifier.clone(),
                        message: err.to_string(),
                    });
                    let _ = tx.send(Message::FetchCompleted(FetchCompletion {
                        request: fallback,
                        result,
                    }));
                }
            }
            Effect::Persist(Preference::Theme(theme)) => self.preferences.set_theme(theme),
            Effect::Persist(Preference::SidebarWidth(width)) => {
                self.preferences.set_sidebar_width(width);
            }
            Effect::Export(job) => {
                let format = job.format;
                tracing::info!(?format, destination = %job.destination().display(), "export started");
                let done = tx.clone();
                let spawned = spawn_export(job, self.export_backend.clone(), move |completion| {
                    let _ = done.send(Message::ExportFinished(completion));
                });
                if let Err(err) = spawned {
                    let _ = tx.send(Message::ExportFinished(ExportCompletion {
                        format,
                        result: Err(ExportError::Capture(format!(
                            "worker failed to start: {err}"
                        ))),
                    }));
                }
            }
        }
    }
}
