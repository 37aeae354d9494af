use std::io::stdout;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, update};

/// Poll interval while a fetch or export is outstanding.
const BUSY_POLL: Duration = Duration::from_millis(50);
const IDLE_POLL: Duration = Duration::from_millis(250);

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialised or an I/O
    /// error occurs while reading events or drawing.
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = ratatui::try_init()
            .context("failed to initialize terminal; notedeck needs an interactive terminal")?;
        let result = execute!(stdout(), EnableMouseCapture, EnableFocusChange)
            .context("failed to enable mouse capture")
            .and_then(|()| {
                let size = terminal.size()?;
                let mut model = self.initial_model((size.width, size.height));
                model.request_render();
                self.event_loop(&mut terminal, model)
            });

        let _ = execute!(stdout(), DisableFocusChange, DisableMouseCapture);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal, mut model: Model) -> Result<()> {
        let start = Instant::now();
        let (tx, rx) = mpsc::channel();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut needs_render = true;

        loop {
            for effect in model.take_effects() {
                self.execute(effect, &tx);
            }

            while let Ok(msg) = rx.try_recv() {
                model = update(model, msg);
                needs_render = true;
            }

            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                tracing::debug!(width, height, "terminal resized");
                model = update(model, Message::Resize(width, height));
                needs_render = true;
            }

            if needs_render {
                terminal.draw(|frame| crate::ui::render(&model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }

            let poll = if model.pipeline.is_busy()
                || model.export.in_flight().is_some()
                || resize_debouncer.is_pending()
            {
                BUSY_POLL
            } else {
                IDLE_POLL
            };
            if event::poll(poll)? {
                // Drain queued input so key repeat renders once.
                loop {
                    let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    let event = event::read()?;
                    if let Some(msg) =
                        Self::handle_event(&event, &model, event_ms, &mut resize_debouncer)
                    {
                        tracing::trace!(?msg, "input");
                        model = update(model, msg);
                        needs_render = true;
                    }
                    if !event::poll(Duration::ZERO)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}
