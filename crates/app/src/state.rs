use crate::utils;
use anyhow::{Context, Result};
use composer::{Dispatcher, GenerationTicket, SessionEvent, SessionUpdate, WritingState};
use eframe::egui;
use shared::settings::AppSettings;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Main application state
pub struct AppState {
    pub settings: AppSettings,
    pub writing: WritingState,
    dispatcher: Arc<Dispatcher>,
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,

    // Settings window
    pub show_settings: bool,
    pub api_key_draft: String,
    pub model_draft: String,

    /// One-line status shown in the footer
    pub notice: Option<String>,
}

impl AppState {
    pub fn new(settings: AppSettings) -> Result<Self> {
        let dispatcher = utils::build_dispatcher(&settings)?;
        Ok(Self::with_dispatcher(settings, Arc::new(dispatcher)))
    }

    pub fn with_dispatcher(settings: AppSettings, dispatcher: Arc<Dispatcher>) -> Self {
        let (events_tx, events_rx) = channel();
        Self {
            writing: WritingState::new(settings.default_mode),
            settings,
            dispatcher,
            events_tx,
            events_rx,
            show_settings: false,
            api_key_draft: String::new(),
            model_draft: String::new(),
            notice: None,
        }
    }

    /// Drain progress from background generations.
    pub fn poll_generation(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.writing.apply(event);
        }
    }

    pub fn start_generation(&mut self, ctx: &egui::Context) {
        let Some(ticket) = self.writing.begin_generation() else {
            return;
        };
        self.notice = None;
        spawn_generation(
            self.dispatcher.clone(),
            ticket,
            self.events_tx.clone(),
            ctx.clone(),
        );
    }

    pub fn copy_output(&mut self) {
        if !self.writing.can_copy() {
            return;
        }
        match copy_to_clipboard(self.writing.output_text()) {
            Ok(()) => self.notice = Some("Copied to clipboard".into()),
            Err(e) => {
                warn!(error = %e, "clipboard copy failed");
                self.notice = Some(format!("Copy failed: {e}"));
            }
        }
    }

    pub fn open_settings(&mut self) {
        self.api_key_draft = self
            .settings
            .model
            .gemini_auth
            .api_key
            .clone()
            .unwrap_or_default();
        self.model_draft = self.settings.model.gemini_model.clone();
        self.show_settings = true;
    }

    /// Persist the settings window drafts and switch to a dispatcher built
    /// from them. A generation already running keeps its old dispatcher.
    pub fn apply_settings(&mut self) -> Result<()> {
        let settings = self.drafted_settings();
        let dispatcher = utils::build_dispatcher(&settings)?;
        utils::save_settings(&settings)?;
        info!(model = %settings.model.gemini_model, "settings applied");
        self.dispatcher = Arc::new(dispatcher);
        self.settings = settings;
        Ok(())
    }

    fn drafted_settings(&self) -> AppSettings {
        let mut settings = self.settings.clone();
        let key = self.api_key_draft.trim();
        settings.model.gemini_auth.api_key = (!key.is_empty()).then(|| key.to_string());
        let model = self.model_draft.trim();
        if !model.is_empty() {
            settings.model.gemini_model = model.to_string();
        }
        settings.default_mode = self.writing.mode();
        settings
    }
}

/// Run one generation on a worker thread, reporting progress through `tx`.
pub fn spawn_generation(
    dispatcher: Arc<Dispatcher>,
    ticket: GenerationTicket,
    tx: Sender<SessionEvent>,
    ctx: egui::Context,
) {
    std::thread::spawn(move || {
        let session_id = ticket.session_id;
        let send = |update: SessionUpdate| {
            // The UI may have shut down; nothing left to notify.
            let _ = tx.send(SessionEvent::new(session_id, update));
            ctx.request_repaint();
        };

        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                error!(error = %e, "failed to start async runtime");
                send(SessionUpdate::Failed(composer::FAILURE_MESSAGE.to_string()));
                return;
            }
        };

        let result = rt.block_on(dispatcher.generate(&ticket.input, ticket.mode, |snapshot| {
            send(SessionUpdate::Snapshot(snapshot.to_string()))
        }));

        match result {
            Ok(text) => send(SessionUpdate::Completed(text)),
            Err(e) => send(SessionUpdate::Failed(e.to_string())),
        }
    });
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;
    clipboard
        .set_text(text.to_string())
        .context("failed to set clipboard text")?;
    Ok(())
}
