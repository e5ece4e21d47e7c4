mod documents;
mod generator;
mod hub;
mod key_input;
mod landing;
mod navigation;
pub mod router;
mod templates;
#[path = "text-input.rs"]
mod text_input;
mod types;

pub use documents::DOCUMENTS;
pub use generator::{GeneratorField, GeneratorForm};
pub use hub::{HUB_ITEMS, HubAction};
pub use landing::{LANDING_BLOCKS, LANDING_NAV};
pub use navigation::Navigable;
pub use router::{AppView, LandingSection, Screen, ScrollTarget, ViewRouter};
pub use templates::templates_for;
pub use text_input::TextInput;
pub use types::*;

use crate::config::Config;
use crate::models::GenerationMode;
use crate::services::clipboard::ClipboardService;
use crate::services::gemini::GeminiClient;
use crate::services::key_selection::{ApiCredential, DialogKeySelector, KeyRequest};
use crate::services::{GenerationService, PollPolicy};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Events from generation tasks on the runtime
#[derive(Debug)]
pub enum GenerationEvent {
    Progress { request: u64, message: String },
    Finished { request: u64, outcome: GenerationOutcome },
    Saved(PathBuf),
    SaveFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Image(String),
    Video(String),
    Failed(String),
    Cancelled,
}

/// The request currently allowed to update the generator
#[derive(Debug)]
pub struct InFlight {
    pub request: u64,
    pub cancel: CancellationToken,
}

/// Main application state
pub struct App {
    pub router: ViewRouter,
    pub should_quit: bool,
    pub config: Config,
    /// Where key changes are persisted. `None` keeps them in memory.
    pub config_path: Option<PathBuf>,
    pub credential: ApiCredential,

    pub landing_scroll: u16,
    pub landing_nav_index: usize,
    pub hub_selected_index: usize,
    pub template_filter: Option<GenerationMode>,
    pub template_selected_index: usize,
    pub document_selected_index: usize,
    pub document_scroll: u16,

    pub generator: GeneratorForm,
    pub generation: GenerationState,
    pub in_flight: Option<InFlight>,
    next_request_id: u64,

    pub key_dialog_open: bool,
    pub key_input: TextInput,
    pub pending_key_request: Option<KeyRequest>,

    pub status_toast: Option<StatusToast>,
    pub clipboard_service: ClipboardService,
    pub loading_frame: u8,
    pub last_loading_tick: Option<Instant>,

    runtime: Option<tokio::runtime::Runtime>,
    client: Option<GeminiClient>,
    service: Option<GenerationService>,
    root_cancel: CancellationToken,
    event_tx: Sender<GenerationEvent>,
    event_rx: Receiver<GenerationEvent>,
    key_rx: Option<Receiver<KeyRequest>>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Creates the UI state. Services are attached by [`App::init_services`].
    pub fn new() -> Self {
        let (event_tx, event_rx) = channel();
        let config = Config::default();
        let mode = GenerationMode::Image;

        Self {
            router: ViewRouter::new(),
            should_quit: false,
            generator: GeneratorForm::new(mode, "", &config.generation.image_model),
            config,
            config_path: None,
            credential: ApiCredential::default(),
            landing_scroll: 0,
            landing_nav_index: 0,
            hub_selected_index: 0,
            template_filter: None,
            template_selected_index: 0,
            document_selected_index: 0,
            document_scroll: 0,
            generation: GenerationState::new(mode),
            in_flight: None,
            next_request_id: 1,
            key_dialog_open: false,
            key_input: TextInput::new(),
            pending_key_request: None,
            status_toast: None,
            clipboard_service: ClipboardService::new(),
            loading_frame: 0,
            last_loading_tick: None,
            runtime: None,
            client: None,
            service: None,
            root_cancel: CancellationToken::new(),
            event_tx,
            event_rx,
            key_rx: None,
        }
    }

    /// Builds the runtime, the upstream client and the generation service.
    pub fn init_services(&mut self, config: &Config) {
        self.config = config.clone();
        self.config_path = Config::config_path().ok();
        self.credential.set(config.api_key());
        if !self.credential.is_set() {
            tracing::warn!("no API key configured yet");
        }

        match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("shotcraft-gen")
            .enable_all()
            .build()
        {
            Ok(runtime) => self.runtime = Some(runtime),
            Err(error) => tracing::error!(error = %error, "could not start async runtime"),
        }

        match GeminiClient::new(
            config.gemini.base_url.clone(),
            self.credential.clone(),
            config.request_timeout(),
        ) {
            Ok(client) => {
                let (key_tx, key_rx) = channel();
                let selector = DialogKeySelector::new(self.credential.clone(), key_tx);
                let service = GenerationService::new(
                    Arc::new(client.clone()),
                    self.credential.clone(),
                    PollPolicy::from(&config.generation),
                )
                .with_key_selector(Arc::new(selector));
                self.key_rx = Some(key_rx);
                self.service = Some(service);
                self.client = Some(client);
            }
            Err(error) => tracing::error!(error = %error, "could not build HTTP client"),
        }

        let mode = self.router.last_mode();
        self.enter_generator(mode, "");
        tracing::info!(base_url = %config.gemini.base_url, "services ready");
    }

    /// Drains key requests and generation events. Called once per frame.
    pub fn check_generation_events(&mut self) {
        let key_request = self.key_rx.as_ref().and_then(|rx| rx.try_recv().ok());
        if let Some(request) = key_request {
            tracing::info!("generation is waiting for an API key");
            self.open_key_dialog(Some(request));
        }

        while let Ok(event) = self.event_rx.try_recv() {
            self.apply_generation_event(event);
        }
    }

    // ---- navigation ----

    pub fn start(&mut self) {
        self.route(ViewRouter::start);
    }

    pub fn select_tool(&mut self, mode: GenerationMode) {
        self.route(|router| router.select_tool(mode));
    }

    pub fn select_template(&mut self, mode: GenerationMode, prompt: &str) {
        self.route(|router| router.select_template(mode, prompt));
    }

    pub fn navigate(&mut self, screen: Screen, section: Option<LandingSection>) {
        self.route(|router| router.navigate(screen, section));
    }

    pub fn back(&mut self) {
        self.route(ViewRouter::back);
    }

    /// Tool and studio jumps offered on the catalog screens.
    /// Returns whether `key` was one of them.
    pub fn catalog_shortcut(&mut self, key: char) -> bool {
        match key {
            'i' => self.select_tool(GenerationMode::Image),
            'v' => self.select_tool(GenerationMode::Video),
            's' => self.navigate(Screen::Hub, None),
            _ => return false,
        }
        true
    }

    fn route(&mut self, transition: impl FnOnce(&mut ViewRouter)) {
        let before = self.router.screen();
        transition(&mut self.router);
        if before == Screen::Generator {
            self.cancel_generation();
        }
        if let AppView::Generator { mode, prompt } = self.router.view().clone() {
            self.enter_generator(mode, &prompt);
        }
    }

    /// Applies the router's owed scroll once it is due.
    pub fn apply_due_scroll(&mut self, now: Instant) {
        match self.router.take_due_scroll(now) {
            Some(ScrollTarget::Top) => {
                self.landing_scroll = 0;
                self.document_scroll = 0;
            }
            Some(ScrollTarget::Section(section)) => {
                self.landing_scroll = landing::section_offset(section);
            }
            None => {}
        }
    }

    // ---- status ----

    pub fn show_status_toast(&mut self, message: impl Into<String>) {
        self.status_toast = Some(StatusToast::new(message));
    }

    pub fn clear_expired_status_toast(&mut self) {
        let should_clear = self
            .status_toast
            .as_ref()
            .is_some_and(|toast| toast.is_expired(Duration::from_secs(3)));
        if should_clear {
            self.status_toast = None;
        }
    }

    #[must_use]
    pub fn status_toast_message(&self) -> Option<&str> {
        self.status_toast.as_ref().map(|toast| toast.message.as_str())
    }

    /// Stops every background task.
    pub fn shutdown(&mut self) {
        self.root_cancel.cancel();
        self.close_key_dialog();
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_timeout(Duration::from_millis(500));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_navigation_scrolls_after_delay() {
        let mut app = App::new();
        app.landing_scroll = 3;
        app.navigate(Screen::Landing, Some(LandingSection::Pricing));

        app.apply_due_scroll(Instant::now());
        assert_eq!(app.landing_scroll, 3);

        app.apply_due_scroll(Instant::now() + router::SECTION_SCROLL_DELAY);
        assert_eq!(
            app.landing_scroll,
            landing::section_offset(LandingSection::Pricing)
        );
    }

    #[test]
    fn test_plain_navigation_scrolls_to_top() {
        let mut app = App::new();
        app.landing_scroll = 9;
        app.document_scroll = 4;
        app.start();
        app.apply_due_scroll(Instant::now());
        assert_eq!(app.landing_scroll, 0);
        assert_eq!(app.document_scroll, 0);
    }

    #[test]
    fn test_tool_select_resets_prompt() {
        let mut app = App::new();
        app.select_template(GenerationMode::Image, "old prompt");
        app.back();
        app.select_tool(GenerationMode::Image);
        assert!(app.generator.prompt.is_empty());
    }

    #[test]
    fn test_key_request_opens_dialog() {
        let mut app = App::new();
        let (key_tx, key_rx) = channel();
        app.key_rx = Some(key_rx);
        let (responder, _answer) = tokio::sync::oneshot::channel();
        key_tx.send(KeyRequest { responder }).unwrap();

        app.check_generation_events();
        assert!(app.key_dialog_open);
        assert!(app.pending_key_request.is_some());
    }

    #[test]
    fn test_events_flow_through_channel() {
        let mut app = App::new();
        app.select_tool(GenerationMode::Image);
        app.in_flight = Some(InFlight {
            request: 42,
            cancel: CancellationToken::new(),
        });
        app.generation.begin("lamp");
        app.event_tx
            .send(GenerationEvent::Finished {
                request: 42,
                outcome: GenerationOutcome::Failed("quota exceeded".to_string()),
            })
            .unwrap();

        app.check_generation_events();
        assert_eq!(app.generation.error.as_deref(), Some("quota exceeded"));
    }
}
