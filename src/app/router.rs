//! Which screen is showing, and how the user moves between them.

use crate::models::GenerationMode;
use std::time::{Duration, Instant};

/// Anchored scrolls wait this long so the landing layout can settle first.
pub const SECTION_SCROLL_DELAY: Duration = Duration::from_millis(100);

/// The active screen, with the generator carrying its launch payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppView {
    Landing,
    Hub,
    Generator { mode: GenerationMode, prompt: String },
    Templates,
    Documents,
}

impl AppView {
    #[must_use]
    pub fn screen(&self) -> Screen {
        match self {
            AppView::Landing => Screen::Landing,
            AppView::Hub => Screen::Hub,
            AppView::Generator { .. } => Screen::Generator,
            AppView::Templates => Screen::Templates,
            AppView::Documents => Screen::Documents,
        }
    }
}

/// Navigation target without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Hub,
    Generator,
    Templates,
    Documents,
}

impl Screen {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Screen::Landing => "HOME",
            Screen::Hub => "STUDIO",
            Screen::Generator => "GENERATOR",
            Screen::Templates => "TEMPLATES",
            Screen::Documents => "DOCS",
        }
    }
}

/// Named anchors on the landing screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingSection {
    Features,
    Pricing,
}

impl LandingSection {
    #[must_use]
    pub fn anchor(self) -> &'static str {
        match self {
            LandingSection::Features => "features",
            LandingSection::Pricing => "pricing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    Top,
    Section(LandingSection),
}

#[derive(Debug, Clone, Copy)]
struct PendingScroll {
    target: ScrollTarget,
    due_at: Instant,
}

/// Holds the current view and the scroll it still owes the screen.
#[derive(Debug)]
pub struct ViewRouter {
    view: AppView,
    last_mode: GenerationMode,
    pending_scroll: Option<PendingScroll>,
}

impl Default for ViewRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRouter {
    pub fn new() -> Self {
        Self {
            view: AppView::Landing,
            last_mode: GenerationMode::Image,
            pending_scroll: None,
        }
    }

    pub fn view(&self) -> &AppView {
        &self.view
    }

    pub fn screen(&self) -> Screen {
        self.view.screen()
    }

    /// Mode the generator reopens with when no tool was picked.
    pub fn last_mode(&self) -> GenerationMode {
        self.last_mode
    }

    /// Landing "get started" action.
    pub fn start(&mut self) {
        self.set_view(AppView::Hub);
    }

    pub fn select_tool(&mut self, mode: GenerationMode) {
        self.open_generator(mode, String::new());
    }

    pub fn select_template(&mut self, mode: GenerationMode, prompt: impl Into<String>) {
        self.open_generator(mode, prompt.into());
    }

    /// Header navigation. A section only applies to the landing screen.
    pub fn navigate(&mut self, screen: Screen, section: Option<LandingSection>) {
        match (screen, section) {
            (Screen::Landing, Some(section)) => {
                self.view = AppView::Landing;
                self.pending_scroll = Some(PendingScroll {
                    target: ScrollTarget::Section(section),
                    due_at: Instant::now() + SECTION_SCROLL_DELAY,
                });
            }
            (Screen::Landing, None) => self.set_view(AppView::Landing),
            (Screen::Hub, _) => self.set_view(AppView::Hub),
            (Screen::Templates, _) => self.set_view(AppView::Templates),
            (Screen::Documents, _) => self.set_view(AppView::Documents),
            (Screen::Generator, _) => self.open_generator(self.last_mode, String::new()),
        }
    }

    pub fn back(&mut self) {
        let target = match self.view {
            AppView::Generator { .. } => AppView::Hub,
            AppView::Landing | AppView::Hub | AppView::Templates | AppView::Documents => {
                AppView::Landing
            }
        };
        self.set_view(target);
    }

    /// Switches the open generator to the other media type.
    pub fn set_generator_mode(&mut self, new_mode: GenerationMode) {
        if let AppView::Generator { mode, .. } = &mut self.view {
            *mode = new_mode;
            self.last_mode = new_mode;
        }
    }

    /// Returns the owed scroll once it is due.
    pub fn take_due_scroll(&mut self, now: Instant) -> Option<ScrollTarget> {
        let pending = self.pending_scroll?;
        if pending.due_at > now {
            return None;
        }
        self.pending_scroll = None;
        Some(pending.target)
    }

    fn open_generator(&mut self, mode: GenerationMode, prompt: String) {
        self.last_mode = mode;
        self.set_view(AppView::Generator { mode, prompt });
    }

    fn set_view(&mut self, view: AppView) {
        tracing::debug!(from = ?self.view.screen(), to = ?view.screen(), "view change");
        self.view = view;
        self.pending_scroll = Some(PendingScroll {
            target: ScrollTarget::Top,
            due_at: Instant::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_landing() {
        let router = ViewRouter::new();
        assert_eq!(router.view(), &AppView::Landing);
    }

    #[test]
    fn test_start_opens_hub_and_scrolls_to_top() {
        let mut router = ViewRouter::new();
        router.start();
        assert_eq!(router.view(), &AppView::Hub);
        assert_eq!(router.take_due_scroll(Instant::now()), Some(ScrollTarget::Top));
        assert_eq!(router.take_due_scroll(Instant::now()), None);
    }

    #[test]
    fn test_tool_and_template_payloads() {
        let mut router = ViewRouter::new();
        router.select_tool(GenerationMode::Video);
        assert_eq!(
            router.view(),
            &AppView::Generator {
                mode: GenerationMode::Video,
                prompt: String::new()
            }
        );

        router.select_template(GenerationMode::Image, "on a beach at dusk");
        assert_eq!(
            router.view(),
            &AppView::Generator {
                mode: GenerationMode::Image,
                prompt: "on a beach at dusk".to_string()
            }
        );
    }

    #[test]
    fn test_back_targets() {
        let mut router = ViewRouter::new();
        router.select_tool(GenerationMode::Image);
        router.back();
        assert_eq!(router.screen(), Screen::Hub);
        router.back();
        assert_eq!(router.screen(), Screen::Landing);

        for screen in [Screen::Templates, Screen::Documents] {
            router.navigate(screen, None);
            router.back();
            assert_eq!(router.screen(), Screen::Landing);
        }

        router.back();
        assert_eq!(router.screen(), Screen::Landing);
    }

    #[test]
    fn test_section_scroll_is_delayed() {
        let mut router = ViewRouter::new();
        router.navigate(Screen::Documents, None);
        let _ = router.take_due_scroll(Instant::now());

        router.navigate(Screen::Landing, Some(LandingSection::Pricing));
        assert_eq!(router.screen(), Screen::Landing);
        assert_eq!(router.take_due_scroll(Instant::now()), None);
        assert_eq!(
            router.take_due_scroll(Instant::now() + SECTION_SCROLL_DELAY),
            Some(ScrollTarget::Section(LandingSection::Pricing))
        );
    }

    #[test]
    fn test_navigate_to_generator_reuses_last_mode() {
        let mut router = ViewRouter::new();
        router.navigate(Screen::Generator, None);
        assert_eq!(
            router.view(),
            &AppView::Generator {
                mode: GenerationMode::Image,
                prompt: String::new()
            }
        );

        router.select_template(GenerationMode::Video, "orbit shot");
        router.navigate(Screen::Hub, None);
        router.navigate(Screen::Generator, None);
        assert_eq!(
            router.view(),
            &AppView::Generator {
                mode: GenerationMode::Video,
                prompt: String::new()
            }
        );
    }

    #[test]
    fn test_generator_mode_switch() {
        let mut router = ViewRouter::new();
        router.set_generator_mode(GenerationMode::Video);
        assert_eq!(router.last_mode(), GenerationMode::Image);

        router.select_tool(GenerationMode::Image);
        router.set_generator_mode(GenerationMode::Video);
        assert!(matches!(
            router.view(),
            AppView::Generator {
                mode: GenerationMode::Video,
                ..
            }
        ));
        assert_eq!(router.last_mode(), GenerationMode::Video);
    }
}
