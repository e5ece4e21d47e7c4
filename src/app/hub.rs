use crate::app::router::Screen;
use crate::app::{App, Navigable};
use crate::models::GenerationMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubAction {
    Tool(GenerationMode),
    Open(Screen),
}

pub struct HubItem {
    pub title: &'static str,
    pub description: &'static str,
    pub action: HubAction,
}

pub static HUB_ITEMS: &[HubItem] = &[
    HubItem {
        title: "Image Studio",
        description: "Restage a product photo or generate a scene from text",
        action: HubAction::Tool(GenerationMode::Image),
    },
    HubItem {
        title: "Video Studio",
        description: "Turn a product photo into a short commercial",
        action: HubAction::Tool(GenerationMode::Video),
    },
    HubItem {
        title: "Templates",
        description: "Start from a proven prompt",
        action: HubAction::Open(Screen::Templates),
    },
    HubItem {
        title: "Documents",
        description: "Guides and the model reference",
        action: HubAction::Open(Screen::Documents),
    },
];

pub struct HubNavigable<'a> {
    app: &'a mut App,
}

impl<'a> HubNavigable<'a> {
    pub fn new(app: &'a mut App) -> Self {
        Self { app }
    }
}

impl<'a> Navigable for HubNavigable<'a> {
    fn get_item_count(&self) -> usize {
        HUB_ITEMS.len()
    }

    fn get_selected_index(&self) -> usize {
        self.app.hub_selected_index
    }

    fn set_selected_index(&mut self, index: usize) {
        self.app.hub_selected_index = index;
    }
}

impl App {
    pub fn next_hub_item(&mut self) {
        HubNavigable::new(self).next_item();
    }

    pub fn previous_hub_item(&mut self) {
        HubNavigable::new(self).previous_item();
    }

    pub fn activate_hub_item(&mut self) {
        let Some(item) = HUB_ITEMS.get(self.hub_selected_index) else {
            return;
        };
        match item.action {
            HubAction::Tool(mode) => self.select_tool(mode),
            HubAction::Open(screen) => self.navigate(screen, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppView;

    #[test]
    fn test_tools_open_generator_with_empty_prompt() {
        for (index, mode) in [(0, GenerationMode::Image), (1, GenerationMode::Video)] {
            let mut app = App::new();
            app.select_template(mode.toggled(), "leftover prompt");
            app.navigate(Screen::Hub, None);
            app.hub_selected_index = index;

            app.activate_hub_item();
            assert_eq!(
                app.router.view(),
                &AppView::Generator {
                    mode,
                    prompt: String::new(),
                }
            );
            assert!(app.generator.prompt.is_empty());
            assert_eq!(app.generator.mode, mode);
        }
    }

    #[test]
    fn test_guides_open_their_screens() {
        let mut app = App::new();
        app.navigate(Screen::Hub, None);
        app.next_hub_item();
        app.next_hub_item();
        app.activate_hub_item();
        assert_eq!(app.router.view(), &AppView::Templates);

        app.navigate(Screen::Hub, None);
        app.hub_selected_index = 3;
        app.activate_hub_item();
        assert_eq!(app.router.view(), &AppView::Documents);
    }
}
