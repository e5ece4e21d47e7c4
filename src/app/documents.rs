use crate::app::{App, Navigable};
use crate::models::{self, GenerationMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentBody {
    Text(&'static str),
    /// Rendered from the model registry.
    ModelReference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document {
    pub title: &'static str,
    pub summary: &'static str,
    pub body: DocumentBody,
}

impl Document {
    #[must_use]
    pub fn text(&self) -> String {
        match self.body {
            DocumentBody::Text(text) => text.to_string(),
            DocumentBody::ModelReference => model_reference(),
        }
    }
}

pub static DOCUMENTS: &[Document] = &[
    Document {
        title: "Getting started",
        summary: "From product photo to finished shot",
        body: DocumentBody::Text(
            "1. Open the studio and pick the image or video tool.\n\
             2. Attach a product photo (PNG, JPEG or WebP) by typing its path.\n\
             3. Describe the scene you want around the product.\n\
             4. Pick a model, aspect ratio and resolution, then press Ctrl+G.\n\
             5. Save the result with Ctrl+S or copy its link with Ctrl+Y.\n\n\
             Image models that support an input image keep the product as is and\n\
             replace the background and lighting. Imagen ignores the photo and\n\
             generates purely from your text.",
        ),
    },
    Document {
        title: "API keys",
        summary: "Where the studio finds your key",
        body: DocumentBody::Text(
            "The key is read from the API_KEY environment variable, then\n\
             GEMINI_API_KEY, then the api_key entry in the [gemini] section of\n\
             config.toml. Press Ctrl+K anywhere to enter a key; it is saved to\n\
             the config file.\n\n\
             Video models need a key with access to Veo. If the service reports\n\
             that the requested entity was not found, the key dialog opens so you\n\
             can choose a different key. Retry the generation afterwards.",
        ),
    },
    Document {
        title: "Video jobs",
        summary: "How long-running renders work",
        body: DocumentBody::Text(
            "Video generation always starts from a product photo. The job is\n\
             submitted once and its status is checked every few seconds until it\n\
             is done. Esc or navigating away cancels the wait.\n\n\
             The poll interval, the maximum number of status checks and the\n\
             number of tolerated connection failures are set in the\n\
             [generation] section of config.toml.",
        ),
    },
    Document {
        title: "Prompt writing",
        summary: "Describe the scene, not the product",
        body: DocumentBody::Text(
            "Your prompt is wrapped in a photography (or commercial) brief, so\n\
             focus on setting, light and mood: surface, background, time of day,\n\
             colour palette. For video, add camera motion such as an orbit, a\n\
             push-in or a slow pan. The Templates screen has starting points.",
        ),
    },
    Document {
        title: "Model reference",
        summary: "Every model and what it supports",
        body: DocumentBody::ModelReference,
    },
];

fn flag(enabled: bool) -> &'static str {
    if enabled { "yes" } else { "-" }
}

/// Table of the registry, one block per mode.
#[must_use]
pub fn model_reference() -> String {
    let mut text = String::new();
    for mode in [GenerationMode::Image, GenerationMode::Video] {
        text.push_str(&format!("{} models\n\n", mode.label()));
        text.push_str(&format!(
            "  {:<32} {:<7} {:<7} {:<7} {:<7}\n",
            "id", "aspect", "res", "batch", "photo"
        ));
        for model in models::models_for_mode(mode) {
            let caps = model.capabilities;
            text.push_str(&format!(
                "  {:<32} {:<7} {:<7} {:<7} {:<7}\n",
                model.id,
                model.default_aspect_ratio,
                flag(caps.supports_resolution),
                flag(caps.supports_quantity),
                flag(caps.supports_input_image),
            ));
        }
        text.push('\n');
    }
    text
}

pub struct DocumentNavigable<'a> {
    app: &'a mut App,
}

impl<'a> DocumentNavigable<'a> {
    pub fn new(app: &'a mut App) -> Self {
        Self { app }
    }
}

impl<'a> Navigable for DocumentNavigable<'a> {
    fn get_item_count(&self) -> usize {
        DOCUMENTS.len()
    }

    fn get_selected_index(&self) -> usize {
        self.app.document_selected_index
    }

    fn set_selected_index(&mut self, index: usize) {
        self.app.document_selected_index = index;
        self.app.document_scroll = 0;
    }
}

impl App {
    pub fn next_document(&mut self) {
        DocumentNavigable::new(self).next_item();
    }

    pub fn previous_document(&mut self) {
        DocumentNavigable::new(self).previous_item();
    }

    #[must_use]
    pub fn selected_document(&self) -> Option<&'static Document> {
        DOCUMENTS.get(self.document_selected_index)
    }

    pub fn scroll_document(&mut self, delta: i32) {
        let lines = self
            .selected_document()
            .map_or(0, |document| document.text().lines().count());
        let max = i32::try_from(lines).unwrap_or(i32::MAX).saturating_sub(1).max(0);
        let next = i32::from(self.document_scroll).saturating_add(delta);
        self.document_scroll = u16::try_from(next.clamp(0, max)).unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppView, Screen};

    #[test]
    fn test_model_reference_lists_every_model() {
        let reference = model_reference();
        for model in models::AVAILABLE_MODELS {
            assert!(reference.contains(model.id), "{}", model.id);
        }
        assert!(reference.contains("Image models"));
        assert!(reference.contains("Video models"));
    }

    #[test]
    fn test_documents_reach_generator_and_studio() {
        let mut app = App::new();
        app.navigate(Screen::Documents, None);
        assert!(app.catalog_shortcut('i'));
        assert_eq!(
            app.router.view(),
            &AppView::Generator {
                mode: GenerationMode::Image,
                prompt: String::new(),
            }
        );
        assert_eq!(app.generator.mode, GenerationMode::Image);

        app.navigate(Screen::Documents, None);
        assert!(app.catalog_shortcut('s'));
        assert_eq!(app.router.view(), &AppView::Hub);
    }

    #[test]
    fn test_reference_document_is_generated() {
        let document = DOCUMENTS
            .iter()
            .find(|document| document.body == DocumentBody::ModelReference)
            .unwrap();
        assert!(document.text().contains("imagen-4.0-generate-001"));
    }
}
