use crate::app::{App, Navigable};
use crate::models::GenerationMode;

/// A ready-made prompt that opens the generator pre-filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub title: &'static str,
    pub category: &'static str,
    pub mode: GenerationMode,
    pub prompt: &'static str,
}

pub static TEMPLATES: &[Template] = &[
    Template {
        title: "Marble Countertop",
        category: "E-commerce",
        mode: GenerationMode::Image,
        prompt: "Placed on a white marble countertop, soft morning window light, minimal kitchen in the background",
    },
    Template {
        title: "Studio Seamless",
        category: "E-commerce",
        mode: GenerationMode::Image,
        prompt: "Centered on a seamless pastel backdrop, softbox lighting, gentle shadow beneath the product",
    },
    Template {
        title: "Beach at Golden Hour",
        category: "Lifestyle",
        mode: GenerationMode::Image,
        prompt: "Resting on warm sand at golden hour, turquoise waves out of focus behind it",
    },
    Template {
        title: "Forest Moss",
        category: "Lifestyle",
        mode: GenerationMode::Image,
        prompt: "Sitting on a mossy rock in a misty pine forest, dappled sunlight, fresh natural mood",
    },
    Template {
        title: "Neon City Night",
        category: "Social",
        mode: GenerationMode::Image,
        prompt: "On a wet street at night with pink and cyan neon reflections, cyberpunk atmosphere",
    },
    Template {
        title: "Holiday Gift Table",
        category: "Seasonal",
        mode: GenerationMode::Image,
        prompt: "On a festive table with wrapped gifts, pine branches and warm fairy lights",
    },
    Template {
        title: "360 Turntable",
        category: "E-commerce",
        mode: GenerationMode::Video,
        prompt: "The product slowly rotates on a turntable against a clean studio backdrop",
    },
    Template {
        title: "Hero Reveal",
        category: "Advertising",
        mode: GenerationMode::Video,
        prompt: "The camera pushes in from darkness as a rim light sweeps across the product",
    },
    Template {
        title: "Splash Moment",
        category: "Advertising",
        mode: GenerationMode::Video,
        prompt: "Water splashes around the product in slow motion, droplets catching the light",
    },
    Template {
        title: "Vertical Story",
        category: "Social",
        mode: GenerationMode::Video,
        prompt: "Handheld orbit around the product on a cafe table, lively background bokeh",
    },
];

/// Templates visible under the current filter
#[must_use]
pub fn templates_for(filter: Option<GenerationMode>) -> Vec<&'static Template> {
    TEMPLATES
        .iter()
        .filter(|template| filter.is_none_or(|mode| template.mode == mode))
        .collect()
}

pub struct TemplateNavigable<'a> {
    app: &'a mut App,
}

impl<'a> TemplateNavigable<'a> {
    pub fn new(app: &'a mut App) -> Self {
        Self { app }
    }
}

impl<'a> Navigable for TemplateNavigable<'a> {
    fn get_item_count(&self) -> usize {
        templates_for(self.app.template_filter).len()
    }

    fn get_selected_index(&self) -> usize {
        self.app.template_selected_index
    }

    fn set_selected_index(&mut self, index: usize) {
        self.app.template_selected_index = index;
    }
}

impl App {
    pub fn next_template(&mut self) {
        TemplateNavigable::new(self).next_item();
    }

    pub fn previous_template(&mut self) {
        TemplateNavigable::new(self).previous_item();
    }

    /// All, then images only, then videos only.
    pub fn cycle_template_filter(&mut self) {
        self.template_filter = match self.template_filter {
            None => Some(GenerationMode::Image),
            Some(GenerationMode::Image) => Some(GenerationMode::Video),
            Some(GenerationMode::Video) => None,
        };
        self.template_selected_index = 0;
    }

    #[must_use]
    pub fn selected_template(&self) -> Option<&'static Template> {
        templates_for(self.template_filter)
            .get(self.template_selected_index)
            .copied()
    }

    pub fn use_selected_template(&mut self) {
        if let Some(template) = self.selected_template() {
            tracing::info!(title = template.title, mode = %template.mode, "template selected");
            self.select_template(template.mode, template.prompt);
        }
    }
}
