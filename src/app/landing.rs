use crate::app::router::{LandingSection, Screen};
use crate::app::{App, Navigable};

/// A titled run of lines on the landing page
pub struct LandingBlock {
    pub section: Option<LandingSection>,
    pub heading: &'static str,
    pub lines: &'static [&'static str],
}

impl LandingBlock {
    /// Heading, body and one blank separator line.
    #[must_use]
    pub fn height(&self) -> u16 {
        u16::try_from(self.lines.len()).unwrap_or(u16::MAX).saturating_add(2)
    }
}

pub static LANDING_BLOCKS: &[LandingBlock] = &[
    LandingBlock {
        section: None,
        heading: "Studio-grade product shots from one photo",
        lines: &[
            "Drop in a picture of your product, describe the scene, and get a",
            "campaign-ready image or a short cinematic clip in seconds.",
            "",
            "Press Enter to open the studio.",
        ],
    },
    LandingBlock {
        section: Some(LandingSection::Features),
        heading: "Features",
        lines: &[
            "  Background replacement   keep the product, change the world around it",
            "  Text-to-image            pure creative generation with Imagen",
            "  Product video            animate a still into a 720p/1080p commercial",
            "  Aspect ratios            1:1, 3:4, 4:3, 9:16 and 16:9 for every channel",
            "  High resolution          1K, 2K and 4K output on the Pro image model",
            "  Templates                proven prompts for e-commerce and social",
        ],
    },
    LandingBlock {
        section: Some(LandingSection::Pricing),
        heading: "Pricing",
        lines: &[
            "  Starter   free     bring your own API key, standard models",
            "  Pro       $19/mo   high-resolution images and fast video",
            "  Studio    $49/mo   every model, priority video rendering",
            "",
            "Generation is billed by the model provider against your own key.",
        ],
    },
];

/// One entry in the landing header
pub struct NavItem {
    pub label: &'static str,
    pub screen: Screen,
    pub section: Option<LandingSection>,
}

pub static LANDING_NAV: &[NavItem] = &[
    NavItem {
        label: "Studio",
        screen: Screen::Hub,
        section: None,
    },
    NavItem {
        label: "Features",
        screen: Screen::Landing,
        section: Some(LandingSection::Features),
    },
    NavItem {
        label: "Pricing",
        screen: Screen::Landing,
        section: Some(LandingSection::Pricing),
    },
    NavItem {
        label: "Templates",
        screen: Screen::Templates,
        section: None,
    },
    NavItem {
        label: "Docs",
        screen: Screen::Documents,
        section: None,
    },
];

/// Line offset of a section's heading.
#[must_use]
pub fn section_offset(section: LandingSection) -> u16 {
    LANDING_BLOCKS
        .iter()
        .take_while(|block| block.section != Some(section))
        .map(LandingBlock::height)
        .fold(0u16, u16::saturating_add)
}

#[must_use]
pub fn content_height() -> u16 {
    LANDING_BLOCKS
        .iter()
        .map(LandingBlock::height)
        .fold(0u16, u16::saturating_add)
}

pub struct LandingNavNavigable<'a> {
    app: &'a mut App,
}

impl<'a> LandingNavNavigable<'a> {
    pub fn new(app: &'a mut App) -> Self {
        Self { app }
    }
}

impl<'a> Navigable for LandingNavNavigable<'a> {
    fn get_item_count(&self) -> usize {
        LANDING_NAV.len()
    }

    fn get_selected_index(&self) -> usize {
        self.app.landing_nav_index
    }

    fn set_selected_index(&mut self, index: usize) {
        self.app.landing_nav_index = index;
    }
}

impl App {
    pub fn next_landing_nav(&mut self) {
        LandingNavNavigable::new(self).next_item();
    }

    pub fn previous_landing_nav(&mut self) {
        LandingNavNavigable::new(self).previous_item();
    }

    /// Follows the highlighted header link.
    pub fn follow_landing_nav(&mut self) {
        if let Some(item) = LANDING_NAV.get(self.landing_nav_index) {
            self.navigate(item.screen, item.section);
        }
    }

    pub fn scroll_landing(&mut self, delta: i32) {
        let max = content_height().saturating_sub(1);
        let next = i32::from(self.landing_scroll).saturating_add(delta);
        self.landing_scroll = u16::try_from(next.clamp(0, i32::from(max))).unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_anchor_exists_once() {
        for section in [LandingSection::Features, LandingSection::Pricing] {
            let count = LANDING_BLOCKS
                .iter()
                .filter(|block| block.section == Some(section))
                .count();
            assert_eq!(count, 1, "{}", section.anchor());
        }
    }

    #[test]
    fn test_section_offsets_follow_block_order() {
        let features = section_offset(LandingSection::Features);
        let pricing = section_offset(LandingSection::Pricing);
        assert!(features > 0);
        assert!(pricing > features);
        assert!(pricing < content_height());
    }
}
