//! Registry of the generative models the studio can drive.
//!
//! The table is fixed at compile time. Each entry says which upstream call
//! shape the model uses and which generator controls apply to it.

use crate::error::{GenerationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a model produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Image,
    Video,
}

impl GenerationMode {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            GenerationMode::Image => "Image",
            GenerationMode::Video => "Video",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            GenerationMode::Image => GenerationMode::Video,
            GenerationMode::Video => GenerationMode::Image,
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationMode::Image => write!(f, "images"),
            GenerationMode::Video => write!(f, "videos"),
        }
    }
}

/// Upstream call shape used for a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// Text-to-image `predict`; never takes an input image.
    Imagen,
    /// Multimodal `generateContent`.
    GeminiImage,
    /// Multimodal `generateContent` with an `imageSize` tier.
    GeminiImagePro,
    /// Long-running `predictLongRunning` video job.
    Veo,
    /// Third-party id routed through the call shape of its mode.
    Partner,
}

/// Generator controls a model accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelCapabilities {
    pub supports_aspect_ratio: bool,
    /// 1K/2K/4K for images, 720p/1080p for video.
    pub supports_resolution: bool,
    /// Batch generation. Declared but not acted on yet.
    pub supports_quantity: bool,
    /// `false` means pure text-to-image.
    pub supports_input_image: bool,
}

/// A model the studio can call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub id: &'static str,
    pub label: &'static str,
    pub mode: GenerationMode,
    pub description: &'static str,
    pub capabilities: ModelCapabilities,
    pub default_aspect_ratio: &'static str,
    pub family: ModelFamily,
}

impl ModelConfig {
    /// Whether the request for this model carries a resolution tier.
    #[must_use]
    pub fn sends_resolution(&self) -> bool {
        match self.mode {
            GenerationMode::Image => self.family == ModelFamily::GeminiImagePro,
            GenerationMode::Video => self.capabilities.supports_resolution,
        }
    }
}

const fn caps(
    supports_aspect_ratio: bool,
    supports_resolution: bool,
    supports_quantity: bool,
    supports_input_image: bool,
) -> ModelCapabilities {
    ModelCapabilities {
        supports_aspect_ratio,
        supports_resolution,
        supports_quantity,
        supports_input_image,
    }
}

const GEMINI_FLASH_IMAGE: ModelConfig = ModelConfig {
    id: "gemini-2.5-flash-image",
    label: "Gemini Flash (Standard)",
    mode: GenerationMode::Image,
    description: "Fastest generation. Best for background replacement.",
    capabilities: caps(true, false, false, true),
    default_aspect_ratio: "1:1",
    family: ModelFamily::GeminiImage,
};

const VEO_FAST: ModelConfig = ModelConfig {
    id: "veo-3.1-fast-generate-preview",
    label: "Veo Fast (Video)",
    mode: GenerationMode::Video,
    description: "Generate 1080p video ads rapidly.",
    capabilities: caps(true, true, false, true),
    default_aspect_ratio: "9:16",
    family: ModelFamily::Veo,
};

pub static AVAILABLE_MODELS: &[ModelConfig] = &[
    GEMINI_FLASH_IMAGE,
    ModelConfig {
        id: "gemini-3-pro-image-preview",
        label: "Nano Banana Pro (High Res)",
        mode: GenerationMode::Image,
        description: "High fidelity 4K output. Best for professional product shots.",
        capabilities: caps(true, true, false, true),
        default_aspect_ratio: "1:1",
        family: ModelFamily::GeminiImagePro,
    },
    ModelConfig {
        id: "imagen-4.0-generate-001",
        label: "Imagen 4 Ultra (Creative)",
        mode: GenerationMode::Image,
        description: "Pure creative generation from text. Does not use input image.",
        capabilities: caps(true, false, true, false),
        default_aspect_ratio: "1:1",
        family: ModelFamily::Imagen,
    },
    ModelConfig {
        id: "qwen-image-edit-2509",
        label: "Qwen Image Edit 2509",
        mode: GenerationMode::Image,
        description: "Advanced editing capabilities for complex scene composition.",
        capabilities: caps(true, true, false, true),
        default_aspect_ratio: "1:1",
        family: ModelFamily::Partner,
    },
    ModelConfig {
        id: "seedream-4.0",
        label: "SeeDream 4.0",
        mode: GenerationMode::Image,
        description: "Balanced artistic generation for lifestyle shots.",
        capabilities: caps(true, false, true, true),
        default_aspect_ratio: "3:4",
        family: ModelFamily::Partner,
    },
    ModelConfig {
        id: "seedream-4.5",
        label: "SeeDream 4.5",
        mode: GenerationMode::Image,
        description: "Latest SeeDream model with enhanced photorealism.",
        capabilities: caps(true, true, true, true),
        default_aspect_ratio: "3:4",
        family: ModelFamily::Partner,
    },
    VEO_FAST,
    ModelConfig {
        id: "veo-3.1-generate-preview",
        label: "Veo 3.1 (High Quality)",
        mode: GenerationMode::Video,
        description: "Higher fidelity video generation with complex motion.",
        capabilities: caps(true, true, false, true),
        default_aspect_ratio: "16:9",
        family: ModelFamily::Veo,
    },
    ModelConfig {
        id: "sora-2",
        label: "Sora 2",
        mode: GenerationMode::Video,
        description: "State-of-the-art video realism and physics simulation.",
        capabilities: caps(true, true, false, true),
        default_aspect_ratio: "16:9",
        family: ModelFamily::Partner,
    },
    ModelConfig {
        id: "hailuo-2.3",
        label: "Hailuo 2.3",
        mode: GenerationMode::Video,
        description: "Optimized for social media motion trends.",
        capabilities: caps(true, false, false, true),
        default_aspect_ratio: "9:16",
        family: ModelFamily::Partner,
    },
    ModelConfig {
        id: "wan-2.2",
        label: "Wan 2.2",
        mode: GenerationMode::Video,
        description: "Efficient video generation for e-commerce.",
        capabilities: caps(true, false, false, true),
        default_aspect_ratio: "9:16",
        family: ModelFamily::Partner,
    },
    ModelConfig {
        id: "wan-2.5",
        label: "Wan 2.5",
        mode: GenerationMode::Video,
        description: "Latest Wan model with improved dynamic range.",
        capabilities: caps(true, true, false, true),
        default_aspect_ratio: "9:16",
        family: ModelFamily::Partner,
    },
];

const ASPECT_RATIOS: &[&str] = &["1:1", "3:4", "4:3", "9:16", "16:9"];
const IMAGE_RESOLUTIONS: &[&str] = &["1K", "2K", "4K"];
const VIDEO_RESOLUTIONS: &[&str] = &["720p", "1080p"];

/// Looks up a model by its upstream id
pub fn find_model(id: &str) -> Result<&'static ModelConfig> {
    AVAILABLE_MODELS
        .iter()
        .find(|model| model.id == id)
        .ok_or_else(|| GenerationError::UnknownModel(id.to_string()))
}

pub fn models_for_mode(mode: GenerationMode) -> impl Iterator<Item = &'static ModelConfig> {
    AVAILABLE_MODELS.iter().filter(move |model| model.mode == mode)
}

/// Model the generator opens with for a mode
#[must_use]
pub fn default_model(mode: GenerationMode) -> &'static ModelConfig {
    match mode {
        GenerationMode::Image => &GEMINI_FLASH_IMAGE,
        GenerationMode::Video => &VEO_FAST,
    }
}

#[must_use]
pub fn aspect_ratios() -> &'static [&'static str] {
    ASPECT_RATIOS
}

#[must_use]
pub fn resolutions(mode: GenerationMode) -> &'static [&'static str] {
    match mode {
        GenerationMode::Image => IMAGE_RESOLUTIONS,
        GenerationMode::Video => VIDEO_RESOLUTIONS,
    }
}

#[must_use]
pub fn default_resolution(mode: GenerationMode) -> &'static str {
    match mode {
        GenerationMode::Image => "1K",
        GenerationMode::Video => "720p",
    }
}
