pub mod clipboard;
pub mod gemini;
pub mod generation;
pub mod key_selection;
pub mod media;

pub use generation::{
    GenerationProgress, GenerationService, ImageRequest, PollPolicy, VideoGenerationRequest,
};
