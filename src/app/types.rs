use crate::models::GenerationMode;
use std::path::PathBuf;

/// What the generator screen shows for the current request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationState {
    /// Attached product photos as data URIs. Only the first is sent.
    pub original_images: Vec<String>,
    pub generated_image: Option<String>,
    pub generated_video_uri: Option<String>,
    pub prompt: String,
    pub mode: GenerationMode,
    pub is_loading: bool,
    pub error: Option<String>,
    pub progress_message: String,
    pub saved_path: Option<PathBuf>,
}

impl GenerationState {
    pub fn new(mode: GenerationMode) -> Self {
        Self {
            original_images: Vec::new(),
            generated_image: None,
            generated_video_uri: None,
            prompt: String::new(),
            mode,
            is_loading: false,
            error: None,
            progress_message: String::new(),
            saved_path: None,
        }
    }

    /// Clears the previous outcome and marks a request as running.
    pub fn begin(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
        self.generated_image = None;
        self.generated_video_uri = None;
        self.error = None;
        self.saved_path = None;
        self.is_loading = true;
        self.progress_message = match self.mode {
            GenerationMode::Image => "Generating image...".to_string(),
            GenerationMode::Video => "Preparing video job...".to_string(),
        };
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.is_loading = false;
        self.progress_message.clear();
        self.error = Some(message.into());
    }

    #[must_use]
    pub fn has_result(&self) -> bool {
        self.generated_image.is_some() || self.generated_video_uri.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct StatusToast {
    pub message: String,
    pub created_at: std::time::Instant,
}

impl StatusToast {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            created_at: std::time::Instant::now(),
        }
    }

    pub fn is_expired(&self, duration: std::time::Duration) -> bool {
        self.created_at.elapsed() >= duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_resets_previous_outcome() {
        let mut state = GenerationState::new(GenerationMode::Video);
        state.original_images.push("data:image/png;base64,QUJD".to_string());
        state.generated_video_uri = Some("https://v?key=k".to_string());
        state.error = Some("old failure".to_string());

        state.begin("slow pan");
        assert!(state.is_loading);
        assert!(!state.has_result());
        assert!(state.error.is_none());
        assert_eq!(state.prompt, "slow pan");
        assert_eq!(state.original_images.len(), 1);
        assert!(!state.progress_message.is_empty());
    }

    #[test]
    fn test_fail_stops_loading() {
        let mut state = GenerationState::new(GenerationMode::Image);
        state.begin("x");
        state.fail("No image generated in response.");
        assert!(!state.is_loading);
        assert!(state.progress_message.is_empty());
        assert_eq!(state.error.as_deref(), Some("No image generated in response."));
    }
}
