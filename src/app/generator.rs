use crate::app::{App, GenerationEvent, GenerationOutcome, InFlight, TextInput};
use crate::error::GenerationError;
use crate::models::{self, GenerationMode, ModelConfig};
use crate::services::media;
use crate::services::{GenerationProgress, ImageRequest, VideoGenerationRequest};
use std::path::PathBuf;

/// Focusable controls on the generator screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorField {
    Prompt,
    Model,
    AspectRatio,
    Resolution,
    ImagePath,
}

impl GeneratorField {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            GeneratorField::Prompt => "Prompt",
            GeneratorField::Model => "Model",
            GeneratorField::AspectRatio => "Aspect ratio",
            GeneratorField::Resolution => "Resolution",
            GeneratorField::ImagePath => "Product photo",
        }
    }
}

/// Generator controls. Which ones show depends on the selected model.
#[derive(Debug, Clone)]
pub struct GeneratorForm {
    pub mode: GenerationMode,
    pub focus: GeneratorField,
    pub prompt: TextInput,
    pub image_path: TextInput,
    pub model: &'static ModelConfig,
    pub aspect_ratio: &'static str,
    pub resolution: &'static str,
}

fn cycle_index(current: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        0
    } else if forward {
        (current + 1) % len
    } else {
        (current + len - 1) % len
    }
}

fn cycle_option(options: &[&'static str], current: &str, forward: bool) -> Option<&'static str> {
    let position = options.iter().position(|option| *option == current).unwrap_or(0);
    options.get(cycle_index(position, options.len(), forward)).copied()
}

impl GeneratorForm {
    /// `preferred_model` is used when it exists and matches the mode.
    pub fn new(mode: GenerationMode, prompt: &str, preferred_model: &str) -> Self {
        let model = models::find_model(preferred_model)
            .ok()
            .filter(|model| model.mode == mode)
            .unwrap_or_else(|| models::default_model(mode));
        Self {
            mode,
            focus: GeneratorField::Prompt,
            prompt: TextInput::from(prompt),
            image_path: TextInput::new(),
            model,
            aspect_ratio: model.default_aspect_ratio,
            resolution: models::default_resolution(mode),
        }
    }

    /// Controls that apply to the selected model, in focus order.
    #[must_use]
    pub fn fields(&self) -> Vec<GeneratorField> {
        let caps = self.model.capabilities;
        let mut fields = vec![GeneratorField::Prompt, GeneratorField::Model];
        if caps.supports_aspect_ratio {
            fields.push(GeneratorField::AspectRatio);
        }
        if caps.supports_resolution {
            fields.push(GeneratorField::Resolution);
        }
        if caps.supports_input_image {
            fields.push(GeneratorField::ImagePath);
        }
        fields
    }

    pub fn focus_next(&mut self) {
        self.move_focus(true);
    }

    pub fn focus_previous(&mut self) {
        self.move_focus(false);
    }

    fn move_focus(&mut self, forward: bool) {
        let fields = self.fields();
        let current = fields.iter().position(|field| *field == self.focus).unwrap_or(0);
        if let Some(field) = fields.get(cycle_index(current, fields.len(), forward)) {
            self.focus = *field;
        }
    }

    pub fn cycle_model(&mut self, forward: bool) {
        let options: Vec<&'static ModelConfig> = models::models_for_mode(self.mode).collect();
        let current = options
            .iter()
            .position(|model| model.id == self.model.id)
            .unwrap_or(0);
        if let Some(model) = options.get(cycle_index(current, options.len(), forward)) {
            self.model = model;
            self.aspect_ratio = model.default_aspect_ratio;
            if !self.fields().contains(&self.focus) {
                self.focus = GeneratorField::Model;
            }
        }
    }

    pub fn cycle_aspect_ratio(&mut self, forward: bool) {
        if let Some(ratio) = cycle_option(models::aspect_ratios(), self.aspect_ratio, forward) {
            self.aspect_ratio = ratio;
        }
    }

    pub fn cycle_resolution(&mut self, forward: bool) {
        if let Some(tier) = cycle_option(models::resolutions(self.mode), self.resolution, forward) {
            self.resolution = tier;
        }
    }

    /// Left/right on a selector field.
    pub fn cycle_focused(&mut self, forward: bool) {
        match self.focus {
            GeneratorField::Model => self.cycle_model(forward),
            GeneratorField::AspectRatio => self.cycle_aspect_ratio(forward),
            GeneratorField::Resolution => self.cycle_resolution(forward),
            GeneratorField::Prompt => {
                if forward {
                    self.prompt.move_right();
                } else {
                    self.prompt.move_left();
                }
            }
            GeneratorField::ImagePath => {
                if forward {
                    self.image_path.move_right();
                } else {
                    self.image_path.move_left();
                }
            }
        }
    }

    /// Text field under focus, if the focus is on one.
    pub fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            GeneratorField::Prompt => Some(&mut self.prompt),
            GeneratorField::ImagePath => Some(&mut self.image_path),
            GeneratorField::Model | GeneratorField::AspectRatio | GeneratorField::Resolution => {
                None
            }
        }
    }
}

impl App {
    fn preferred_model(&self, mode: GenerationMode) -> &str {
        match mode {
            GenerationMode::Image => &self.config.generation.image_model,
            GenerationMode::Video => &self.config.generation.video_model,
        }
    }

    /// Fresh form and state for a generator launch.
    pub(crate) fn enter_generator(&mut self, mode: GenerationMode, prompt: &str) {
        self.generator = GeneratorForm::new(mode, prompt, self.preferred_model(mode));
        self.generation = crate::app::GenerationState::new(mode);
        self.generation.prompt = prompt.to_string();
    }

    pub fn toggle_generator_mode(&mut self) {
        if self.generation.is_loading {
            self.show_status_toast("BUSY");
            return;
        }
        let mode = self.generator.mode.toggled();
        let prompt = self.generator.prompt.content().to_string();
        let images = std::mem::take(&mut self.generation.original_images);
        self.router.set_generator_mode(mode);
        self.enter_generator(mode, &prompt);
        self.generation.original_images = images;
        self.show_status_toast(format!("{} MODE", mode.label().to_uppercase()));
    }

    pub fn add_generator_char(&mut self, character: char) {
        if let Some(input) = self.generator.focused_input() {
            input.add_char(character);
        }
    }

    pub fn remove_generator_char(&mut self) {
        if let Some(input) = self.generator.focused_input() {
            input.remove_char();
        }
    }

    pub fn delete_generator_char(&mut self) {
        if let Some(input) = self.generator.focused_input() {
            input.delete_char();
        }
    }

    /// Enter: attach on the photo field, cycle on selectors, run on the prompt.
    pub fn submit_generator_field(&mut self) {
        match self.generator.focus {
            GeneratorField::ImagePath => self.attach_image_from_input(),
            GeneratorField::Prompt => self.run_generation(),
            GeneratorField::Model | GeneratorField::AspectRatio | GeneratorField::Resolution => {
                self.generator.cycle_focused(true);
            }
        }
    }

    pub fn attach_image_from_input(&mut self) {
        let raw = self.generator.image_path.content().trim().trim_matches(['"', '\'']);
        if raw.is_empty() {
            return;
        }
        let path = expand_home(raw);
        match media::load_image_file(&path) {
            Ok(data_uri) => {
                tracing::info!(path = %path.display(), "product photo attached");
                self.generation.original_images.push(data_uri);
                self.generation.error = None;
                self.generator.image_path.clear();
                self.show_status_toast("PHOTO ATTACHED");
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "could not attach photo");
                self.generation.error = Some(error.to_string());
                self.show_status_toast("PHOTO ERROR");
            }
        }
    }

    pub fn clear_images(&mut self) {
        if !self.generation.original_images.is_empty() {
            self.generation.original_images.clear();
            self.show_status_toast("PHOTOS CLEARED");
        }
    }

    /// Starts a generation for the current form. At most one runs at a time.
    pub fn run_generation(&mut self) {
        if self.generation.is_loading {
            self.show_status_toast("ALREADY RUNNING");
            return;
        }
        let prompt = self.generator.prompt.content().trim().to_string();
        if prompt.is_empty() {
            self.generation.error = Some("Please describe the scene first.".to_string());
            return;
        }
        let (Some(runtime), Some(service)) = (self.runtime.as_ref(), self.service.clone()) else {
            self.generation
                .fail("Generation service unavailable, check the log for details.");
            return;
        };

        let form = &self.generator;
        let source_image = self.generation.original_images.first().cloned();
        let request_id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);
        let cancel = self.root_cancel.child_token();
        let task_cancel = cancel.clone();
        let tx = self.event_tx.clone();

        tracing::info!(request = request_id, mode = %form.mode, model = form.model.id, "generation started");
        match form.mode {
            GenerationMode::Image => {
                let request = ImageRequest {
                    source_image,
                    prompt: prompt.clone(),
                    model_id: form.model.id.to_string(),
                    aspect_ratio: form.aspect_ratio.to_string(),
                    resolution: form.resolution.to_string(),
                };
                runtime.spawn(async move {
                    let result = service
                        .generate_product_image(&request, &task_cancel)
                        .await;
                    let _ = tx.send(GenerationEvent::Finished {
                        request: request_id,
                        outcome: GenerationOutcome::from_result(result, GenerationOutcome::Image),
                    });
                });
            }
            GenerationMode::Video => {
                let request = VideoGenerationRequest {
                    source_image,
                    prompt: prompt.clone(),
                    model_id: form.model.id.to_string(),
                    aspect_ratio: form.aspect_ratio.to_string(),
                    resolution: form.resolution.to_string(),
                };
                runtime.spawn(async move {
                    let progress_tx = tx.clone();
                    let on_progress = move |progress: GenerationProgress| {
                        let _ = progress_tx.send(GenerationEvent::Progress {
                            request: request_id,
                            message: progress.to_string(),
                        });
                    };
                    let result = service
                        .generate_product_video(&request, &task_cancel, &on_progress)
                        .await;
                    let _ = tx.send(GenerationEvent::Finished {
                        request: request_id,
                        outcome: GenerationOutcome::from_result(result, GenerationOutcome::Video),
                    });
                });
            }
        }

        self.in_flight = Some(InFlight {
            request: request_id,
            cancel,
        });
        self.generation.begin(prompt);
    }

    pub fn cancel_generation(&mut self) {
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };
        in_flight.cancel.cancel();
        tracing::info!(request = in_flight.request, "generation cancelled");
        self.generation.is_loading = false;
        self.generation.progress_message = "Generation cancelled.".to_string();
        self.show_status_toast("CANCELLED");
    }

    /// Writes the current result to the output directory.
    pub fn save_result(&mut self) {
        let directory = match self.config.output_dir() {
            Ok(directory) => directory,
            Err(error) => {
                self.generation.error = Some(error.to_string());
                return;
            }
        };

        if let Some(data_uri) = self.generation.generated_image.clone() {
            match media::save_image(&data_uri, &directory) {
                Ok(path) => {
                    self.show_status_toast("SAVED");
                    self.generation.saved_path = Some(path);
                }
                Err(error) => {
                    tracing::error!(error = %error, "saving image failed");
                    self.generation.error = Some(format!("Could not save image: {}", error));
                }
            }
            return;
        }

        let Some(uri) = self.generation.generated_video_uri.clone() else {
            self.show_status_toast("NOTHING TO SAVE");
            return;
        };
        let (Some(runtime), Some(client)) = (self.runtime.as_ref(), self.client.clone()) else {
            self.generation.error = Some("Download client unavailable.".to_string());
            return;
        };
        let tx = self.event_tx.clone();
        runtime.spawn(async move {
            let event = match client.download(&uri).await {
                Ok(bytes) => match media::save_video(&bytes, &directory) {
                    Ok(path) => GenerationEvent::Saved(path),
                    Err(error) => GenerationEvent::SaveFailed(error.to_string()),
                },
                Err(error) => GenerationEvent::SaveFailed(error.user_message()),
            };
            let _ = tx.send(event);
        });
        self.show_status_toast("DOWNLOADING");
    }

    /// Copies the video link, or the saved file path for images.
    pub fn copy_result_link(&mut self) {
        let link = self
            .generation
            .generated_video_uri
            .clone()
            .or_else(|| {
                self.generation
                    .saved_path
                    .as_ref()
                    .map(|path| path.display().to_string())
            });
        let Some(link) = link else {
            let hint = if self.generation.generated_image.is_some() {
                "SAVE FIRST"
            } else {
                "NOTHING TO COPY"
            };
            self.show_status_toast(hint);
            return;
        };
        if self.clipboard_service.copy_link(&link).is_ok() {
            self.show_status_toast("COPIED");
        } else {
            self.show_status_toast("COPY FAILED");
        }
    }

    /// Folds a background event into the generator state.
    pub fn apply_generation_event(&mut self, event: GenerationEvent) {
        match event {
            GenerationEvent::Progress { request, message } => {
                if self.is_current_request(request) {
                    self.generation.progress_message = message;
                }
            }
            GenerationEvent::Finished { request, outcome } => {
                if !self.is_current_request(request) {
                    tracing::debug!(request, "dropping result of a superseded request");
                    return;
                }
                self.in_flight = None;
                self.generation.is_loading = false;
                self.generation.progress_message.clear();
                match outcome {
                    GenerationOutcome::Image(data_uri) => {
                        self.generation.generated_image = Some(data_uri);
                        self.show_status_toast("IMAGE READY");
                    }
                    GenerationOutcome::Video(uri) => {
                        self.generation.generated_video_uri = Some(uri);
                        self.show_status_toast("VIDEO READY");
                    }
                    GenerationOutcome::Failed(message) => self.generation.fail(message),
                    GenerationOutcome::Cancelled => {
                        self.generation.progress_message = "Generation cancelled.".to_string();
                    }
                }
            }
            GenerationEvent::Saved(path) => {
                self.show_status_toast("SAVED");
                self.generation.saved_path = Some(path);
            }
            GenerationEvent::SaveFailed(message) => {
                tracing::error!(error = %message, "saving video failed");
                self.generation.error = Some(format!("Could not save video: {}", message));
            }
        }
    }

    fn is_current_request(&self, request: u64) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.request == request)
    }
}

impl GenerationOutcome {
    fn from_result(
        result: crate::error::Result<String>,
        success: fn(String) -> GenerationOutcome,
    ) -> Self {
        match result {
            Ok(value) => success(value),
            Err(GenerationError::Cancelled) => GenerationOutcome::Cancelled,
            Err(error) => GenerationOutcome::Failed(error.user_message()),
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(dirs) = directories::BaseDirs::new()
    {
        return dirs.home_dir().join(rest);
    }
    PathBuf::from(path)
}
