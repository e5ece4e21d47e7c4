//! Turns a generator request into upstream calls and a displayable result.
//!
//! Images come back synchronously as a data URI. Videos are a long-running
//! job that is polled at a fixed interval until it reports `done`; the loop
//! is bounded, cancellable and reports progress as it goes.

use crate::config::GenerationConfig;
use crate::error::{GenerationError, ImageCall, Result};
use crate::models::{self, GenerationMode, ModelConfig, ModelFamily};
use crate::services::gemini::{
    Content, ContentGenerationConfig, GenerateContentRequest, GenerativeBackend, ImageConfig,
    ImageParameters, Part, PredictRequest, PromptInstance, VideoImage, VideoInstance,
    VideoOperation, VideoParameters, VideoRequest,
};
use crate::services::key_selection::{ApiCredential, KeySelector, NoopKeySelector};
use crate::services::media::{self, InlineImage};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const PRESERVE_PRODUCT_INSTRUCTION: &str = " Keep the product exactly as is, but change the background and lighting to match the scene described.";

fn image_prompt(prompt: &str) -> String {
    format!(
        "Professional product photography. {}. High quality, photorealistic.",
        prompt.trim()
    )
}

fn video_prompt(prompt: &str) -> String {
    format!(
        "Cinematic product commercial. {}. Dynamic camera movement, high quality lighting.",
        prompt.trim()
    )
}

/// Inputs for a still image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    /// Base64 or data URI. Ignored by text-to-image models.
    pub source_image: Option<String>,
    pub prompt: String,
    pub model_id: String,
    pub aspect_ratio: String,
    pub resolution: String,
}

/// Inputs for a short video
#[derive(Debug, Clone, PartialEq)]
pub struct VideoGenerationRequest {
    pub source_image: Option<String>,
    pub prompt: String,
    pub model_id: String,
    pub aspect_ratio: String,
    pub resolution: String,
}

/// Fixed-interval polling with an attempt cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    /// Consecutive transport failures tolerated before giving up.
    pub max_transport_errors: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

impl From<&GenerationConfig> for PollPolicy {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.max_poll_attempts.max(1),
            max_transport_errors: config.max_transport_errors,
        }
    }
}

/// Milestones reported while a generation runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationProgress {
    SelectingKey,
    Submitting,
    Submitted { operation: String },
    Waiting { attempt: u32 },
    TransportRetry { failures: u32 },
    Finished,
}

impl fmt::Display for GenerationProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationProgress::SelectingKey => write!(f, "Waiting for API key selection..."),
            GenerationProgress::Submitting => write!(f, "Submitting video job..."),
            GenerationProgress::Submitted { .. } => {
                write!(f, "Video job accepted. This may take a minute or two...")
            }
            GenerationProgress::Waiting { attempt } => {
                write!(f, "Rendering video... (status check {})", attempt)
            }
            GenerationProgress::TransportRetry { failures } => {
                write!(f, "Connection hiccup, retrying status check ({})...", failures)
            }
            GenerationProgress::Finished => write!(f, "Video ready."),
        }
    }
}

/// The generation adapter
#[derive(Clone)]
pub struct GenerationService {
    backend: Arc<dyn GenerativeBackend>,
    key_selector: Arc<dyn KeySelector>,
    credential: ApiCredential,
    poll: PollPolicy,
}

impl GenerationService {
    pub fn new(
        backend: Arc<dyn GenerativeBackend>,
        credential: ApiCredential,
        poll: PollPolicy,
    ) -> Self {
        Self {
            backend,
            key_selector: Arc::new(NoopKeySelector),
            credential,
            poll,
        }
    }

    #[must_use]
    pub fn with_key_selector(mut self, key_selector: Arc<dyn KeySelector>) -> Self {
        self.key_selector = key_selector;
        self
    }

    /// Generates one product image and returns it as a data URI.
    pub async fn generate_product_image(
        &self,
        request: &ImageRequest,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let result = cancellable(cancel, self.run_image(request)).await;
        match &result {
            Ok(_) => tracing::info!(model = %request.model_id, "image generated"),
            Err(error) => {
                tracing::error!(model = %request.model_id, error = %error, "image generation failed");
            }
        }
        result
    }

    async fn run_image(&self, request: &ImageRequest) -> Result<String> {
        let model = model_for(&request.model_id, GenerationMode::Image)?;
        let aspect_ratio = non_empty_or(&request.aspect_ratio, model.default_aspect_ratio);

        let source = match request.source_image.as_deref() {
            Some(image) if model.capabilities.supports_input_image => Some(InlineImage::parse(image)?),
            Some(_) => {
                tracing::debug!(model = model.id, "text-to-image model, input image dropped");
                None
            }
            None => None,
        };

        if model.family == ModelFamily::Imagen {
            return self.run_text_to_image(model, &request.prompt, &aspect_ratio).await;
        }

        let mut text = image_prompt(&request.prompt);
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = source {
            parts.push(Part::inline(image.mime_type, image.data));
            text.push_str(PRESERVE_PRODUCT_INSTRUCTION);
        }
        parts.push(Part::text(text));

        let image_size = model.sends_resolution().then(|| {
            non_empty_or(&request.resolution, models::default_resolution(GenerationMode::Image))
        });
        let content_request = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: Some(ContentGenerationConfig {
                image_config: ImageConfig {
                    aspect_ratio,
                    image_size,
                },
            }),
        };

        let response = self
            .backend
            .generate_content(model.id, &content_request)
            .await?;
        let inline = response
            .first_inline_image()
            .ok_or(GenerationError::NoImageReturned(ImageCall::Multimodal))?;
        Ok(media::to_data_uri(&inline.mime_type, &inline.data))
    }

    async fn run_text_to_image(
        &self,
        model: &ModelConfig,
        prompt: &str,
        aspect_ratio: &str,
    ) -> Result<String> {
        let predict_request = PredictRequest {
            instances: vec![PromptInstance {
                prompt: image_prompt(prompt),
            }],
            parameters: ImageParameters {
                sample_count: 1,
                aspect_ratio: aspect_ratio.to_string(),
            },
        };
        let response = self
            .backend
            .generate_images(model.id, &predict_request)
            .await?;
        response
            .predictions
            .first()
            .and_then(|prediction| {
                let data = prediction.bytes_base64_encoded.as_deref()?;
                (!data.is_empty()).then(|| {
                    media::to_data_uri(prediction.mime_type.as_deref().unwrap_or_default(), data)
                })
            })
            .ok_or(GenerationError::NoImageReturned(ImageCall::Imagen))
    }

    /// Generates a short video and returns a fetchable URI carrying the key.
    ///
    /// If the upstream reports the entity as not found and the host offers
    /// key selection, the selection flow is opened and the call fails with
    /// [`GenerationError::KeySelectionRequired`] so the user can retry.
    pub async fn generate_product_video(
        &self,
        request: &VideoGenerationRequest,
        cancel: &CancellationToken,
        on_progress: &(dyn Fn(GenerationProgress) + Send + Sync),
    ) -> Result<String> {
        let result = self.run_video(request, cancel, on_progress).await;
        match result {
            Ok(uri) => {
                tracing::info!(model = %request.model_id, "video generated");
                Ok(uri)
            }
            Err(error) if error.is_not_found() && self.key_selector.is_available() => {
                tracing::warn!(model = %request.model_id, error = %error, "entity not found, asking for a new key");
                on_progress(GenerationProgress::SelectingKey);
                match cancellable(cancel, self.key_selector.open_select_key()).await {
                    Ok(()) => {}
                    Err(GenerationError::Cancelled) => return Err(GenerationError::Cancelled),
                    Err(selection_error) => {
                        tracing::warn!(error = %selection_error, "key selection failed");
                    }
                }
                Err(GenerationError::KeySelectionRequired)
            }
            Err(error) => {
                tracing::error!(model = %request.model_id, error = %error, "video generation failed");
                Err(error)
            }
        }
    }

    async fn run_video(
        &self,
        request: &VideoGenerationRequest,
        cancel: &CancellationToken,
        on_progress: &(dyn Fn(GenerationProgress) + Send + Sync),
    ) -> Result<String> {
        if self.key_selector.is_available() && !self.key_selector.has_selected_key().await {
            on_progress(GenerationProgress::SelectingKey);
            cancellable(cancel, self.key_selector.open_select_key()).await?;
        }

        let model = model_for(&request.model_id, GenerationMode::Video)?;
        let image = request
            .source_image
            .as_deref()
            .filter(|image| !image.trim().is_empty())
            .ok_or(GenerationError::InputImageRequired)
            .and_then(InlineImage::parse)?;

        let resolution = model.sends_resolution().then(|| {
            non_empty_or(&request.resolution, models::default_resolution(GenerationMode::Video))
        });
        let video_request = VideoRequest {
            instances: vec![VideoInstance {
                prompt: video_prompt(&request.prompt),
                image: Some(VideoImage {
                    bytes_base64_encoded: image.data,
                    mime_type: image.mime_type,
                }),
            }],
            parameters: VideoParameters {
                sample_count: 1,
                aspect_ratio: non_empty_or(&request.aspect_ratio, model.default_aspect_ratio),
                resolution,
            },
        };

        on_progress(GenerationProgress::Submitting);
        let operation = cancellable(
            cancel,
            self.backend.generate_videos(model.id, &video_request),
        )
        .await?;
        tracing::info!(model = model.id, operation = %operation.name, "video job submitted");
        on_progress(GenerationProgress::Submitted {
            operation: operation.name.clone(),
        });

        let operation = self.poll_until_done(operation, cancel, on_progress).await?;
        if let Some(error) = operation.error {
            return Err(GenerationError::JobFailed {
                code: error.code,
                message: error.message,
            });
        }

        let uri = operation.video_uri().ok_or(GenerationError::NoVideoUri)?;
        let key = self
            .credential
            .current()
            .ok_or(GenerationError::MissingCredential)?;
        on_progress(GenerationProgress::Finished);
        Ok(append_key(uri, &key))
    }

    /// Re-queries the job every interval until it is done.
    async fn poll_until_done(
        &self,
        mut operation: VideoOperation,
        cancel: &CancellationToken,
        on_progress: &(dyn Fn(GenerationProgress) + Send + Sync),
    ) -> Result<VideoOperation> {
        let mut attempts: u32 = 0;
        let mut transport_failures: u32 = 0;

        while !operation.done && operation.error.is_none() {
            if attempts >= self.poll.max_attempts {
                return Err(GenerationError::PollAttemptsExhausted { attempts });
            }
            attempts += 1;
            on_progress(GenerationProgress::Waiting { attempt: attempts });

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                _ = tokio::time::sleep(self.poll.interval) => {}
            }

            match cancellable(cancel, self.backend.get_videos_operation(&operation)).await {
                Ok(next) => {
                    transport_failures = 0;
                    let name = std::mem::take(&mut operation.name);
                    operation = next;
                    if operation.name.is_empty() {
                        operation.name = name;
                    }
                }
                Err(GenerationError::UpstreamCallFailed(message)) => {
                    transport_failures += 1;
                    tracing::warn!(attempt = attempts, failures = transport_failures, error = %message, "status check failed");
                    if transport_failures > self.poll.max_transport_errors {
                        return Err(GenerationError::PollTransport {
                            failures: transport_failures,
                            last_error: message,
                        });
                    }
                    on_progress(GenerationProgress::TransportRetry {
                        failures: transport_failures,
                    });
                }
                Err(other) => {
                    tracing::error!(attempt = attempts, error = %other, "status check rejected");
                    return Err(other);
                }
            }
        }

        tracing::debug!(attempts, operation = %operation.name, "video job finished");
        Ok(operation)
    }
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(GenerationError::Cancelled),
        result = future => result,
    }
}

fn model_for(id: &str, expected: GenerationMode) -> Result<&'static ModelConfig> {
    let model = models::find_model(id)?;
    if model.mode != expected {
        return Err(GenerationError::WrongMode {
            model: id.to_string(),
            expected,
        });
    }
    Ok(model)
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Appends the credential so the finished asset can be fetched directly.
#[must_use]
pub fn append_key(uri: &str, key: &str) -> String {
    let separator = if uri.contains('?') { '&' } else { '?' };
    format!("{}{}key={}", uri, separator, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::gemini::{
        GenerateContentResponse, GenerateVideoResponse, GeneratedSample, GeneratedVideo,
        OperationError, PredictResponse, Prediction, VideoOperationResponse,
    };
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use tokio::time::Instant;

    #[derive(Default)]
    struct FakeBackend {
        predict_response: Mutex<Option<PredictResponse>>,
        content_response: Mutex<Option<Result<GenerateContentResponse>>>,
        submit_response: Mutex<Option<Result<VideoOperation>>>,
        poll_responses: Mutex<VecDeque<Result<VideoOperation>>>,
        predict_requests: Mutex<Vec<PredictRequest>>,
        content_requests: Mutex<Vec<GenerateContentRequest>>,
        video_requests: Mutex<Vec<VideoRequest>>,
        poll_times: Mutex<Vec<Instant>>,
        cancel_on_submit: Mutex<Option<CancellationToken>>,
    }

    #[async_trait]
    impl GenerativeBackend for FakeBackend {
        async fn generate_images(
            &self,
            _model: &str,
            request: &PredictRequest,
        ) -> Result<PredictResponse> {
            self.predict_requests.lock().unwrap().push(request.clone());
            Ok(self.predict_response.lock().unwrap().take().unwrap_or_default())
        }

        async fn generate_content(
            &self,
            _model: &str,
            request: &GenerateContentRequest,
        ) -> Result<GenerateContentResponse> {
            self.content_requests.lock().unwrap().push(request.clone());
            self.content_response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(GenerateContentResponse::default()))
        }

        async fn generate_videos(
            &self,
            _model: &str,
            request: &VideoRequest,
        ) -> Result<VideoOperation> {
            self.video_requests.lock().unwrap().push(request.clone());
            if let Some(token) = self.cancel_on_submit.lock().unwrap().take() {
                token.cancel();
            }
            self.submit_response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(pending("operations/op-1")))
        }

        async fn get_videos_operation(&self, _operation: &VideoOperation) -> Result<VideoOperation> {
            self.poll_times.lock().unwrap().push(Instant::now());
            self.poll_responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(pending("")))
        }
    }

    fn pending(name: &str) -> VideoOperation {
        VideoOperation {
            name: name.to_string(),
            ..VideoOperation::default()
        }
    }

    fn finished(uri: Option<&str>) -> VideoOperation {
        VideoOperation {
            name: "operations/op-1".to_string(),
            done: true,
            response: Some(VideoOperationResponse {
                generate_video_response: Some(GenerateVideoResponse {
                    generated_samples: vec![GeneratedSample {
                        video: Some(GeneratedVideo {
                            uri: uri.map(str::to_string),
                        }),
                    }],
                }),
            }),
            error: None,
        }
    }

    fn service(backend: &Arc<FakeBackend>) -> GenerationService {
        GenerationService::new(
            backend.clone(),
            ApiCredential::new("secret"),
            PollPolicy {
                interval: Duration::from_secs(5),
                max_attempts: 10,
                max_transport_errors: 2,
            },
        )
    }

    fn image_request(model: &str, source: Option<&str>) -> ImageRequest {
        ImageRequest {
            source_image: source.map(str::to_string),
            prompt: "red sneaker on marble".to_string(),
            model_id: model.to_string(),
            aspect_ratio: "1:1".to_string(),
            resolution: "2K".to_string(),
        }
    }

    fn video_request(source: Option<&str>) -> VideoGenerationRequest {
        VideoGenerationRequest {
            source_image: source.map(str::to_string),
            prompt: "slow orbit".to_string(),
            model_id: "veo-3.1-fast-generate-preview".to_string(),
            aspect_ratio: "9:16".to_string(),
            resolution: "720p".to_string(),
        }
    }

    fn image_part(data: &str) -> GenerateContentResponse {
        serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [
                {"text": "done"},
                {"inlineData": {"mimeType": "image/png", "data": data}}
            ]}}]
        }))
        .unwrap()
    }

    fn no_progress(_: GenerationProgress) {}

    #[tokio::test]
    async fn test_imagen_is_text_only() {
        let backend = Arc::new(FakeBackend::default());
        *backend.predict_response.lock().unwrap() = Some(PredictResponse {
            predictions: vec![Prediction {
                bytes_base64_encoded: Some("UE5H".to_string()),
                mime_type: None,
            }],
        });

        let uri = service(&backend)
            .generate_product_image(
                &image_request("imagen-4.0-generate-001", Some("data:image/png;base64,SU1H")),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(uri, "data:image/png;base64,UE5H");
        assert!(backend.content_requests.lock().unwrap().is_empty());
        let requests = backend.predict_requests.lock().unwrap();
        let request = requests.first().unwrap();
        let body = serde_json::to_string(request).unwrap();
        assert!(!body.contains("SU1H"), "input image leaked into text-only request");
        assert_eq!(
            request.instances.first().unwrap().prompt,
            "Professional product photography. red sneaker on marble. High quality, photorealistic."
        );
        assert_eq!(request.parameters.aspect_ratio, "1:1");
        assert_eq!(request.parameters.sample_count, 1);
    }

    #[tokio::test]
    async fn test_imagen_without_predictions_fails() {
        let backend = Arc::new(FakeBackend::default());
        let error = service(&backend)
            .generate_product_image(
                &image_request("imagen-4.0-generate-001", None),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(error, GenerationError::NoImageReturned(ImageCall::Imagen)));
        assert_eq!(error.user_message(), "No image generated from Imagen model.");
    }

    #[tokio::test]
    async fn test_multimodal_request_shape() {
        let backend = Arc::new(FakeBackend::default());
        *backend.content_response.lock().unwrap() = Some(Ok(image_part("T1VU")));

        let uri = service(&backend)
            .generate_product_image(
                &image_request("gemini-2.5-flash-image", Some("data:image/webp;base64,SU1H")),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(uri, "data:image/png;base64,T1VU");

        let requests = backend.content_requests.lock().unwrap();
        let value = serde_json::to_value(requests.first().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "contents": [{"parts": [
                    {"inlineData": {"mimeType": "image/webp", "data": "SU1H"}},
                    {"text": "Professional product photography. red sneaker on marble. High quality, photorealistic. Keep the product exactly as is, but change the background and lighting to match the scene described."}
                ]}],
                "generationConfig": {"imageConfig": {"aspectRatio": "1:1"}}
            })
        );
    }

    #[tokio::test]
    async fn test_pro_model_sends_image_size() {
        let backend = Arc::new(FakeBackend::default());
        *backend.content_response.lock().unwrap() = Some(Ok(image_part("T1VU")));

        service(&backend)
            .generate_product_image(
                &image_request("gemini-3-pro-image-preview", None),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let requests = backend.content_requests.lock().unwrap();
        let request = requests.first().unwrap();
        let config = request.generation_config.as_ref().unwrap();
        assert_eq!(config.image_config.image_size.as_deref(), Some("2K"));
        // No input image: a single text part without the preserve instruction.
        let parts = &request.contents.first().unwrap().parts;
        assert_eq!(parts.len(), 1);
        assert!(!parts.first().unwrap().text.as_deref().unwrap().contains("Keep the product"));
    }

    #[tokio::test]
    async fn test_no_inline_parts_is_an_error() {
        let backend = Arc::new(FakeBackend::default());
        let text_only: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "I cannot draw that"}]}}]
        }))
        .unwrap();
        *backend.content_response.lock().unwrap() = Some(Ok(text_only));

        let error = service(&backend)
            .generate_product_image(
                &image_request("gemini-2.5-flash-image", None),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(error, GenerationError::NoImageReturned(ImageCall::Multimodal)));
    }

    #[tokio::test]
    async fn test_image_path_rejects_video_models() {
        let backend = Arc::new(FakeBackend::default());
        let error = service(&backend)
            .generate_product_image(
                &image_request("veo-3.1-generate-preview", None),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(error, GenerationError::WrongMode { .. }));

        let error = service(&backend)
            .generate_product_image(&image_request("mystery", None), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(error, GenerationError::UnknownModel(_)));
    }

    #[tokio::test]
    async fn test_cancelled_image_request() {
        let backend = Arc::new(FakeBackend::default());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let error = service(&backend)
            .generate_product_image(&image_request("gemini-2.5-flash-image", None), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(error, GenerationError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_video_waits_one_interval_then_returns_keyed_uri() {
        let backend = Arc::new(FakeBackend::default());
        backend
            .poll_responses
            .lock()
            .unwrap()
            .push_back(Ok(finished(Some("https://files.example/v1/f:download?alt=media"))));

        let start = Instant::now();
        let uri = service(&backend)
            .generate_product_video(
                &video_request(Some("data:image/jpeg;base64,SU1H")),
                &CancellationToken::new(),
                &no_progress,
            )
            .await
            .unwrap();

        assert_eq!(uri, "https://files.example/v1/f:download?alt=media&key=secret");
        let polls = backend.poll_times.lock().unwrap();
        assert_eq!(polls.len(), 1);
        assert!(polls.first().unwrap().duration_since(start) >= Duration::from_secs(5));

        let requests = backend.video_requests.lock().unwrap();
        let value = serde_json::to_value(requests.first().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "instances": [{
                    "prompt": "Cinematic product commercial. slow orbit. Dynamic camera movement, high quality lighting.",
                    "image": {"bytesBase64Encoded": "SU1H", "mimeType": "image/jpeg"}
                }],
                "parameters": {"sampleCount": 1, "aspectRatio": "9:16", "resolution": "720p"}
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_done_with_interval_between_checks() {
        let backend = Arc::new(FakeBackend::default());
        {
            let mut polls = backend.poll_responses.lock().unwrap();
            polls.push_back(Ok(pending("operations/op-1")));
            polls.push_back(Ok(pending("operations/op-1")));
            polls.push_back(Ok(finished(Some("https://files.example/v?alt=media"))));
        }

        let progress = Arc::new(Mutex::new(Vec::new()));
        let sink = progress.clone();
        let on_progress = move |event: GenerationProgress| sink.lock().unwrap().push(event);

        service(&backend)
            .generate_product_video(
                &video_request(Some("SU1H")),
                &CancellationToken::new(),
                &on_progress,
            )
            .await
            .unwrap();

        let polls = backend.poll_times.lock().unwrap();
        assert_eq!(polls.len(), 3);
        for pair in polls.windows(2) {
            if let [earlier, later] = pair {
                assert!(later.duration_since(*earlier) >= Duration::from_secs(5));
            }
        }
        let events = progress.lock().unwrap();
        assert_eq!(events.first(), Some(&GenerationProgress::Submitting));
        assert!(events.contains(&GenerationProgress::Waiting { attempt: 3 }));
        assert_eq!(events.last(), Some(&GenerationProgress::Finished));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_attempts_are_bounded() {
        let backend = Arc::new(FakeBackend::default());
        let error = service(&backend)
            .generate_product_video(
                &video_request(Some("SU1H")),
                &CancellationToken::new(),
                &no_progress,
            )
            .await
            .unwrap_err();
        assert!(matches!(error, GenerationError::PollAttemptsExhausted { attempts: 10 }));
        assert_eq!(backend.poll_times.lock().unwrap().len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_polling() {
        let backend = Arc::new(FakeBackend::default());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let service = service(&backend);

        let task = tokio::spawn(async move {
            service
                .generate_product_video(&video_request(Some("SU1H")), &cancel, &no_progress)
                .await
        });
        tokio::time::sleep(Duration::from_secs(12)).await;
        trigger.cancel();

        let error = task.await.unwrap().unwrap_err();
        assert!(matches!(error, GenerationError::Cancelled));
        assert_eq!(backend.poll_times.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_errors_are_tolerated_then_fatal() {
        let backend = Arc::new(FakeBackend::default());
        {
            let mut polls = backend.poll_responses.lock().unwrap();
            polls.push_back(Err(GenerationError::UpstreamCallFailed("reset".into())));
            polls.push_back(Err(GenerationError::UpstreamCallFailed("reset".into())));
            polls.push_back(Ok(finished(Some("https://files.example/v?alt=media"))));
        }
        let uri = service(&backend)
            .generate_product_video(
                &video_request(Some("SU1H")),
                &CancellationToken::new(),
                &no_progress,
            )
            .await
            .unwrap();
        assert!(uri.ends_with("&key=secret"));

        let backend = Arc::new(FakeBackend::default());
        {
            let mut polls = backend.poll_responses.lock().unwrap();
            for _ in 0..3 {
                polls.push_back(Err(GenerationError::UpstreamCallFailed("timeout".into())));
            }
        }
        let error = service(&backend)
            .generate_product_video(
                &video_request(Some("SU1H")),
                &CancellationToken::new(),
                &no_progress,
            )
            .await
            .unwrap_err();
        assert!(matches!(error, GenerationError::PollTransport { failures: 3, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_error_status_is_job_failure() {
        let backend = Arc::new(FakeBackend::default());
        backend.poll_responses.lock().unwrap().push_back(Ok(VideoOperation {
            name: "operations/op-1".to_string(),
            done: true,
            response: None,
            error: Some(OperationError {
                code: 3,
                message: "prompt blocked".to_string(),
            }),
        }));
        let error = service(&backend)
            .generate_product_video(
                &video_request(Some("SU1H")),
                &CancellationToken::new(),
                &no_progress,
            )
            .await
            .unwrap_err();
        assert!(matches!(error, GenerationError::JobFailed { code: 3, .. }));
    }

    #[tokio::test]
    async fn test_done_without_uri() {
        let backend = Arc::new(FakeBackend::default());
        *backend.submit_response.lock().unwrap() = Some(Ok(finished(None)));
        let error = service(&backend)
            .generate_product_video(
                &video_request(Some("SU1H")),
                &CancellationToken::new(),
                &no_progress,
            )
            .await
            .unwrap_err();
        assert!(matches!(error, GenerationError::NoVideoUri));
        assert!(backend.poll_times.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_video_requires_image() {
        let backend = Arc::new(FakeBackend::default());
        let error = service(&backend)
            .generate_product_video(&video_request(None), &CancellationToken::new(), &no_progress)
            .await
            .unwrap_err();
        assert!(matches!(error, GenerationError::InputImageRequired));
        assert!(backend.video_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolution_omitted_for_models_without_tiers() {
        let backend = Arc::new(FakeBackend::default());
        *backend.submit_response.lock().unwrap() =
            Some(Ok(finished(Some("https://files.example/v?alt=media"))));
        let mut request = video_request(Some("SU1H"));
        request.model_id = "hailuo-2.3".to_string();
        request.resolution = "1080p".to_string();

        service(&backend)
            .generate_product_video(&request, &CancellationToken::new(), &no_progress)
            .await
            .unwrap();
        let requests = backend.video_requests.lock().unwrap();
        assert!(requests.first().unwrap().parameters.resolution.is_none());
    }

    struct RecordingSelector {
        has_key: AtomicBool,
        opened: AtomicU32,
    }

    #[async_trait]
    impl KeySelector for RecordingSelector {
        fn is_available(&self) -> bool {
            true
        }

        async fn has_selected_key(&self) -> bool {
            self.has_key.load(Ordering::SeqCst)
        }

        async fn open_select_key(&self) -> Result<()> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            self.has_key.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_key_selection_opened_when_no_key() {
        let backend = Arc::new(FakeBackend::default());
        *backend.submit_response.lock().unwrap() =
            Some(Ok(finished(Some("https://files.example/v?alt=media"))));
        let selector = Arc::new(RecordingSelector {
            has_key: AtomicBool::new(false),
            opened: AtomicU32::new(0),
        });

        service(&backend)
            .with_key_selector(selector.clone())
            .generate_product_video(
                &video_request(Some("SU1H")),
                &CancellationToken::new(),
                &no_progress,
            )
            .await
            .unwrap();
        assert_eq!(selector.opened.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_not_found_reopens_key_selection() {
        let backend = Arc::new(FakeBackend::default());
        *backend.submit_response.lock().unwrap() = Some(Err(GenerationError::UpstreamNotFound(
            "Requested entity was not found.".to_string(),
        )));
        let selector = Arc::new(RecordingSelector {
            has_key: AtomicBool::new(true),
            opened: AtomicU32::new(0),
        });

        let error = service(&backend)
            .with_key_selector(selector.clone())
            .generate_product_video(
                &video_request(Some("SU1H")),
                &CancellationToken::new(),
                &no_progress,
            )
            .await
            .unwrap_err();
        assert!(matches!(error, GenerationError::KeySelectionRequired));
        assert_eq!(selector.opened.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_request_does_not_open_key_selection() {
        let backend = Arc::new(FakeBackend::default());
        *backend.submit_response.lock().unwrap() = Some(Err(GenerationError::UpstreamNotFound(
            "Requested entity was not found.".to_string(),
        )));
        let cancel = CancellationToken::new();
        *backend.cancel_on_submit.lock().unwrap() = Some(cancel.clone());
        let selector = Arc::new(RecordingSelector {
            has_key: AtomicBool::new(true),
            opened: AtomicU32::new(0),
        });

        let error = service(&backend)
            .with_key_selector(selector.clone())
            .generate_product_video(&video_request(Some("SU1H")), &cancel, &no_progress)
            .await
            .unwrap_err();
        assert!(matches!(error, GenerationError::Cancelled));
        assert_eq!(selector.opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejected_status_check_fails_without_retry() {
        use crate::services::gemini::GeminiClient;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/veo-3.1-fast-generate-preview:predictLongRunning"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"name": "operations/op-9"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1beta/operations/op-9"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {
                    "code": 403,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "PERMISSION_DENIED"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credential = ApiCredential::new("secret");
        let client =
            GeminiClient::new(server.uri(), credential.clone(), Duration::from_secs(5)).unwrap();
        let service = GenerationService::new(
            Arc::new(client),
            credential,
            PollPolicy {
                interval: Duration::from_millis(10),
                max_attempts: 10,
                max_transport_errors: 3,
            },
        );

        let error = service
            .generate_product_video(
                &video_request(Some("SU1H")),
                &CancellationToken::new(),
                &no_progress,
            )
            .await
            .unwrap_err();
        assert!(matches!(error, GenerationError::UpstreamRejected { status: 403, .. }));
        assert_eq!(
            error.user_message(),
            "API key not valid. Please pass a valid API key."
        );
    }

    #[tokio::test]
    async fn test_not_found_without_host_hook_passes_through() {
        let backend = Arc::new(FakeBackend::default());
        *backend.submit_response.lock().unwrap() = Some(Err(GenerationError::UpstreamNotFound(
            "Requested entity was not found.".to_string(),
        )));
        let error = service(&backend)
            .generate_product_video(
                &video_request(Some("SU1H")),
                &CancellationToken::new(),
                &no_progress,
            )
            .await
            .unwrap_err();
        assert_eq!(error.user_message(), "Requested entity was not found.");
    }

    #[test]
    fn test_append_key_separator() {
        assert_eq!(append_key("https://a/b?alt=media", "k"), "https://a/b?alt=media&key=k");
        assert_eq!(append_key("https://a/b", "k"), "https://a/b?key=k");
    }
}
