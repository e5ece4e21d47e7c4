//! HTTP client for the Gemini API image and video endpoints.
//!
//! Field names follow the public REST surface exactly; the structs here are
//! the wire contract, not a model of our own.

use crate::error::{GenerationError, Result};
use crate::services::key_selection::ApiCredential;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_VERSION: &str = "v1beta";
const NOT_FOUND_MESSAGE: &str = "Requested entity was not found";
/// Finished videos can be large; the API request timeout does not apply.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30 * 60);

// ---- text-to-image (`predict`) ----

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PredictRequest {
    pub instances: Vec<PromptInstance>,
    pub parameters: ImageParameters,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PromptInstance {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageParameters {
    pub sample_count: u32,
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub bytes_base64_encoded: Option<String>,
    pub mime_type: Option<String>,
}

// ---- multimodal (`generateContent`) ----

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<ContentGenerationConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentGenerationConfig {
    pub image_config: ImageConfig,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// First inline payload with data in the first candidate.
    #[must_use]
    pub fn first_inline_image(&self) -> Option<&InlineData> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|part| part.inline_data.as_ref())
            .find(|inline| !inline.data.is_empty())
    }
}

// ---- video (`predictLongRunning`) ----

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VideoRequest {
    pub instances: Vec<VideoInstance>,
    pub parameters: VideoParameters,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VideoInstance {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<VideoImage>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoImage {
    pub bytes_base64_encoded: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    pub sample_count: u32,
    pub aspect_ratio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

/// A long-running video job as reported by the operations endpoint.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct VideoOperation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
    pub response: Option<VideoOperationResponse>,
    pub error: Option<OperationError>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoOperationResponse {
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GeneratedSample {
    pub video: Option<GeneratedVideo>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GeneratedVideo {
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct OperationError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl VideoOperation {
    /// URI of the first generated sample, if the job produced one.
    #[must_use]
    pub fn video_uri(&self) -> Option<&str> {
        self.response
            .as_ref()?
            .generate_video_response
            .as_ref()?
            .generated_samples
            .first()?
            .video
            .as_ref()?
            .uri
            .as_deref()
            .filter(|uri| !uri.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// The three upstream call shapes plus job polling.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate_images(&self, model: &str, request: &PredictRequest)
    -> Result<PredictResponse>;

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;

    async fn generate_videos(&self, model: &str, request: &VideoRequest) -> Result<VideoOperation>;

    async fn get_videos_operation(&self, operation: &VideoOperation) -> Result<VideoOperation>;
}

/// reqwest-backed client for `generativelanguage.googleapis.com`
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    credential: ApiCredential,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        credential: ApiCredential,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential,
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/{}/models/{}:{}", self.base_url, API_VERSION, model, method)
    }

    fn api_key(&self) -> Result<String> {
        self.credential
            .current()
            .ok_or(GenerationError::MissingCredential)
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", self.api_key()?)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T>(response: reqwest::Response) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status, &body))
    }

    /// Fetches a finished asset; `url` must already carry the key.
    ///
    /// Runs under [`DOWNLOAD_TIMEOUT`] instead of the API request timeout.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

fn classify_error(status: StatusCode, body: &str) -> GenerationError {
    let (message, api_status) = match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.message, envelope.error.status),
        Err(_) => (body.trim().to_string(), String::new()),
    };
    let message = if message.is_empty() {
        format!("Gemini API error: {}", status)
    } else {
        message
    };

    if status == StatusCode::NOT_FOUND
        || api_status == "NOT_FOUND"
        || message.contains(NOT_FOUND_MESSAGE)
    {
        GenerationError::UpstreamNotFound(message)
    } else if is_retryable(status) {
        GenerationError::UpstreamCallFailed(message)
    } else {
        GenerationError::UpstreamRejected {
            status: status.as_u16(),
            message,
        }
    }
}

/// Everything but a 4xx, plus throttling and request timeouts.
fn is_retryable(status: StatusCode) -> bool {
    !status.is_client_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate_images(
        &self,
        model: &str,
        request: &PredictRequest,
    ) -> Result<PredictResponse> {
        tracing::debug!(model, "imagen predict");
        self.post_json(&self.model_url(model, "predict"), request)
            .await
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        tracing::debug!(model, "generateContent");
        self.post_json(&self.model_url(model, "generateContent"), request)
            .await
    }

    async fn generate_videos(&self, model: &str, request: &VideoRequest) -> Result<VideoOperation> {
        tracing::debug!(model, "predictLongRunning");
        self.post_json(&self.model_url(model, "predictLongRunning"), request)
            .await
    }

    async fn get_videos_operation(&self, operation: &VideoOperation) -> Result<VideoOperation> {
        let url = format!(
            "{}/{}/{}",
            self.base_url,
            API_VERSION,
            operation.name.trim_start_matches('/')
        );
        let response = self
            .http
            .get(&url)
            .header("x-goog-api-key", self.api_key()?)
            .send()
            .await?;
        Self::decode(response).await
    }
}
