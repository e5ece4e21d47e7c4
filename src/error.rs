//! Error types for the generation pipeline.

use crate::models::GenerationMode;
use std::fmt;

/// Which image call came back without a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCall {
    /// Text-to-image `predict`.
    Imagen,
    /// Multimodal `generateContent`.
    Multimodal,
}

impl fmt::Display for ImageCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageCall::Imagen => write!(f, "from Imagen model"),
            ImageCall::Multimodal => write!(f, "in response"),
        }
    }
}

/// Everything that can go wrong between picking a model and holding a result.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The model id is not in the registry. This is a configuration bug.
    #[error("unknown model '{0}'")]
    UnknownModel(String),

    /// The model exists but produces the other kind of media.
    #[error("model '{model}' does not generate {expected}")]
    WrongMode {
        model: String,
        expected: GenerationMode,
    },

    /// Video generation always starts from a product photo.
    #[error("Please upload a product image to generate a video.")]
    InputImageRequired,

    /// The source image is a data URI with a type the upstream does not accept.
    #[error("unsupported image format '{0}' (use PNG, JPEG or WebP)")]
    UnsupportedImageFormat(String),

    /// The upstream answered but carried no image payload.
    #[error("No image generated {0}.")]
    NoImageReturned(ImageCall),

    /// The video job finished without a result URI.
    #[error("Video generation completed but no URI returned.")]
    NoVideoUri,

    /// Network failure, timeout, throttling or server error. Worth retrying;
    /// the upstream message is passed through.
    #[error("{0}")]
    UpstreamCallFailed(String),

    /// The upstream refused the request (bad key, permission, invalid
    /// argument). Retrying the same call will not help.
    #[error("{message}")]
    UpstreamRejected { status: u16, message: String },

    /// The upstream reported that the requested entity does not exist.
    /// On the video path this usually means the selected key has no access.
    #[error("{0}")]
    UpstreamNotFound(String),

    /// The key-selection flow was opened; the user has to retry.
    #[error("Please re-select your API Key and try again.")]
    KeySelectionRequired,

    /// The long-running job itself reported a failure.
    #[error("video job failed (code {code}): {message}")]
    JobFailed { code: i32, message: String },

    /// Polling the job kept failing at the transport level.
    #[error("lost contact with the video job after {failures} failed status checks: {last_error}")]
    PollTransport { failures: u32, last_error: String },

    /// The job never reported completion within the configured attempts.
    #[error("video job still running after {attempts} status checks")]
    PollAttemptsExhausted { attempts: u32 },

    /// The caller cancelled the request.
    #[error("generation cancelled")]
    Cancelled,

    /// No credential is configured for the upstream service.
    #[error("no API key configured (set API_KEY or add one in the key dialog)")]
    MissingCredential,
}

impl GenerationError {
    /// The single message shown to the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            "Failed to generate content.".to_string()
        } else {
            message
        }
    }

    /// Whether the failure is the upstream "entity not found" condition.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, GenerationError::UpstreamNotFound(_))
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(error: reqwest::Error) -> Self {
        GenerationError::UpstreamCallFailed(error.to_string())
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, GenerationError>;
