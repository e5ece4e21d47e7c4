use crate::error::{GenerationError, Result};
use base64::{Engine as _, engine::general_purpose};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Data-URI image types the upstream accepts, with their canonical MIME type.
const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("webp", "image/webp"),
];

/// MIME type assumed for bare base64 payloads.
const DEFAULT_UPLOAD_MIME: &str = "image/jpeg";
/// MIME type assumed for results that do not declare one.
pub const DEFAULT_RESULT_MIME: &str = "image/png";

/// Base64 image payload ready to be sent inline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    /// Accepts bare base64 or a `data:image/<type>;base64,` URI and strips the prefix.
    pub fn parse(source: &str) -> Result<Self> {
        let source = source.trim();
        let Some(rest) = source.strip_prefix("data:") else {
            return Ok(Self {
                mime_type: DEFAULT_UPLOAD_MIME.to_string(),
                data: source.to_string(),
            });
        };

        let (media_type, data) = rest
            .split_once(";base64,")
            .ok_or_else(|| GenerationError::UnsupportedImageFormat(prefix_of(rest)))?;
        let subtype = media_type
            .strip_prefix("image/")
            .ok_or_else(|| GenerationError::UnsupportedImageFormat(media_type.to_string()))?;
        let mime_type = ACCEPTED_TYPES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(subtype))
            .map(|(_, mime)| (*mime).to_string())
            .ok_or_else(|| GenerationError::UnsupportedImageFormat(media_type.to_string()))?;

        Ok(Self {
            mime_type,
            data: data.to_string(),
        })
    }
}

fn prefix_of(value: &str) -> String {
    value.chars().take(32).collect()
}

/// Wraps a base64 payload as a displayable data URI
#[must_use]
pub fn to_data_uri(mime_type: &str, data: &str) -> String {
    let mime_type = if mime_type.trim().is_empty() {
        DEFAULT_RESULT_MIME
    } else {
        mime_type.trim()
    };
    format!("data:{};base64,{}", mime_type, data)
}

/// Reads an image file and returns it as a data URI.
pub fn load_image_file(path: &Path) -> color_eyre::Result<String> {
    let bytes = fs::read(path)?;
    let format = image::guess_format(&bytes)
        .map_err(|_| color_eyre::eyre::eyre!("{} is not a recognised image", path.display()))?;
    let mime_type = match format {
        image::ImageFormat::Png => "image/png",
        image::ImageFormat::Jpeg => "image/jpeg",
        image::ImageFormat::WebP => "image/webp",
        other => {
            return Err(color_eyre::eyre::eyre!(
                "{:?} images are not supported (use PNG, JPEG or WebP)",
                other
            ));
        }
    };
    tracing::debug!(path = %path.display(), mime_type, size = bytes.len(), "loaded input image");
    Ok(to_data_uri(mime_type, &general_purpose::STANDARD.encode(bytes)))
}

/// Decodes a generated image data URI and writes it into `directory`.
pub fn save_image(data_uri: &str, directory: &Path) -> color_eyre::Result<PathBuf> {
    let image = InlineImage::parse(data_uri)?;
    let bytes = general_purpose::STANDARD.decode(image.data.as_bytes())?;
    let extension = match image.mime_type.as_str() {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    };
    write_result(directory, extension, &bytes)
}

/// Writes a downloaded video into `directory`.
pub fn save_video(bytes: &[u8], directory: &Path) -> color_eyre::Result<PathBuf> {
    write_result(directory, "mp4", bytes)
}

fn write_result(directory: &Path, extension: &str, bytes: &[u8]) -> color_eyre::Result<PathBuf> {
    fs::create_dir_all(directory)?;
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let mut path = directory.join(format!("shot-{}.{}", stamp, extension));
    let mut suffix = 1;
    while path.exists() {
        path = directory.join(format!("shot-{}-{}.{}", stamp, suffix, extension));
        suffix += 1;
    }
    fs::write(&path, bytes)?;
    tracing::info!(path = %path.display(), size = bytes.len(), "saved result");
    Ok(path)
}
