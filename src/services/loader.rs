use std::time::Duration;

use base64::Engine as _;
use image::RgbImage;
use reqwest::Client;

use crate::models::config::AppConfig;
use crate::models::error::AppError;

// ---------------------------------------------------------------------------
// Input forms
// ---------------------------------------------------------------------------

/// Which transport path supplied the image; echoed back on the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Base64,
    Url,
    Multipart,
}

impl ImageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSource::Base64 => "base64",
            ImageSource::Url => "url",
            ImageSource::Multipart => "multipart",
        }
    }
}

/// Image payload as parsed from the request. More than one field may be set;
/// precedence is base64 > url > multipart bytes.
#[derive(Debug, Default)]
pub struct ImageInput {
    pub bytes: Option<Vec<u8>>,
    pub base64: Option<String>,
    pub url: Option<String>,
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

pub struct ImageLoader {
    client: Client,
    fetch_timeout: Duration,
}

impl ImageLoader {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
        }
    }

    /// Resolve whatever the transport handed us into a canonical RGB image.
    pub async fn resolve(&self, input: &ImageInput) -> Result<(RgbImage, ImageSource), AppError> {
        if let Some(b64) = &input.base64 {
            let bytes = decode_base64_payload(b64)?;
            return Ok((decode_rgb(&bytes)?, ImageSource::Base64));
        }

        if let Some(url) = &input.url {
            let bytes = self.fetch(url).await?;
            return Ok((decode_rgb(&bytes)?, ImageSource::Url));
        }

        if let Some(bytes) = &input.bytes {
            return Ok((decode_rgb(bytes)?, ImageSource::Multipart));
        }

        Err(AppError::NoImageProvided)
    }

    /// Fetch image bytes over HTTP with a bounded timeout. No retries; a
    /// failed fetch fails the request.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let response = self
            .client
            .get(url)
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|e| AppError::FetchFailed(format!("GET {} failed: {}", url, e)))?;

        let response = response
            .error_for_status()
            .map_err(|e| AppError::FetchFailed(format!("GET {} returned error status: {}", url, e)))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::FetchFailed(format!("failed to read body from {}: {}", url, e)))?;

        Ok(bytes.to_vec())
    }
}

/// Decode a base64 image payload, stripping any `data:image/...;base64,`
/// header up to and including the first comma.
fn decode_base64_payload(payload: &str) -> Result<Vec<u8>, AppError> {
    let trimmed = payload.trim();
    let encoded = match trimmed.find(',') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    };

    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| AppError::InvalidImage(format!("base64 decode failed: {}", e)))
}

/// Decode raw bytes into an RGB image. Alpha is discarded and grayscale is
/// expanded so every downstream stage sees 3 channels.
fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, AppError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AppError::InvalidImage(e.to_string()))?;
    Ok(img.to_rgb8())
}
