//! Background-removal proxy client (remove.bg compatible).
//!
//! The customizer sends either a public image URL or raw base64 data; the
//! processor answers with PNG bytes which are handed back as a data URL.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue};
use thiserror::Error;

use crate::config::ImageSettings;

/// Image to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Url(String),
    /// Base64 payload without a `data:` prefix
    Base64(String),
}

impl ImageSource {
    /// Build a source from request fields, stripping a `data:...;base64,`
    /// prefix from inline data. URL wins when both are present.
    pub fn from_parts(image_url: Option<String>, image_data: Option<String>) -> Option<Self> {
        if let Some(url) = image_url.filter(|u| !u.trim().is_empty()) {
            return Some(Self::Url(url));
        }
        image_data.filter(|d| !d.trim().is_empty()).map(|data| {
            let payload = match data.split_once(";base64,") {
                Some((prefix, rest)) if prefix.starts_with("data:") => rest.to_string(),
                _ => data,
            };
            Self::Base64(payload)
        })
    }

    fn form_field(&self) -> (&'static str, &str) {
        match self {
            Self::Url(url) => ("image_url", url),
            Self::Base64(data) => ("image_file_b64", data),
        }
    }
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

#[async_trait]
pub trait ImageProcessor: Send + Sync {
    /// Return the processed image as PNG bytes.
    async fn remove_background(&self, source: &ImageSource) -> Result<Vec<u8>, ImageError>;
}

/// HTTP client for a remove.bg-compatible endpoint.
pub struct RemoveBgClient {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoveBgClient {
    pub fn new(settings: &ImageSettings, endpoint: &str) -> Result<Self, ImageError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = settings.api_key.as_deref().filter(|k| !k.is_empty()) {
            headers.insert(
                "X-Api-Key",
                HeaderValue::from_str(key)
                    .map_err(|e| ImageError::Config(format!("Invalid API key format: {e}")))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl ImageProcessor for RemoveBgClient {
    async fn remove_background(&self, source: &ImageSource) -> Result<Vec<u8>, ImageError> {
        let (field, value) = source.form_field();
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[(field, value), ("size", "auto")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ImageError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Encode PNG bytes as a `data:` URL.
pub fn png_data_url(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}
