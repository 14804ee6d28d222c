//! Image Generation Provider
//!
//! Trait and OpenAI implementation for the images/generations endpoint.
//! One request per call; there is no retry at this layer or above it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::provider::{missing_api_key_error, parse_http_error};
use super::types::{LlmError, LlmResult, ProviderConfig};
use crate::http_client::build_http_client;

/// Default OpenAI images endpoint
const OPENAI_IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";

/// Default image model.
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Request body for an image generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub size: String,
    pub quality: String,
    /// `natural` or `vivid`
    pub style: String,
}

/// A generated image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

/// Trait for image generation backends.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Generate a single image. A response without an image URL is an error.
    async fn generate_image(&self, request: ImageRequest) -> LlmResult<GeneratedImage>;
}

/// OpenAI images provider
pub struct OpenAIImageProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl OpenAIImageProvider {
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let client = build_http_client(config.proxy.as_ref())?;
        Ok(Self { config, client })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(OPENAI_IMAGES_URL)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl ImageProvider for OpenAIImageProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate_image(&self, request: ImageRequest) -> LlmResult<GeneratedImage> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| missing_api_key_error("openai"))?;

        let response = self
            .client
            .post(self.base_url())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body_text = response.text().await.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;

        if !(200..300).contains(&status) {
            tracing::debug!(status, model = %request.model, "image generation rejected");
            return Err(parse_http_error(status, &body_text, "openai"));
        }

        parse_image_response(&body_text)
    }
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    revised_prompt: Option<String>,
}

/// Extract the first image URL from an images response body.
fn parse_image_response(body: &str) -> LlmResult<GeneratedImage> {
    let parsed: ImagesResponse = serde_json::from_str(body).map_err(|e| LlmError::ParseError {
        message: format!("Failed to parse image response: {}", e),
    })?;

    let first = parsed.data.into_iter().next();
    match first {
        Some(ImageData {
            url: Some(url),
            revised_prompt,
        }) if !url.is_empty() => Ok(GeneratedImage {
            url,
            revised_prompt,
        }),
        _ => Err(LlmError::ParseError {
            message: "No image URL received from API".to_string(),
        }),
    }
}
