//! Dream Visualization
//!
//! Builds an image prompt from a dream and makes a single image-generation
//! request. Unlike text analysis there is no retry and no fallback: failures
//! are returned to the caller.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use somnia_core::{DreamInput, Emotion};
use somnia_llm::{ImageProvider, ImageRequest};
use tracing::{error, info};

use crate::utils::error::{AppError, AppResult};

const IMAGE_SIZE: &str = "1024x1024";
const IMAGE_QUALITY: &str = "standard";

/// Rendering style for a visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualStyle {
    Realistic,
    #[default]
    Artistic,
    Surreal,
    Minimalist,
}

impl VisualStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisualStyle::Realistic => "realistic",
            VisualStyle::Artistic => "artistic",
            VisualStyle::Surreal => "surreal",
            VisualStyle::Minimalist => "minimalist",
        }
    }

    fn prompt_fragment(&self) -> &'static str {
        match self {
            VisualStyle::Realistic => "photorealistic, highly detailed, cinematic lighting",
            VisualStyle::Artistic => "painterly style, impressionistic, artistic interpretation",
            VisualStyle::Surreal => {
                "surreal, dreamlike, Salvador Dali inspired, impossible geometry"
            }
            VisualStyle::Minimalist => "minimalist, clean lines, simple composition, elegant",
        }
    }

    /// Image API `style` parameter.
    fn api_style(&self) -> &'static str {
        match self {
            VisualStyle::Realistic => "natural",
            _ => "vivid",
        }
    }
}

impl std::fmt::Display for VisualStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisualStyle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "realistic" => Ok(VisualStyle::Realistic),
            "artistic" => Ok(VisualStyle::Artistic),
            "surreal" => Ok(VisualStyle::Surreal),
            "minimalist" => Ok(VisualStyle::Minimalist),
            other => Err(AppError::validation(format!(
                "unknown visual style: {}",
                other
            ))),
        }
    }
}

fn mood(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Joy => "bright, warm colors, golden light, uplifting atmosphere",
        Emotion::Sadness => "cool blues and grays, soft lighting, melancholic mood",
        Emotion::Fear => "dark shadows, dramatic lighting, mysterious atmosphere",
        Emotion::Anger => "intense reds and oranges, dynamic energy, powerful composition",
        Emotion::Confusion => "swirling patterns, fragmented elements, surreal perspective",
        Emotion::Neutral => "balanced colors, natural lighting, serene composition",
    }
}

/// Image prompt for a dream rendered in `style`.
pub fn build_image_prompt(dream: &DreamInput, style: VisualStyle) -> String {
    format!(
        "Create a beautiful dream visualization: \"{}\".\n\
         Style: {}.\n\
         Mood: {}.\n\
         The image should capture the essence and atmosphere of this dream with {} emotions.\n\
         Make it mystical, ethereal, and dream-like.\n\
         High quality, detailed, professional artwork.",
        dream.content(),
        style.prompt_fragment(),
        mood(dream.emotion()),
        dream.emotion().lowercase()
    )
}

/// A generated visualization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamVisualization {
    pub image_url: String,
    pub prompt: String,
    pub style: VisualStyle,
}

pub struct DreamVisualizer {
    provider: Arc<dyn ImageProvider>,
    model: String,
}

impl DreamVisualizer {
    pub fn new(provider: Arc<dyn ImageProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Generate one image for `dream`. Exactly one request is made.
    pub async fn visualize(
        &self,
        dream: &DreamInput,
        style: VisualStyle,
    ) -> AppResult<DreamVisualization> {
        let prompt = build_image_prompt(dream, style);
        let request = ImageRequest {
            model: self.model.clone(),
            prompt: prompt.clone(),
            n: 1,
            size: IMAGE_SIZE.to_string(),
            quality: IMAGE_QUALITY.to_string(),
            style: style.api_style().to_string(),
        };

        let image = self.provider.generate_image(request).await.map_err(|e| {
            error!(provider = self.provider.name(), error = %e, "image generation failed");
            AppError::from(e)
        })?;

        info!(%style, "dream visualization generated");
        Ok(DreamVisualization {
            image_url: image.url,
            prompt,
            style,
        })
    }
}
