//! Dream Input Model
//!
//! The structured record a user submits for analysis, plus the emotion and
//! tier enums that steer prompt selection.
//!
//! A `DreamInput` can only be obtained through [`DreamInput::new`] or
//! deserialization, both of which validate, so downstream code never has to
//! re-check the narrative or the sleep-quality range.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Lowest accepted sleep-quality rating.
pub const MIN_SLEEP_QUALITY: u8 = 1;
/// Highest accepted sleep-quality rating.
pub const MAX_SLEEP_QUALITY: u8 = 5;

/// Dominant emotion the dreamer tagged the dream with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Joy,
    Sadness,
    Fear,
    Anger,
    Confusion,
    Neutral,
}

impl Emotion {
    /// All emotions in display order.
    pub const ALL: [Emotion; 6] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Fear,
        Emotion::Anger,
        Emotion::Confusion,
        Emotion::Neutral,
    ];

    /// Capitalized label, as stored and shown to the model.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "Joy",
            Emotion::Sadness => "Sadness",
            Emotion::Fear => "Fear",
            Emotion::Anger => "Anger",
            Emotion::Confusion => "Confusion",
            Emotion::Neutral => "Neutral",
        }
    }

    /// Lowercase label for use inside sentences.
    pub fn lowercase(&self) -> String {
        self.as_str().to_lowercase()
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| CoreError::parse(format!("unknown emotion: {}", s)))
    }
}

/// Request class. Each tier has its own prompt template and response schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Premium,
}

impl Tier {
    pub fn is_premium(&self) -> bool {
        matches!(self, Tier::Premium)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Free => write!(f, "free"),
            Tier::Premium => write!(f, "premium"),
        }
    }
}

impl FromStr for Tier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "premium" => Ok(Tier::Premium),
            other => Err(CoreError::parse(format!("unknown tier: {}", other))),
        }
    }
}

/// A dream as submitted to the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDreamInput")]
pub struct DreamInput {
    title: String,
    content: String,
    emotion: Emotion,
    sleep_quality: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<String>,
}

/// Unvalidated wire shape; converted through `TryFrom` on deserialization.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDreamInput {
    #[serde(default)]
    title: String,
    content: String,
    emotion: Emotion,
    sleep_quality: u8,
    #[serde(default)]
    context: Option<String>,
}

impl TryFrom<RawDreamInput> for DreamInput {
    type Error = CoreError;

    fn try_from(raw: RawDreamInput) -> Result<Self, Self::Error> {
        let dream = DreamInput::new(raw.title, raw.content, raw.emotion, raw.sleep_quality)?;
        Ok(match raw.context {
            Some(context) => dream.with_context(context),
            None => dream,
        })
    }
}

impl DreamInput {
    /// Create a validated dream input.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        emotion: Emotion,
        sleep_quality: u8,
    ) -> CoreResult<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(CoreError::validation("dream content must not be empty"));
        }
        if !(MIN_SLEEP_QUALITY..=MAX_SLEEP_QUALITY).contains(&sleep_quality) {
            return Err(CoreError::validation(format!(
                "sleep quality must be between {} and {}, got {}",
                MIN_SLEEP_QUALITY, MAX_SLEEP_QUALITY, sleep_quality
            )));
        }

        Ok(Self {
            title: title.into(),
            content,
            emotion,
            sleep_quality,
            context: None,
        })
    }

    /// Attach optional life context. Blank context is dropped.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = if context.trim().is_empty() {
            None
        } else {
            Some(context)
        };
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn emotion(&self) -> Emotion {
        self.emotion
    }

    pub fn sleep_quality(&self) -> u8 {
        self.sleep_quality
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Whether the night's rest was rated 4 or 5.
    pub fn slept_well(&self) -> bool {
        self.sleep_quality >= 4
    }
}
