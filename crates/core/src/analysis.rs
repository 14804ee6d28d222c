//! Dream Analysis Model
//!
//! The multi-section report produced by the analysis pipeline. Serialized with
//! camelCase keys, matching the record format the mobile client persists.

use serde::{Deserialize, Serialize};

/// A dream symbol and its interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub meaning: String,
}

impl Symbol {
    pub fn new(name: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meaning: meaning.into(),
        }
    }
}

/// Premium-only report sections. Always carried as a complete set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumAnalysis {
    pub psychological: String,
    pub life_connections: String,
    pub actionable_insights: String,
    pub future_implications: String,
}

/// Complete analysis for one dream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamAnalysis {
    pub dream_title: String,
    /// Human-readable generation date, stamped at assembly time.
    pub date: String,
    pub summary: String,
    #[serde(default)]
    pub symbols: Vec<Symbol>,
    pub interpretation: String,
    #[serde(default)]
    pub reflection_questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium_analysis: Option<PremiumAnalysis>,
}

impl DreamAnalysis {
    pub fn has_premium(&self) -> bool {
        self.premium_analysis.is_some()
    }
}
