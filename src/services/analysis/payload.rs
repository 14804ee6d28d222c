//! Analysis Payload
//!
//! Schema-shaped view of one model response. The sanitized JSON is untrusted,
//! so it is read field by field: camelCase keys first, snake_case variants
//! accepted, wrong types treated as absent. Missing fields are defaulted when
//! the payload is turned into report sections; they never cause a retry.

use serde_json::{Map, Value};
use somnia_core::{PremiumAnalysis, Symbol};

/// Summary used when the model omits one.
pub const DEFAULT_SUMMARY: &str = "Analysis generated successfully.";
/// Interpretation used when the model omits one.
pub const DEFAULT_INTERPRETATION: &str = "Dream interpretation completed.";

/// Premium sections as returned by the model; any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PremiumSections {
    pub psychological: Option<String>,
    pub life_connections: Option<String>,
    pub actionable_insights: Option<String>,
    pub future_implications: Option<String>,
}

impl PremiumSections {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            psychological: string_field(obj, &["psychological"]),
            life_connections: string_field(obj, &["lifeConnections", "life_connections"]),
            actionable_insights: string_field(
                obj,
                &["actionableInsights", "actionable_insights"],
            ),
            future_implications: string_field(
                obj,
                &["futureImplications", "future_implications"],
            ),
        }
    }

    /// Number of the four sections the model actually supplied.
    pub fn present_count(&self) -> usize {
        [
            &self.psychological,
            &self.life_connections,
            &self.actionable_insights,
            &self.future_implications,
        ]
        .iter()
        .filter(|s| s.is_some())
        .count()
    }
}

/// Coerced content of one model response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisPayload {
    pub summary: Option<String>,
    pub symbols: Vec<Symbol>,
    pub interpretation: Option<String>,
    pub reflection_questions: Vec<String>,
    pub premium: Option<PremiumSections>,
}

impl AnalysisPayload {
    /// Read a payload out of a sanitized JSON value. A non-object value
    /// yields an empty payload.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        Self {
            summary: string_field(obj, &["summary"]),
            symbols: symbols_field(obj),
            interpretation: string_field(obj, &["interpretation"]),
            reflection_questions: string_list_field(
                obj,
                &["reflectionQuestions", "reflection_questions"],
            ),
            premium: lookup(obj, &["premiumAnalysis", "premium_analysis"])
                .and_then(Value::as_object)
                .map(PremiumSections::from_object),
        }
    }

    pub fn summary_or_default(&self) -> String {
        self.summary
            .clone()
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_string())
    }

    pub fn interpretation_or_default(&self) -> String {
        self.interpretation
            .clone()
            .unwrap_or_else(|| DEFAULT_INTERPRETATION.to_string())
    }

    /// Complete premium sections, taking each missing key from `fallback`.
    pub fn premium_or(&self, fallback: &PremiumAnalysis) -> PremiumAnalysis {
        let sections = self.premium.clone().unwrap_or_default();
        PremiumAnalysis {
            psychological: sections
                .psychological
                .unwrap_or_else(|| fallback.psychological.clone()),
            life_connections: sections
                .life_connections
                .unwrap_or_else(|| fallback.life_connections.clone()),
            actionable_insights: sections
                .actionable_insights
                .unwrap_or_else(|| fallback.actionable_insights.clone()),
            future_implications: sections
                .future_implications
                .unwrap_or_else(|| fallback.future_implications.clone()),
        }
    }
}

// ============================================================================
// Field helpers
// ============================================================================

fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

/// Non-blank string field.
fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    lookup(obj, keys)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Array of strings; non-string and blank entries are skipped.
fn string_list_field(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    lookup(obj, keys)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Symbols in model order. Entries without a name are skipped; a missing
/// meaning becomes an empty string.
fn symbols_field(obj: &Map<String, Value>) -> Vec<Symbol> {
    let Some(items) = lookup(obj, &["symbols"]).and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let entry = item.as_object()?;
            let name = string_field(entry, &["name"])?;
            let meaning = string_field(entry, &["meaning"]).unwrap_or_default();
            Some(Symbol::new(name, meaning))
        })
        .collect()
}
