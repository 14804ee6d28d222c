//! Cache Entry Model
//!
//! One persisted analysis per dream id.

use serde::{Deserialize, Serialize};
use somnia_core::{DreamAnalysis, Tier};

/// A persisted analysis record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub dream_id: String,
    pub analysis: DreamAnalysis,
    pub tier: Tier,
    /// UTC milliseconds since the epoch
    pub generated_at: i64,
}

impl CacheEntry {
    /// Whether this entry may replace `existing`.
    pub fn supersedes(&self, existing: &CacheEntry) -> bool {
        self.generated_at > existing.generated_at
    }
}
