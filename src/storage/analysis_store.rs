//! Analysis Store
//!
//! Async key-value store for generated analyses, keyed by dream id.
//! Writes are whole-entry replacements guarded by a strictly-newer
//! `generated_at`.

use std::collections::HashMap;

use async_trait::async_trait;
use somnia_core::Tier;
use tokio::sync::RwLock;

use super::database::{AnalysisRow, Database};
use crate::models::CacheEntry;
use crate::utils::error::{AppError, AppResult};

/// Persisted analysis store
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Look up the entry for a dream.
    async fn get(&self, dream_id: &str) -> AppResult<Option<CacheEntry>>;

    /// Write an entry. Returns `false` when an entry that is at least as new
    /// already exists and the write was skipped.
    async fn put(&self, entry: CacheEntry) -> AppResult<bool>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store, used in tests and one-shot runs.
#[derive(Debug, Default)]
pub struct InMemoryAnalysisStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl AnalysisStore for InMemoryAnalysisStore {
    async fn get(&self, dream_id: &str) -> AppResult<Option<CacheEntry>> {
        Ok(self.entries.read().await.get(dream_id).cloned())
    }

    async fn put(&self, entry: CacheEntry) -> AppResult<bool> {
        let mut entries = self.entries.write().await;
        if let Some(existing) = entries.get(&entry.dream_id) {
            if !entry.supersedes(existing) {
                return Ok(false);
            }
        }
        entries.insert(entry.dream_id.clone(), entry);
        Ok(true)
    }
}

// ============================================================================
// SQLite store
// ============================================================================

/// Durable store over the `analysis_cache` table.
#[derive(Clone)]
pub struct SqliteAnalysisStore {
    db: Database,
}

impl SqliteAnalysisStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn row_to_entry(row: AnalysisRow) -> AppResult<CacheEntry> {
        let tier = row.tier.parse::<Tier>()?;
        let analysis = serde_json::from_str(&row.analysis_json)?;
        Ok(CacheEntry {
            dream_id: row.dream_id,
            analysis,
            tier,
            generated_at: row.generated_at,
        })
    }

    fn entry_to_row(entry: &CacheEntry) -> AppResult<AnalysisRow> {
        let analysis_json = serde_json::to_string(&entry.analysis).map_err(|e| {
            AppError::internal(format!("Failed to serialize analysis: {}", e))
        })?;
        Ok(AnalysisRow {
            dream_id: entry.dream_id.clone(),
            tier: entry.tier.to_string(),
            analysis_json,
            generated_at: entry.generated_at,
        })
    }
}

#[async_trait]
impl AnalysisStore for SqliteAnalysisStore {
    async fn get(&self, dream_id: &str) -> AppResult<Option<CacheEntry>> {
        let db = self.db.clone();
        let dream_id = dream_id.to_string();
        let row = tokio::task::spawn_blocking(move || db.get_analysis(&dream_id)).await??;
        row.map(Self::row_to_entry).transpose()
    }

    async fn put(&self, entry: CacheEntry) -> AppResult<bool> {
        let row = Self::entry_to_row(&entry)?;
        let db = self.db.clone();
        let written = tokio::task::spawn_blocking(move || db.upsert_analysis(&row)).await??;
        Ok(written)
    }
}
