//! SQLite Database
//!
//! Embedded database for persisted analyses using rusqlite with r2d2 connection pooling.

use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::ensure_parent_dir;

/// Raw analysis cache row from the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRow {
    pub dream_id: String,
    pub tier: String,
    pub analysis_json: String,
    pub generated_at: i64,
}

/// Type alias for the connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Database service for managing SQLite operations
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create an in-memory database for testing.
    ///
    /// A single pooled connection keeps every caller on the same in-memory
    /// database.
    pub fn new_in_memory() -> AppResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    /// Open (or create) the database file at `path`
    pub fn open(path: &Path) -> AppResult<Self> {
        ensure_parent_dir(path)?;

        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(4)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> AppResult<()> {
        let conn = self.get_connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS analysis_cache (
                dream_id TEXT PRIMARY KEY,
                tier TEXT NOT NULL,
                analysis_json TEXT NOT NULL,
                generated_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> AppResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| AppError::database(format!("Failed to get connection: {}", e)))
    }

    /// Fetch the cached analysis row for a dream
    pub fn get_analysis(&self, dream_id: &str) -> AppResult<Option<AnalysisRow>> {
        let conn = self.get_connection()?;
        let row = conn
            .query_row(
                "SELECT dream_id, tier, analysis_json, generated_at
                 FROM analysis_cache WHERE dream_id = ?1",
                params![dream_id],
                |row| {
                    Ok(AnalysisRow {
                        dream_id: row.get(0)?,
                        tier: row.get(1)?,
                        analysis_json: row.get(2)?,
                        generated_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Insert or replace the row for a dream, but only with a strictly newer
    /// `generated_at`. Returns whether the row was written.
    pub fn upsert_analysis(&self, row: &AnalysisRow) -> AppResult<bool> {
        let conn = self.get_connection()?;
        let changed = conn.execute(
            "INSERT INTO analysis_cache (dream_id, tier, analysis_json, generated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(dream_id) DO UPDATE SET
                tier = excluded.tier,
                analysis_json = excluded.analysis_json,
                generated_at = excluded.generated_at
             WHERE excluded.generated_at > analysis_cache.generated_at",
            params![row.dream_id, row.tier, row.analysis_json, row.generated_at],
        )?;
        Ok(changed > 0)
    }
}
