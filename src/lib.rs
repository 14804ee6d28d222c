//! Somnia - Dream Analysis Library
//!
//! Turns a dream record into a multi-section interpretive report using a
//! hosted chat-completion model, with retries, JSON repair, a deterministic
//! fallback and a write-through analysis cache.
//! It includes:
//! - Analysis pipeline and dream visualization services
//! - Storage layer (SQLite analysis cache, JSON config)
//! - Data models and utilities

pub mod logging;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use models::{AppConfig, CacheEntry, SettingsUpdate};
pub use services::analysis::{AnalysisPipeline, RetryPolicy};
pub use services::visualization::{DreamVisualization, DreamVisualizer, VisualStyle};
pub use somnia_core::{DreamAnalysis, DreamInput, Emotion, PremiumAnalysis, Symbol, Tier};
pub use storage::{AnalysisStore, InMemoryAnalysisStore, SqliteAnalysisStore};
pub use utils::error::{AppError, AppResult};
