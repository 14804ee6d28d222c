//! Storage Layer
//!
//! Handles all data persistence: the SQLite analysis cache and JSON config.

pub mod analysis_store;
pub mod config;
pub mod database;

pub use analysis_store::{AnalysisStore, InMemoryAnalysisStore, SqliteAnalysisStore};
pub use config::ConfigService;
pub use database::Database;
