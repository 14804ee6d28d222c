//! Data Models
//!
//! Domain types shared across services. The dream and analysis records live in
//! `somnia-core` and are re-exported here.

pub mod cache;
pub mod settings;

pub use cache::CacheEntry;
pub use settings::{AppConfig, EndpointSettings, SettingsUpdate};
pub use somnia_core::{DreamAnalysis, DreamInput, Emotion, PremiumAnalysis, Symbol, Tier};
