//! Somnia Core
//!
//! Foundational data model and error types for the Somnia workspace. This
//! crate has no dependency on providers, storage, or the async runtime.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `dream` - Submitted dream record (`DreamInput`, `Emotion`, `Tier`)
//! - `analysis` - Generated report (`DreamAnalysis`, `Symbol`, `PremiumAnalysis`)
//! - `proxy` - Proxy configuration data types shared across workspace crates

pub mod analysis;
pub mod dream;
pub mod error;
pub mod proxy;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Data Model ─────────────────────────────────────────────────────────
pub use analysis::{DreamAnalysis, PremiumAnalysis, Symbol};
pub use dream::{DreamInput, Emotion, Tier, MAX_SLEEP_QUALITY, MIN_SLEEP_QUALITY};

// ── Proxy Types ────────────────────────────────────────────────────────
pub use proxy::{ProxyConfig, ProxyProtocol};
