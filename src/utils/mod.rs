//! Utilities
//!
//! Error types and filesystem paths.

pub mod error;
pub mod paths;

pub use error::{AppError, AppResult};
