//! Services
//!
//! Business logic for dream analysis and visualization.

pub mod analysis;
pub mod visualization;
