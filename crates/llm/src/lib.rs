//! Somnia LLM
//!
//! Provider abstraction for the hosted OpenAI-compatible endpoints:
//! - Chat completions (`OpenAIProvider`)
//! - Image generations (`OpenAIImageProvider`)
//!
//! Also includes the HTTP client factory and the wire/error types.

pub mod http_client;
pub mod image;
pub mod openai;
pub mod provider;
pub mod types;

// Re-export main types
pub use http_client::build_http_client;
pub use image::{
    GeneratedImage, ImageProvider, ImageRequest, OpenAIImageProvider, DEFAULT_IMAGE_MODEL,
};
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
pub use types::*;
