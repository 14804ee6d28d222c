//! Dream Analysis
//!
//! Prompt construction, resilient request execution, response repair,
//! free/premium assembly, fallback synthesis and the cached, single-flight
//! pipeline that ties them together.

pub mod assembler;
pub mod executor;
pub mod fallback;
pub mod payload;
pub mod pipeline;
pub mod prompts;
pub mod sanitizer;

#[cfg(test)]
pub(crate) mod test_support;

pub use assembler::{AnalysisAssembler, Assembly, Source};
pub use executor::{
    AttemptFailure, AttemptOutcome, GenerationOutcome, RequestExecutor, RetryPolicy,
};
pub use payload::AnalysisPayload;
pub use pipeline::AnalysisPipeline;
pub use prompts::{build_analysis_prompt, PERSONA_SYSTEM_PROMPT};
pub use sanitizer::{sanitize_response, SanitizeError};
