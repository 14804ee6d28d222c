//! Request Executor
//!
//! One tier's generation round: send persona + prompt, sanitize the
//! completion, and retry any failure with linear backoff. Attempts are
//! modelled as values rather than errors so the caller can log and count them.

use std::sync::Arc;
use std::time::Duration;

use somnia_core::Tier;
use somnia_llm::{LlmError, LlmProvider, LlmRequestOptions, Message, ResponseFormat};
use tracing::{debug, error, info, warn};

use super::payload::AnalysisPayload;
use super::prompts::PERSONA_SYSTEM_PROMPT;
use super::sanitizer::{sanitize_response, SanitizeError};

/// Sampling constants sent with every analysis request.
pub const MAX_TOKENS: u32 = 3000;
pub const TEMPERATURE: f32 = 0.8;
pub const TOP_P: f32 = 0.95;
pub const PRESENCE_PENALTY: f32 = 0.1;
pub const FREQUENCY_PENALTY: f32 = 0.1;

/// Request options for an analysis call.
pub fn analysis_request_options() -> LlmRequestOptions {
    LlmRequestOptions {
        max_tokens_override: Some(MAX_TOKENS),
        temperature_override: Some(TEMPERATURE),
        top_p: Some(TOP_P),
        presence_penalty: Some(PRESENCE_PENALTY),
        frequency_penalty: Some(FREQUENCY_PENALTY),
        response_format: Some(ResponseFormat::JsonObject),
    }
}

/// Attempt cap and backoff step. The delay after attempt `k` is `k * base_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given (1-based) failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Classified failure of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// No HTTP response was received.
    Transport { message: String },
    /// The endpoint answered with a non-success status.
    Http {
        status: Option<u16>,
        message: String,
    },
    /// The completion contained no `{`.
    NoJsonFound,
    /// The completion (or its envelope) could not be parsed, even after repair.
    InvalidJson { message: String },
    /// The completion was missing or blank.
    EmptyCompletion,
}

impl AttemptFailure {
    /// Short classification label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptFailure::Transport { .. } => "transport",
            AttemptFailure::Http { .. } => "http",
            AttemptFailure::NoJsonFound => "no_json_found",
            AttemptFailure::InvalidJson { .. } => "invalid_json",
            AttemptFailure::EmptyCompletion => "empty_completion",
        }
    }
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptFailure::Transport { message } => write!(f, "transport failure: {}", message),
            AttemptFailure::Http {
                status: Some(status),
                message,
            } => write!(f, "HTTP {}: {}", status, message),
            AttemptFailure::Http {
                status: None,
                message,
            } => write!(f, "HTTP failure: {}", message),
            AttemptFailure::NoJsonFound => write!(f, "no JSON object in completion"),
            AttemptFailure::InvalidJson { message } => write!(f, "invalid JSON: {}", message),
            AttemptFailure::EmptyCompletion => write!(f, "empty completion"),
        }
    }
}

impl From<LlmError> for AttemptFailure {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::NetworkError { message } => AttemptFailure::Transport { message },
            LlmError::ParseError { message } => AttemptFailure::InvalidJson { message },
            other => AttemptFailure::Http {
                status: other.status_code(),
                message: other.to_string(),
            },
        }
    }
}

impl From<SanitizeError> for AttemptFailure {
    fn from(err: SanitizeError) -> Self {
        match err {
            SanitizeError::NoJsonFound => AttemptFailure::NoJsonFound,
            SanitizeError::InvalidJson { message, .. } => AttemptFailure::InvalidJson { message },
        }
    }
}

/// Result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(AnalysisPayload),
    Retryable(AttemptFailure),
}

/// Result of a whole round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success {
        payload: AnalysisPayload,
        attempts: u32,
    },
    Exhausted {
        failures: Vec<AttemptFailure>,
    },
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success { .. })
    }
}

/// Executes generation rounds against a chat-completion provider.
#[derive(Clone)]
pub struct RequestExecutor {
    provider: Arc<dyn LlmProvider>,
    policy: RetryPolicy,
}

impl RequestExecutor {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self::with_policy(provider, RetryPolicy::default())
    }

    pub fn with_policy(provider: Arc<dyn LlmProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Make exactly one call and classify the result.
    pub async fn attempt(&self, prompt: &str) -> AttemptOutcome {
        let response = match self
            .provider
            .send_message(
                vec![Message::user(prompt)],
                Some(PERSONA_SYSTEM_PROMPT.to_string()),
                analysis_request_options(),
            )
            .await
        {
            Ok(response) => response,
            Err(e) => return AttemptOutcome::Retryable(e.into()),
        };

        if response.is_truncated() {
            debug!(
                model = %response.model,
                "completion hit the token limit; relying on repair"
            );
        }

        let Some(content) = response.content.filter(|c| !c.trim().is_empty()) else {
            return AttemptOutcome::Retryable(AttemptFailure::EmptyCompletion);
        };

        match sanitize_response(&content) {
            Ok(value) => AttemptOutcome::Success(AnalysisPayload::from_value(&value)),
            Err(e) => {
                if let SanitizeError::InvalidJson { candidate, .. } = &e {
                    debug!(
                        candidate_len = candidate.len(),
                        "sanitized candidate still invalid"
                    );
                }
                AttemptOutcome::Retryable(e.into())
            }
        }
    }

    /// Run up to `max_attempts` attempts, sleeping `k * base_delay` after
    /// failed attempt `k` unless it was the last.
    pub async fn execute(&self, tier: Tier, prompt: &str) -> GenerationOutcome {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut failures = Vec::new();

        for attempt in 1..=max_attempts {
            match self.attempt(prompt).await {
                AttemptOutcome::Success(payload) => {
                    info!(
                        %tier,
                        attempt,
                        symbols = payload.symbols.len(),
                        "analysis generated"
                    );
                    return GenerationOutcome::Success {
                        payload,
                        attempts: attempt,
                    };
                }
                AttemptOutcome::Retryable(failure) => {
                    warn!(
                        %tier,
                        attempt,
                        max_attempts,
                        kind = failure.kind(),
                        error = %failure,
                        "analysis attempt failed"
                    );
                    failures.push(failure);

                    if attempt < max_attempts {
                        tokio::time::sleep(self.policy.delay_after(attempt)).await;
                    }
                }
            }
        }

        error!(
            %tier,
            attempts = failures.len(),
            provider = self.provider.name(),
            "all analysis attempts failed"
        );
        GenerationOutcome::Exhausted { failures }
    }
}
