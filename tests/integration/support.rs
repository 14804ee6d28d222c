//! Scripted `LlmProvider` for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use somnia::{DreamInput, Emotion};
use somnia_llm::{
    LlmError, LlmProvider, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig,
};

type Responder = Box<dyn Fn(&str) -> LlmResult<LlmResponse> + Send + Sync>;

/// Answers every call through a closure over the user prompt and counts
/// calls, split by tier.
pub struct ScriptedProvider {
    responder: Responder,
    delay: Option<Duration>,
    free_calls: AtomicUsize,
    premium_calls: AtomicUsize,
    config: ProviderConfig,
}

impl ScriptedProvider {
    pub fn new(responder: impl Fn(&str) -> LlmResult<LlmResponse> + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            delay: None,
            free_calls: AtomicUsize::new(0),
            premium_calls: AtomicUsize::new(0),
            config: ProviderConfig::default(),
        }
    }

    /// Same completion for every call.
    pub fn always(content: &'static str) -> Self {
        Self::new(move |_| Ok(LlmResponse::text(content, "scripted")))
    }

    /// Free and premium prompts answered separately.
    pub fn by_tier(
        free: impl Fn() -> LlmResult<LlmResponse> + Send + Sync + 'static,
        premium: impl Fn() -> LlmResult<LlmResponse> + Send + Sync + 'static,
    ) -> Self {
        Self::new(move |prompt| {
            if is_premium_prompt(prompt) {
                premium()
            } else {
                free()
            }
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn free_calls(&self) -> usize {
        self.free_calls.load(Ordering::SeqCst)
    }

    pub fn premium_calls(&self) -> usize {
        self.premium_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.free_calls() + self.premium_calls()
    }
}

fn is_premium_prompt(prompt: &str) -> bool {
    prompt.contains("PREMIUM")
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        _system: Option<String>,
        _request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        if is_premium_prompt(&prompt) {
            self.premium_calls.fetch_add(1, Ordering::SeqCst);
        } else {
            self.free_calls.fetch_add(1, Ordering::SeqCst);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(&prompt)
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

pub fn http_500() -> LlmResult<LlmResponse> {
    Err(LlmError::ServerError {
        message: "internal error".to_string(),
        status: Some(500),
    })
}

pub fn completion(content: &str) -> LlmResult<LlmResponse> {
    Ok(LlmResponse::text(content, "scripted"))
}

pub fn flying_dream() -> DreamInput {
    DreamInput::new("Test", "I flew", Emotion::Joy, 5).unwrap()
}
