//! Scripted provider used by the analysis unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use somnia_llm::{
    LlmError, LlmProvider, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig,
};

/// One recorded `send_message` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub system: Option<String>,
    pub options: LlmRequestOptions,
}

type Responder = Box<dyn Fn(&str) -> LlmResult<LlmResponse> + Send + Sync>;

enum Script {
    Queue(Mutex<VecDeque<LlmResult<LlmResponse>>>),
    Responder(Responder),
}

pub struct MockLlmProvider {
    script: Script,
    delay: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
    config: ProviderConfig,
}

impl MockLlmProvider {
    /// Responses are returned in order; an empty queue yields an error.
    pub fn new(responses: Vec<LlmResult<LlmResponse>>) -> Self {
        Self::with_script(Script::Queue(Mutex::new(responses.into())))
    }

    /// Responses computed from the user prompt.
    pub fn responding(f: impl Fn(&str) -> LlmResult<LlmResponse> + Send + Sync + 'static) -> Self {
        Self::with_script(Script::Responder(Box::new(f)))
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            delay: None,
            calls: Mutex::new(Vec::new()),
            config: ProviderConfig::default(),
        }
    }

    /// Sleep before every response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let prompt = messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.clone(),
            system,
            options: request_options,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.script {
            Script::Queue(queue) => queue.lock().unwrap().pop_front().unwrap_or_else(|| {
                Err(LlmError::Other {
                    message: "No more mock responses available".to_string(),
                })
            }),
            Script::Responder(f) => f(&prompt),
        }
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}
