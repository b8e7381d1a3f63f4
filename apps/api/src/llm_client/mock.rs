//! Scripted generation client for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{GenerationClient, GenerationMode, LlmError};

type Responder = dyn Fn(&str, GenerationMode) -> Result<String, LlmError> + Send + Sync;

/// Answers each call through a closure and records every prompt it receives.
pub struct MockGenerationClient {
    responder: Box<Responder>,
    calls: Mutex<Vec<(GenerationMode, String)>>,
}

impl MockGenerationClient {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, GenerationMode) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A client whose every call fails like an unreachable service.
    pub fn failing() -> Self {
        Self::new(|_, _| {
            Err(LlmError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            })
        })
    }

    pub fn calls(&self) -> Vec<(GenerationMode, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationClient for MockGenerationClient {
    async fn complete(&self, prompt: &str, mode: GenerationMode) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push((mode, prompt.to_string()));
        (self.responder)(prompt, mode)
    }
}
