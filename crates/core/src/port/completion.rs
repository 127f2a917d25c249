// Generative-Text API Port

use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Fixed sampling configuration sent with every completion request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplingConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    /// Candidates generated server-side; the best one is returned
    pub best_of: u32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 256,
            temperature: 1.0,
            top_p: 1.0,
            best_of: 5,
            frequency_penalty: 1.0,
            presence_penalty: 0.0,
        }
    }
}

/// Sends a prompt and returns the text of the first choice
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// # Errors
    /// - AppError::UpstreamGeneration if the call fails or returns no choices
    async fn complete(&self, prompt: &str) -> Result<String>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Mock CompletionClient recording prompts and in-flight calls
    pub struct MockCompletionClient {
        response: std::result::Result<String, String>,
        delay: Option<Duration>,
        prompts: Arc<Mutex<Vec<String>>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockCompletionClient {
        pub fn new_success(text: impl Into<String>) -> Self {
            Self {
                response: Ok(text.into()),
                delay: None,
                prompts: Arc::new(Mutex::new(Vec::new())),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self {
                response: Err(message.into()),
                ..Self::new_success("")
            }
        }

        /// Hold every call for `delay` before answering
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        /// Highest number of calls observed running at the same time
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionClient for MockCompletionClient {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.response
                .clone()
                .map_err(AppError::UpstreamGeneration)
        }
    }
}
