/*!
 * Mock caller implementations for testing.
 *
 * This module provides a mock caller that simulates different model behaviours:
 * - `MockProvider::working()` - Always succeeds with a marked translation
 * - `MockProvider::echo()` - Always succeeds, returning the input unchanged
 * - `MockProvider::too_long_above(n)` - Rejects inputs longer than `n` characters
 * - `MockProvider::rate_limited()` - Always fails with a rate limit error
 * - `MockProvider::failing()` - Always fails with a non-recoverable error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{ApiCaller, ApiOptions, StatusCallback};
use crate::translation::status::TranslationStatus;

/// One call as seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// The fragment text
    pub text: String,
    /// The instruction sent with it
    pub instruction: String,
    /// The model options sent with it
    pub options: ApiOptions,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with `[TRANSLATED] <text>`
    Working,
    /// Always succeeds with the input unchanged
    Echo,
    /// Reports "reduce the length" for inputs over `max_chars`, echoes the rest
    TooLongAbove { max_chars: usize },
    /// Fails every Nth request with a server error (every request when N is 0)
    Intermittent { fail_every: usize },
    /// Always fails with a rate limit error
    RateLimited,
    /// Always fails with a server error
    Failing,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every call received, shared between clones
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str) -> String>,
    /// Simulated latency per call, computed from the input (optional)
    latency: Option<fn(&str) -> u64>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
            latency: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock provider that returns its input
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a mock provider that rejects inputs longer than `max_chars`
    pub fn too_long_above(max_chars: usize) -> Self {
        Self::new(MockBehavior::TooLongAbove { max_chars })
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a mock provider that is always over its rate limit
    pub fn rate_limited() -> Self {
        Self::new(MockBehavior::RateLimited)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Set a custom response generator for successful calls
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Delay each call by `latency(text)` milliseconds
    pub fn with_latency(mut self, latency: fn(&str) -> u64) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of all calls received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    fn respond(&self, text: &str, default: impl FnOnce(&str) -> String) -> String {
        match self.custom_response {
            Some(generator) => generator(text),
            None => default(text),
        }
    }
}

#[async_trait]
impl ApiCaller for MockProvider {
    async fn call(
        &self,
        text: &str,
        instruction: &str,
        options: &ApiOptions,
        on_status: StatusCallback<'_>,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(RecordedCall {
            text: text.to_string(),
            instruction: instruction.to_string(),
            options: options.clone(),
        });

        if let Some(latency) = self.latency {
            tokio::time::sleep(Duration::from_millis(latency(text))).await;
        }

        let result = match self.behavior {
            MockBehavior::Working => Ok(self.respond(text, |t| format!("[TRANSLATED] {}", t))),

            MockBehavior::Echo => Ok(self.respond(text, str::to_string)),

            MockBehavior::TooLongAbove { max_chars } => {
                if text.chars().count() > max_chars {
                    Err(ProviderError::ApiError {
                        status_code: 400,
                        message: format!(
                            "This model's maximum context length is {} characters. Please reduce the length of the messages.",
                            max_chars
                        ),
                    })
                } else {
                    Ok(self.respond(text, str::to_string))
                }
            }

            MockBehavior::Intermittent { fail_every } => {
                let fail_every = fail_every.max(1);
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.respond(text, |t| format!("[TRANSLATED] {}", t)))
                }
            }

            MockBehavior::RateLimited => Err(ProviderError::RateLimitExceeded(format!(
                "Rate limit reached for {}",
                options.model
            ))),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),
        };

        // Simulate one streamed chunk before completion
        if let Ok(translation) = &result {
            let excerpt: String = translation.chars().take(8).collect();
            on_status(TranslationStatus::pending(excerpt));
        }

        result
    }
}
