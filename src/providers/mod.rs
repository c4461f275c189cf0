/*!
 * Language model callers.
 *
 * The translation core only needs one capability from a model: send a
 * fragment with an instruction, observe streamed progress, receive the
 * translated text or a failure. This module defines that seam and its
 * implementations:
 * - `openai`: Streaming OpenAI chat completions client
 * - `mock`: Deterministic caller for tests and benchmarks
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::ProviderError;
use crate::translation::status::TranslationStatus;

/// Callback receiving progress updates while a call is running
pub type StatusCallback<'a> = &'a (dyn Fn(TranslationStatus) + Send + Sync);

/// Model parameters passed through unchanged to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiOptions {
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
}

impl ApiOptions {
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            temperature,
        }
    }
}

/// Common trait for everything that can translate one fragment
///
/// Implementations may report any number of `Pending` updates through
/// `on_status` before returning. A failure that means "the input is too
/// large" must be recognisable through [`ProviderError::is_input_too_long`];
/// the orchestrator recovers from those by splitting the fragment.
#[async_trait]
pub trait ApiCaller: Send + Sync + Debug {
    /// Translate `text` following `instruction`
    async fn call(
        &self,
        text: &str,
        instruction: &str,
        options: &ApiOptions,
        on_status: StatusCallback<'_>,
    ) -> Result<String, ProviderError>;
}

pub mod mock;
pub mod openai;
