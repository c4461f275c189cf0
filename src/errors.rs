/*!
 * Error types for the mdlingo application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Messages that mean the model rejected the input as too large for its context,
/// or that the stream broke off while reading a long answer.
static INPUT_TOO_LONG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)reduce the length|stream read error|context length|maximum context")
        .expect("Invalid input-too-long regex")
});

/// Errors that can occur when a provider API is called
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The response stream broke off before completion
    #[error("Stream read error: {0}")]
    StreamError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The model refused the input because it exceeds its context window
    #[error("Input too long: {0}")]
    InputTooLong(String),
}

impl ProviderError {
    /// Whether this failure means the fragment was too large for the model.
    ///
    /// Such failures are recovered by splitting the fragment and retrying the
    /// halves; every other failure aborts the whole request.
    pub fn is_input_too_long(&self) -> bool {
        match self {
            Self::InputTooLong(_) | Self::StreamError(_) => true,
            other => INPUT_TOO_LONG_REGEX.is_match(&other.to_string()),
        }
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Required configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The orchestration stopped without producing a result
    #[error("Translation aborted: {0}")]
    Aborted(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Translation(TranslationError::Configuration(_)) => 2,
            _ => 1,
        }
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        let error = match error.downcast::<TranslationError>() {
            Ok(translation) => return Self::Translation(translation),
            Err(other) => other,
        };
        match error.downcast::<std::io::Error>() {
            Ok(io) => Self::File(io.to_string()),
            Err(other) => Self::Unknown(format!("{:#}", other)),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
