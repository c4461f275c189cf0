/*!
 * Tests for error classification
 */

use mdlingo::errors::{AppError, ProviderError, TranslationError};

/// Failures the orchestrator recovers from by splitting
#[test]
fn test_isInputTooLong_withTooLongFailures_shouldMatch() {
    let cases = [
        ProviderError::InputTooLong("too long".to_string()),
        ProviderError::StreamError("reset".to_string()),
        ProviderError::ApiError {
            status_code: 400,
            message: "This model's maximum context length is 4097 tokens".to_string(),
        },
        ProviderError::RequestFailed("please REDUCE THE LENGTH of the messages".to_string()),
    ];
    for error in cases {
        assert!(error.is_input_too_long(), "{:?}", error);
    }
}

/// Failures that abort the request
#[test]
fn test_isInputTooLong_withOtherFailures_shouldNotMatch() {
    let cases = [
        ProviderError::AuthenticationError("bad key".to_string()),
        ProviderError::RateLimitExceeded("slow down".to_string()),
        ProviderError::ConnectionError("refused".to_string()),
        ProviderError::ApiError {
            status_code: 500,
            message: "internal".to_string(),
        },
    ];
    for error in cases {
        assert!(!error.is_input_too_long(), "{:?}", error);
    }
}

/// Error messages carry their category
#[test]
fn test_errorDisplay_withNestedErrors_shouldIncludeCause() {
    let error = TranslationError::from(ProviderError::AuthenticationError("bad key".to_string()));
    assert_eq!(
        error.to_string(),
        "Provider error: Authentication error: bad key"
    );

    let app = AppError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
    assert!(matches!(app, AppError::File(_)));
    assert_eq!(app.exit_code(), 1);
}
