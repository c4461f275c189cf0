/*!
 * # mdlingo - Markdown translation with a language model
 *
 * A Rust library for translating long Markdown documents while keeping
 * fenced code blocks and line breaks exactly as they were.
 *
 * ## Features
 *
 * - Fenced code blocks are replaced by opaque placeholders before
 *   translation and restored afterwards
 * - Documents are cut into fragments at blank lines, sized for one call
 * - Fragments are translated concurrently and reassembled in order
 * - Fragments the model rejects as too long are halved and retried
 * - Optional concurrency cap and call spacing
 * - ISO 639-1 and ISO 639-2 target language codes
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `markdown`: Code block extraction and fragment splitting
 * - `translation`: Orchestration of model calls:
 *   - `translation::core`: Document-level translation service
 *   - `translation::orchestrator`: Concurrent fragment translation
 *   - `translation::status`: Progress states
 * - `providers`: Model callers:
 *   - `providers::openai`: Streaming OpenAI client
 *   - `providers::mock`: Deterministic caller for tests
 * - `app_config`: Configuration management
 * - `app_controller`: File and folder workflow
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod markdown;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ProviderError, TranslationError};
pub use language_utils::get_language_name;
pub use markdown::{CodeBlockGuard, split_at_blank_lines};
pub use providers::{ApiCaller, ApiOptions};
pub use translation::{TranslationService, TranslationStatus, translate_many};
