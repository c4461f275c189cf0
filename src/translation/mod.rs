/*!
 * Translation of Markdown documents using a language model.
 *
 * This module contains the core functionality for translating documents
 * fragment by fragment. It is split into several submodules:
 *
 * - `core`: The translation service, entry point for whole documents
 * - `orchestrator`: Concurrent fragment translation with split recovery
 * - `concurrency`: Request throttling
 * - `status`: Progress states and their rendering
 * - `prompts`: Instruction templates
 */

// Re-export main types for easier usage
pub use self::concurrency::RequestThrottle;
pub use self::core::TranslationService;
pub use self::orchestrator::{Orchestrator, TranslationReport, translate_many};
pub use self::prompts::PromptTemplate;
pub use self::status::{TranslationStatus, render_children};

// Submodules
pub mod concurrency;
pub mod core;
pub mod orchestrator;
pub mod prompts;
pub mod status;
