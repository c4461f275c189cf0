/*!
 * Translation instructions sent with every fragment.
 *
 * This module provides:
 * - The built-in Markdown translator instruction
 * - Loading a custom instruction template from a file
 */

pub mod templates;

// Re-export main types
pub use templates::PromptTemplate;
