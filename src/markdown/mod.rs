/*!
 * Markdown handling for translation.
 *
 * - `fence`: Recognition of fenced code block delimiters
 * - `code_blocks`: Swapping code blocks for placeholders and back
 * - `splitter`: Cutting text into model-sized fragments at blank lines
 * - `line_endings`: CRLF to LF and back
 */

pub use self::code_blocks::{CodeBlock, CodeBlockGuard, PLACEHOLDER_KEYWORD};
pub use self::splitter::{estimate_tokens, paragraph_blocks, split_at_blank_lines, split_at_blank_lines_by, BLANK_LINE};

pub mod code_blocks;
pub mod fence;
pub mod line_endings;
pub mod splitter;
