/*!
 * Code block protection.
 *
 * Fenced code blocks are lifted out of the document before translation and
 * replaced by single-line placeholders that the model is told to leave alone.
 * After translation the placeholders are swapped back for the original blocks,
 * in order.
 */

use log::{debug, warn};
use rand::Rng;
use std::borrow::Cow;

use super::fence::Fence;

/// Keyword every placeholder starts with; the translation instruction refers to it
pub const PLACEHOLDER_KEYWORD: &str = "omittedCodeBlock";

/// Nonce regeneration attempts before giving up on finding an unused one
const MAX_NONCE_ATTEMPTS: usize = 16;

/// A fenced code block lifted out of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Position of the block among all extracted blocks
    pub index: usize,
    /// The block verbatim, fence lines included, without a trailing line break
    pub content: String,
}

/// Extracts fenced code blocks and restores them after translation.
///
/// Each guard carries a random nonce that is part of every placeholder it
/// writes. The nonce is checked against the document, so a placeholder can
/// never be confused with text that was already there.
#[derive(Debug, Clone)]
pub struct CodeBlockGuard {
    /// `omittedCodeBlock-<nonce>-`, shared by all placeholders of this guard
    prefix: String,
}

impl CodeBlockGuard {
    /// Create a guard whose placeholders do not occur anywhere in `document`
    pub fn for_document(document: &str) -> Self {
        let mut rng = rand::rng();
        let mut guard = Self::with_nonce(&format!("{:08x}", rng.random::<u32>()));

        for _ in 0..MAX_NONCE_ATTEMPTS {
            if !document.contains(&guard.prefix) {
                return guard;
            }
            debug!("Placeholder prefix {} already present, regenerating", guard.prefix);
            guard = Self::with_nonce(&format!("{:08x}", rng.random::<u32>()));
        }

        // 16 collisions in a row on a 32-bit nonce means the document is built
        // to collide; widen the nonce instead of looping forever
        Self::with_nonce(&format!("{:016x}", rng.random::<u64>()))
    }

    /// Create a guard with a fixed nonce
    pub fn with_nonce(nonce: &str) -> Self {
        Self {
            prefix: format!("{}-{}-", PLACEHOLDER_KEYWORD, nonce),
        }
    }

    /// The placeholder token written in place of block `index`
    pub fn placeholder(&self, index: usize) -> String {
        format!("{}{}", self.prefix, index)
    }

    /// Replace every complete fenced region with a placeholder line.
    ///
    /// Returns the stripped text and the blocks in encounter order. A fence
    /// that is never closed is left in place as ordinary text.
    pub fn extract(&self, document: &str) -> (String, Vec<CodeBlock>) {
        let lines: Vec<&str> = document.split('\n').collect();
        let mut output: Vec<Cow<str>> = Vec::with_capacity(lines.len());
        let mut blocks = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            let closing = Fence::opening(line)
                .and_then(|fence| (i + 1..lines.len()).find(|&j| fence.is_closed_by(lines[j])));

            match closing {
                Some(end) => {
                    let indent = &line[..line.len() - line.trim_start_matches(' ').len()];
                    let index = blocks.len();
                    output.push(Cow::Owned(format!("{}{}", indent, self.placeholder(index))));
                    blocks.push(CodeBlock {
                        index,
                        content: lines[i..=end].join("\n"),
                    });
                    i = end + 1;
                }
                None => {
                    output.push(Cow::Borrowed(line));
                    i += 1;
                }
            }
        }

        debug!("Extracted {} code block(s)", blocks.len());
        (output.join("\n"), blocks)
    }

    /// Put the blocks back in place of the placeholder lines.
    ///
    /// The Nth line containing a placeholder is replaced, as a whole, by the
    /// Nth block. Placeholders and blocks are expected to pair up exactly.
    pub fn restore(&self, text: &str, blocks: &[CodeBlock]) -> String {
        let mut remaining = blocks.iter();
        let mut placeholders = 0;

        let output: Vec<Cow<str>> = text
            .split('\n')
            .map(|line| {
                if !line.contains(&self.prefix) {
                    return Cow::Borrowed(line);
                }
                placeholders += 1;
                match remaining.next() {
                    Some(block) => Cow::Borrowed(block.content.as_str()),
                    None => Cow::Borrowed(line),
                }
            })
            .collect();

        if placeholders != blocks.len() {
            warn!(
                "Found {} code block placeholder(s) for {} extracted block(s)",
                placeholders,
                blocks.len()
            );
        }
        debug_assert_eq!(
            placeholders,
            blocks.len(),
            "code block placeholders and extracted blocks do not pair up"
        );

        output.join("\n")
    }
}
