/*!
 * Fragment splitting at blank lines.
 *
 * A document is cut into fragments small enough for a single model call.
 * Cuts only ever happen at an existing blank line outside fenced code, so
 * joining the fragments with a blank line gives back the input exactly.
 */

use super::fence::FenceTracker;

/// Separator between paragraph blocks, and between fragments
pub const BLANK_LINE: &str = "\n\n";

/// Rough token count for model input.
///
/// ASCII text averages about four characters per token; anything else is
/// counted as one token per character, which over-estimates CJK and
/// accented text rather than under-estimating it.
pub fn estimate_tokens(text: &str) -> usize {
    let (ascii, other) = text.chars().fold((0usize, 0usize), |(ascii, other), c| {
        if c.is_ascii() {
            (ascii + 1, other)
        } else {
            (ascii, other + 1)
        }
    });
    ascii.div_ceil(4) + other
}

/// Split `text` into the blocks between blank lines.
///
/// Blank lines inside a fenced code region do not count as boundaries.
/// Joining the result with [`BLANK_LINE`] reproduces `text`.
pub fn paragraph_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut tracker = FenceTracker::new();
    let mut start = 0;
    let mut offset = 0;

    for piece in text.split(BLANK_LINE) {
        for line in piece.split('\n') {
            tracker.feed(line);
        }
        offset += piece.len();

        if !tracker.is_open() {
            blocks.push(&text[start..offset]);
            start = offset + BLANK_LINE.len();
        }
        offset += BLANK_LINE.len();
    }

    // An unclosed fence swallows the rest of the text
    if start < text.len() || blocks.is_empty() {
        blocks.push(&text[start.min(text.len())..]);
    }

    blocks
}

/// Split `text` at blank lines using [`estimate_tokens`] as the size measure.
///
/// See [`split_at_blank_lines_by`].
pub fn split_at_blank_lines(text: &str, max_size: usize) -> Option<Vec<String>> {
    split_at_blank_lines_by(text, max_size, estimate_tokens)
}

/// Split `text` at blank lines into fragments of at most `max_size`.
///
/// Fragments are filled greedily: each block is appended to the current
/// fragment while the result still measures within `max_size`. A single
/// block larger than `max_size` becomes a fragment of its own.
///
/// With `max_size == 0` the text is cut once, at the blank line closest to
/// its middle, giving two halves.
///
/// Returns `None` when the text has no blank line to cut at.
pub fn split_at_blank_lines_by<F>(text: &str, max_size: usize, measure: F) -> Option<Vec<String>>
where
    F: Fn(&str) -> usize,
{
    let blocks = paragraph_blocks(text);
    if blocks.len() < 2 {
        return None;
    }

    if max_size == 0 {
        return Some(split_in_half(&blocks, measure));
    }

    let mut fragments = Vec::new();
    let mut current = String::from(blocks[0]);

    for block in &blocks[1..] {
        let mut candidate = String::with_capacity(current.len() + BLANK_LINE.len() + block.len());
        candidate.push_str(&current);
        candidate.push_str(BLANK_LINE);
        candidate.push_str(block);

        if measure(&candidate) <= max_size {
            current = candidate;
        } else {
            fragments.push(std::mem::replace(&mut current, block.to_string()));
        }
    }
    fragments.push(current);

    Some(fragments)
}

/// Cut the blocks into two halves of roughly equal measure
fn split_in_half<F>(blocks: &[&str], measure: F) -> Vec<String>
where
    F: Fn(&str) -> usize,
{
    let sizes: Vec<usize> = blocks.iter().map(|b| measure(*b)).collect();
    let total: usize = sizes.iter().sum();

    let mut best_cut = 1;
    let mut best_diff = usize::MAX;
    let mut prefix = 0;
    for (cut, size) in sizes.iter().enumerate().take(blocks.len() - 1) {
        prefix += size;
        let diff = prefix.abs_diff(total - prefix);
        if diff < best_diff {
            best_diff = diff;
            best_cut = cut + 1;
        }
    }

    vec![
        blocks[..best_cut].join(BLANK_LINE),
        blocks[best_cut..].join(BLANK_LINE),
    ]
}
