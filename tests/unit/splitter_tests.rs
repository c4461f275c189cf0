/*!
 * Tests for fragment splitting
 */

use mdlingo::markdown::line_endings::{to_crlf, to_lf};
use mdlingo::markdown::{BLANK_LINE, estimate_tokens, split_at_blank_lines, split_at_blank_lines_by};

fn paragraphs(count: usize) -> String {
    (0..count)
        .map(|i| format!("Paragraph number {} with a few words of text.", i))
        .collect::<Vec<_>>()
        .join(BLANK_LINE)
}

/// Every fragment stays within the budget when each block fits
#[test]
fn test_split_withSmallBudget_shouldRespectSizeBound() {
    let text = paragraphs(40);
    for max_size in [12, 30, 64, 200] {
        let fragments = split_at_blank_lines(&text, max_size).unwrap();
        for fragment in &fragments {
            assert!(
                estimate_tokens(fragment) <= max_size,
                "fragment of {} tokens over budget {}",
                estimate_tokens(fragment),
                max_size
            );
        }
        assert_eq!(fragments.join(BLANK_LINE), text);
    }
}

/// Joining fragments gives back the input, extra blank lines included
#[test]
fn test_split_withIrregularSpacing_shouldBeLossless() {
    let text = "one\n\n\n\ntwo\n\nthree\n\n\nfour\n";
    for max_size in [0, 1, 2, 5, 100] {
        let fragments = split_at_blank_lines_by(text, max_size, str::len).unwrap();
        assert_eq!(fragments.join(BLANK_LINE), text, "max_size {}", max_size);
    }
}

/// Text without a blank line cannot be split
#[test]
fn test_split_withoutBoundary_shouldReturnNone() {
    assert_eq!(split_at_blank_lines("single paragraph\nspanning lines", 1), None);
    assert_eq!(split_at_blank_lines("", 10), None);
    assert_eq!(split_at_blank_lines("```\ncode\n\nmore code\n```", 1), None);
}

/// CRLF blank lines become split points once line endings are normalized
#[test]
fn test_split_withCrlfDocument_shouldFindBlankLinesAfterNormalizing() {
    let document = "para one\r\n\r\npara two\r\n\r\npara three";
    let text = to_lf(document);

    let fragments = split_at_blank_lines(&text, 1).unwrap();
    assert_eq!(fragments, vec!["para one", "para two", "para three"]);

    let halves = split_at_blank_lines(&text, 0).unwrap();
    assert_eq!(halves.len(), 2);
    assert_eq!(to_crlf(&halves.join(BLANK_LINE)), document);
}

/// Budget zero halves the text at the blank line nearest the middle
#[test]
fn test_split_withZeroBudget_shouldHalve() {
    let text = "aaaa\n\nbbbb\n\ncccc\n\ndddd";
    let halves = split_at_blank_lines_by(text, 0, str::len).unwrap();
    assert_eq!(halves, vec!["aaaa\n\nbbbb".to_string(), "cccc\n\ndddd".to_string()]);

    // Halving strictly shrinks the pieces
    for half in &halves {
        assert!(half.len() < text.len());
    }
}

/// A generous budget keeps the text in one piece
#[test]
fn test_split_withLargeBudget_shouldReturnSingleFragment() {
    let text = paragraphs(5);
    assert_eq!(split_at_blank_lines(&text, 100_000).unwrap(), vec![text]);
}

/// Token estimate counts non-ASCII characters more heavily
#[test]
fn test_estimateTokens_withMixedScripts_shouldWeighNonAscii() {
    assert_eq!(estimate_tokens(""), 0);
    assert_eq!(estimate_tokens("abcd"), 1);
    assert_eq!(estimate_tokens("abcde"), 2);
    assert_eq!(estimate_tokens("你好"), 2);
}
