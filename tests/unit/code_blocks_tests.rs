/*!
 * Tests for code block extraction and restoration
 */

use mdlingo::markdown::{CodeBlockGuard, PLACEHOLDER_KEYWORD, split_at_blank_lines};

use crate::common::SAMPLE_MARKDOWN;

fn round_trip(document: &str) -> String {
    let guard = CodeBlockGuard::for_document(document);
    let (stripped, blocks) = guard.extract(document);
    guard.restore(&stripped, &blocks)
}

/// Restore after extract gives back the document for any number of blocks
#[test]
fn test_roundTrip_withVaryingBlockCounts_shouldReproduceDocument() {
    let documents = [
        "",
        "No code at all.\n\nJust prose.",
        "```\nonly code\n```",
        "A\n\n```rust\nfn a() {}\n\nfn b() {}\n```\n\nB\n\n```\nsecond\n```\n\nC\n",
        "````md\n```js\ninner\n```\n````\n\ntext",
        "  ```py\n  print(1)\n  ```\n\n- item\n\n  ~~~\n  tilde\n  ~~~",
        SAMPLE_MARKDOWN,
    ];

    for document in documents {
        assert_eq!(round_trip(document), document, "round trip failed for {:?}", document);
    }
}

/// The worked example: one block between two paragraphs
#[test]
fn test_extract_withSingleBlock_shouldLeavePlaceholderBetweenParagraphs() {
    let document = "A\n\n```js\nconsole.log(1)\n```\n\nB";
    let guard = CodeBlockGuard::for_document(document);
    let (stripped, blocks) = guard.extract(document);

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].content, "```js\nconsole.log(1)\n```");

    let lines: Vec<&str> = stripped.split('\n').collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "A");
    assert!(lines[2].starts_with(PLACEHOLDER_KEYWORD));
    assert_eq!(lines[4], "B");

    let fragments = split_at_blank_lines(&stripped, 10_000).unwrap();
    assert_eq!(fragments, vec![stripped.clone()]);

    assert_eq!(guard.restore(&fragments[0], &blocks), document);
}

/// Blocks are recorded in document order
#[test]
fn test_extract_withSeveralBlocks_shouldKeepEncounterOrder() {
    let guard = CodeBlockGuard::with_nonce("00000000");
    let (stripped, blocks) = guard.extract(SAMPLE_MARKDOWN);

    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].content.starts_with("```js"));
    assert!(blocks[1].content.starts_with("~~~"));
    assert!(stripped.contains("omittedCodeBlock-00000000-0"));
    assert!(stripped.contains("omittedCodeBlock-00000000-1"));
    assert!(!stripped.contains("render("));
}

/// Translated prose around the placeholders survives restoration
#[test]
fn test_restore_withTranslatedText_shouldOnlyReplacePlaceholderLines() {
    let document = "Hello\n\n```\ncode\n```\n\nWorld";
    let guard = CodeBlockGuard::for_document(document);
    let (stripped, blocks) = guard.extract(document);

    let translated = stripped.replace("Hello", "Bonjour").replace("World", "Monde");
    assert_eq!(
        guard.restore(&translated, &blocks),
        "Bonjour\n\n```\ncode\n```\n\nMonde"
    );
}

/// A document that already mentions the keyword does not confuse restoration
#[test]
fn test_extract_withKeywordInProse_shouldNotTouchExistingText() {
    let document = "Lines with omittedCodeBlock-xxxxxx are kept.\n\n```\nx\n```";
    let guard = CodeBlockGuard::for_document(document);
    let (stripped, blocks) = guard.extract(document);

    assert!(stripped.starts_with("Lines with omittedCodeBlock-xxxxxx are kept."));
    assert_eq!(guard.restore(&stripped, &blocks), document);
}
