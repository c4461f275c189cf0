/*!
 * Integration tests for whole-document translation
 */

use mdlingo::errors::TranslationError;
use mdlingo::markdown::PLACEHOLDER_KEYWORD;
use mdlingo::providers::mock::MockProvider;

use crate::common::{self, SAMPLE_MARKDOWN};

/// An identity translation gives back the document byte for byte
#[tokio::test]
async fn test_translate_withEchoProvider_shouldReproduceDocument() {
    common::init_test_logging();
    let provider = MockProvider::echo();
    let mut config = common::test_config();
    config.translation.fragment_size = 8;
    let service = common::mock_service(config, &provider);

    let translated = service.translate(SAMPLE_MARKDOWN).await.unwrap();

    assert_eq!(translated, SAMPLE_MARKDOWN);
    assert!(provider.request_count() > 1);
}

/// Code never reaches the model; placeholders do
#[tokio::test]
async fn test_translate_withCodeBlocks_shouldSendOnlyPlaceholders() {
    let provider = MockProvider::working();
    let service = common::mock_service(common::test_config(), &provider);

    let translated = service.translate(SAMPLE_MARKDOWN).await.unwrap();

    let sent: String = provider.calls().into_iter().map(|c| c.text).collect();
    assert!(!sent.contains("render(<App />)"));
    assert!(!sent.contains("plain block"));
    assert_eq!(sent.matches(PLACEHOLDER_KEYWORD).count(), 2);

    assert!(translated.contains("```js\nimport { render } from 'lib';\n\nrender(<App />);\n```"));
    assert!(translated.contains("~~~\nplain block\n~~~"));
    assert!(!translated.contains(PLACEHOLDER_KEYWORD));
}

/// A document that is too long as a whole still gets translated piecewise
#[tokio::test]
async fn test_translate_withSmallModelLimit_shouldSplitAndTranslate() {
    let provider = MockProvider::too_long_above(60).with_custom_response(|t| t.to_uppercase());
    let service = common::mock_service(common::test_config(), &provider);

    let document = "First paragraph of prose.\n\nSecond paragraph of prose.\n\nThird paragraph of prose.\n";
    let report = service.translate_with_report(document, &|_| {}).await.unwrap();

    assert_eq!(report.translation, document.to_uppercase());
    assert!(report.splits >= 1);
    assert_eq!(report.passthrough_fragments, 0);
}

/// An oversized code-free paragraph degrades to untranslated text
#[tokio::test]
async fn test_translate_withUnsplittableParagraph_shouldPassThroughAndReport() {
    let provider = MockProvider::too_long_above(30).with_custom_response(|t| t.to_uppercase());
    let service = common::mock_service(common::test_config(), &provider);

    let document = "short one\n\nthis paragraph is far too long for the model to accept";
    let report = service.translate_with_report(document, &|_| {}).await.unwrap();

    assert_eq!(
        report.translation,
        "SHORT ONE\n\nthis paragraph is far too long for the model to accept"
    );
    assert_eq!(report.passthrough_fragments, 1);
}

/// A fatal provider error surfaces and no partial document is returned
#[tokio::test]
async fn test_translate_withFailingProvider_shouldReturnProviderError() {
    let provider = MockProvider::failing();
    let service = common::mock_service(common::test_config(), &provider);

    let result = service.translate(SAMPLE_MARKDOWN).await;
    assert!(matches!(result, Err(TranslationError::Provider(_))));
}

/// Custom instruction files replace the built-in instruction
#[tokio::test]
async fn test_translate_withInstructionFile_shouldSendCustomInstruction() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let instruction = common::create_test_file(
        temp_dir.path(),
        "prompt.txt",
        "Translate into {target_language}. Keep omittedCodeBlock lines.",
    )?;

    let provider = MockProvider::echo();
    let mut config = common::test_config();
    config.target_language = "fr".to_string();
    config.translation.instruction_file = Some(instruction.to_string_lossy().to_string());
    let service = common::mock_service(config, &provider);

    service.translate("Hello").await?;
    assert_eq!(
        provider.calls()[0].instruction,
        "Translate into French. Keep omittedCodeBlock lines."
    );
    Ok(())
}
