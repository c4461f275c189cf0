/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;

use mdlingo::app_controller::{Controller, FileOutcome, FolderSummary, OutputTarget};
use mdlingo::providers::mock::MockProvider;

use crate::common::{self, SAMPLE_MARKDOWN};

fn controller(provider: &MockProvider) -> Controller {
    Controller::with_service(common::mock_service(common::test_config(), provider))
}

/// Controller builds from a real configuration without network access
#[test]
fn test_controllerInitialization_withValidConfig_shouldSucceed() -> Result<()> {
    let _controller = Controller::with_config(common::test_config())?;
    Ok(())
}

/// A single file is written beside its source
#[tokio::test]
async fn test_run_withSingleFile_shouldWriteLanguageSuffixedOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "intro.md", SAMPLE_MARKDOWN)?;
    let provider = MockProvider::working();

    let outcome = controller(&provider)
        .run(&input, &OutputTarget::Beside, false)
        .await?;

    let expected = temp_dir.path().join("intro.zh.md");
    assert_eq!(outcome, FileOutcome::Written(expected.clone()));
    let written = std::fs::read_to_string(&expected)?;
    assert!(written.starts_with("[TRANSLATED] # Getting started"));
    assert!(written.contains("```js\nimport { render } from 'lib';"));
    assert_eq!(std::fs::read_to_string(&input)?, SAMPLE_MARKDOWN);
    Ok(())
}

/// Existing outputs are kept unless overwriting is forced
#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "page.md", "Hello\n")?;
    let output = common::create_test_file(temp_dir.path(), "page.zh.md", "old\n")?;
    let provider = MockProvider::working();
    let controller = controller(&provider);

    let outcome = controller.run(&input, &OutputTarget::Beside, false).await?;
    assert_eq!(outcome, FileOutcome::Skipped(output.clone()));
    assert_eq!(provider.request_count(), 0);

    controller.run(&input, &OutputTarget::Beside, true).await?;
    assert_eq!(std::fs::read_to_string(&output)?, "[TRANSLATED] Hello\n");
    Ok(())
}

/// In-place and explicit outputs
#[tokio::test]
async fn test_run_withInPlaceAndExplicitTargets_shouldWriteThere() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "doc.md", "Text\n")?;
    let provider = MockProvider::working();
    let controller = controller(&provider);

    let explicit = temp_dir.path().join("out/translated.md");
    controller
        .run(&input, &OutputTarget::Path(explicit.clone()), false)
        .await?;
    assert_eq!(std::fs::read_to_string(&explicit)?, "[TRANSLATED] Text\n");

    controller.run(&input, &OutputTarget::InPlace, false).await?;
    assert_eq!(std::fs::read_to_string(&input)?, "[TRANSLATED] Text\n");
    Ok(())
}

/// Folder mode translates every document and counts the results
#[tokio::test]
async fn test_runFolder_withMixedFiles_shouldReportSummary() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "a.md", "Alpha\n")?;
    common::create_test_file(root, "nested/b.mdx", "Beta\n")?;
    common::create_test_file(root, "c.md", "Gamma\n")?;
    common::create_test_file(root, "c.zh.md", "existing\n")?;
    common::create_test_file(root, "ignored.txt", "nope\n")?;

    let provider = MockProvider::working();
    let summary = controller(&provider).run_folder(root, false, false).await?;

    assert_eq!(
        summary,
        FolderSummary {
            processed: 2,
            skipped: 1,
            failed: 0
        }
    );
    assert_eq!(std::fs::read_to_string(root.join("nested/b.zh.mdx"))?, "[TRANSLATED] Beta\n");
    Ok(())
}

/// Failures in folder mode are counted, not fatal
#[tokio::test]
async fn test_runFolder_withFailingProvider_shouldCountFailures() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "a.md", "Alpha\n")?;

    let provider = MockProvider::failing();
    let summary = controller(&provider)
        .run_folder(temp_dir.path(), false, false)
        .await?;

    assert_eq!(summary.failed, 1);
    assert!(!temp_dir.path().join("a.zh.md").exists());
    Ok(())
}

/// An empty folder is an error
#[tokio::test]
async fn test_runFolder_withNoMarkdown_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let provider = MockProvider::working();
    assert!(controller(&provider).run_folder(temp_dir.path(), false, false).await.is_err());
    Ok(())
}

/// A missing input file is rejected before any call
#[test]
fn test_run_withMissingFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let provider = MockProvider::working();
    let controller = controller(&provider);

    let missing = temp_dir.path().join("missing.md");
    let result = tokio_test::block_on(controller.run(&missing, &OutputTarget::Beside, false));

    assert!(result.is_err());
    assert_eq!(provider.request_count(), 0);
    Ok(())
}
