/*!
 * Tests for the application controller, from document file to document file
 */

use anyhow::Result;
use std::sync::Arc;

use paraglot::app_config::{Config, TranslationProvider};
use paraglot::app_controller::Controller;
use paraglot::document::Composition;
use paraglot::file_utils::FileManager;
use paraglot::progress::SilentProgress;
use paraglot::providers::mock::MockTranslator;
use paraglot::translation::core::TRACKING_FILE_NAME;

use crate::common;

fn mock_config() -> Config {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Mock;
    config
}

/// Test that a document file is translated into a sibling output file
#[tokio::test]
async fn test_run_with_withScriptedBackend_shouldWriteTranslatedDocument() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::write_document(temp_dir.path(), "paper.json", &common::sample_document())?;
    let controller = Controller::with_config(mock_config())?;
    let mock = MockTranslator::scripted(common::fake_french);

    let output = controller
        .run_with(input.clone(), None, Arc::new(mock.clone()), Arc::new(SilentProgress::new()))
        .await?;

    assert_eq!(output, temp_dir.path().join("paper.fr.json"));
    let translated = FileManager::read_document(&output)?;
    assert_eq!(translated.pages[0].paragraphs[0].unicode, "Lois de conservation");
    assert!(matches!(
        translated.pages[0].paragraphs[1].compositions[1],
        Composition::Formula(_)
    ));
    // The prompt names the language, not the code
    assert!(mock.requests()[0].input.contains("into French."));
    // The input file is left alone
    assert_eq!(FileManager::read_document(&input)?.pages[0].paragraphs[0].unicode, "Conservation Laws");
    Ok(())
}

/// Test that debug mode writes the tracking report into the working directory
#[tokio::test]
async fn test_run_with_withDebugConfig_shouldWriteTrackingReport() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::write_document(temp_dir.path(), "paper.json", &common::sample_document())?;
    let mut config = mock_config();
    config.debug = true;
    config.working_dir = temp_dir.path().join("work");
    let controller = Controller::with_config(config)?;

    controller
        .run_with(
            input,
            Some(temp_dir.path().join("out/translated.json")),
            Arc::new(MockTranslator::scripted(common::fake_french)),
            Arc::new(SilentProgress::new()),
        )
        .await?;

    assert!(FileManager::file_exists(temp_dir.path().join("out/translated.json")));
    assert!(FileManager::file_exists(temp_dir.path().join("work").join(TRACKING_FILE_NAME)));
    Ok(())
}

/// Test that the tracking report is not written outside debug mode
#[tokio::test]
async fn test_run_with_withoutDebug_shouldNotWriteTrackingReport() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::write_document(temp_dir.path(), "paper.json", &common::sample_document())?;
    let mut config = mock_config();
    config.working_dir = temp_dir.path().to_path_buf();
    let controller = Controller::with_config(config)?;

    controller
        .run_with(input, None, Arc::new(MockTranslator::echo()), Arc::new(SilentProgress::new()))
        .await?;

    assert!(!FileManager::file_exists(temp_dir.path().join(TRACKING_FILE_NAME)));
    Ok(())
}

/// Test that a missing input file is reported before anything else happens
#[tokio::test]
async fn test_run_withMissingInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(mock_config())?;

    let result = controller.run(temp_dir.path().join("missing.json"), None).await;

    assert!(result.is_err());
    Ok(())
}

/// Test that the configured mock provider runs end to end through `run`
#[tokio::test]
async fn test_run_withMockProvider_shouldKeepEchoedText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::write_document(temp_dir.path(), "paper.json", &common::sample_document())?;
    let controller = Controller::with_config(mock_config())?;

    let output = controller.run(input, None).await?;

    let translated = FileManager::read_document(&output)?;
    let original = common::sample_document();
    assert_eq!(translated.pages[0].paragraphs, original.pages[0].paragraphs);
    Ok(())
}

/// Test that a cancelled controller reports the cancellation and writes nothing
#[tokio::test]
async fn test_run_withCancelledFlag_shouldNotWriteOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::write_document(temp_dir.path(), "paper.json", &common::sample_document())?;
    let controller = Controller::with_config(mock_config())?;
    controller.cancellation().cancel();

    let result = controller.run(input, None).await;

    let error = result.expect_err("cancelled run should fail");
    assert!(matches!(
        error.downcast_ref::<paraglot::TranslationError>(),
        Some(paraglot::TranslationError::Cancelled)
    ));
    assert!(!FileManager::file_exists(temp_dir.path().join("paper.fr.json")));
    Ok(())
}
