/*!
 * Tests for application configuration
 */

use anyhow::Result;
use paraglot::app_config::{Config, LogLevel, TranslationProvider};

use crate::common;

/// Test that a missing config file is created with defaults
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.translation.model, "llama3.2:3b");
    assert_eq!(config.translation.endpoint, "http://localhost:11434");
    assert!(!config.translation.disable_rich_text_translate);
    assert!(!config.translation.fallback_to_plain_translate);
    Ok(())
}

/// Test that an existing file is read and missing keys use defaults
#[test]
fn test_load_or_create_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "source_language": "en",
            "target_language": "ja",
            "log_level": "debug",
            "debug": true,
            "working_dir": "/tmp/paraglot",
            "translation": {
                "provider": "mock",
                "qps": 1,
                "custom_system_prompt": "Be terse."
            }
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.target_language, "ja");
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.debug);
    assert_eq!(config.translation.provider, TranslationProvider::Mock);
    assert_eq!(config.translation.worker_count(), 2);
    assert_eq!(config.translation.custom_system_prompt.as_deref(), Some("Be terse."));
    assert_eq!(config.translation.min_text_length, 5);
    config.validate()?;
    Ok(())
}

/// Test that a malformed config file is reported
#[test]
fn test_load_or_create_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ broken")?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

/// Test the validation rules
#[test]
fn test_validate_withOutOfRangeValues_shouldFail() {
    let mut config = Config::default();
    config.translation.temperature = 3.5;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.endpoint = "  ".to_string();
    assert!(config.validate().is_err());

    // The mock needs no endpoint
    config.translation.provider = TranslationProvider::Mock;
    assert!(config.validate().is_ok());
}

/// Test that log levels map onto the log crate filters
#[test]
fn test_log_level_withEachLevel_shouldMapToFilter() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
    assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
}
