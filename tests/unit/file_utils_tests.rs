/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::path::Path;

use paraglot::file_utils::FileManager;

use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::dir_exists(&test_file));
    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

/// Test that generate_output_path keeps the extension and adds the language
#[test]
fn test_generate_output_path_withValidInputs_shouldCreateCorrectPath() {
    let output_path = FileManager::generate_output_path(Path::new("/tmp/input/paper.json"), "/tmp/output", "fr");

    assert_eq!(output_path, Path::new("/tmp/output/paper.fr.json"));
}

/// Test that documents round-trip through disk with their compositions
#[test]
fn test_write_document_withSampleDocument_shouldReadBackEqual() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out/doc.json");
    let document = common::sample_document();

    FileManager::write_document(&path, &document)?;
    let loaded = FileManager::read_document(&path)?;

    assert_eq!(loaded.paragraph_count(), document.paragraph_count());
    assert_eq!(loaded.pages[0].paragraphs, document.pages[0].paragraphs);
    assert_eq!(loaded.pages[1].fonts, document.pages[1].fonts);
    Ok(())
}

/// Test that unknown composition kinds survive loading as Unknown
#[test]
fn test_read_document_withUnknownComposition_shouldLoad() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "doc.json",
        r#"{"pages": [{"paragraphs": [{"debug_id": "p", "unicode": "x",
            "compositions": [{"type": "hologram"}, {"type": "line", "characters": [{"char_unicode": "x"}]}]}]}]}"#,
    )?;

    let document = FileManager::read_document(&path)?;

    assert_eq!(
        document.pages[0].paragraphs[0].compositions[0],
        paraglot::document::Composition::Unknown
    );
    Ok(())
}
