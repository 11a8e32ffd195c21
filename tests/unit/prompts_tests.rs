/*!
 * Tests for LLM prompt construction
 */

use std::collections::BTreeMap;

use paraglot::providers::mock::{MockPlaceholders, MockTranslator};
use paraglot::translation::prompts::{TranslationPromptBuilder, extract_source_text};

use crate::common;

/// Test that the prompt names the language and ends with the text
#[test]
fn test_build_withDefaults_shouldFollowPromptLayout() {
    let translator = MockTranslator::echo();
    let prompt = TranslationPromptBuilder::new("French").build(&translator, "Hello {v1}");

    assert!(prompt.starts_with(
        "You are a professional and reliable machine translation engine responsible for translating the input text into French."
    ));
    assert!(prompt.contains("1. Do not translate style tags, such as \"<style id='1'>xxx</style>\"!"));
    assert!(prompt.contains("such as \"{v3}\""));
    assert!(prompt.contains("5. Translate text into French."));
    assert!(!prompt.contains("refer to the following information"));
    assert!(prompt.ends_with("directly output your translation.\n\nHello {v1}"));
    assert_eq!(extract_source_text(&prompt), "Hello {v1}");
}

/// Test that titles and formula hints form a numbered list starting at zero
#[test]
fn test_build_withTitlesAndHint_shouldListHints() {
    let translator = MockTranslator::echo().with_placeholders(MockPlaceholders::Angle);
    let first = common::title_paragraph("t0", "Introduction");
    let recent = common::title_paragraph("t1", "Results");
    let mut hint = BTreeMap::new();
    hint.insert("{v1}".to_string(), "a+b".to_string());

    let prompt = TranslationPromptBuilder::new("German")
        .with_titles(Some(&first), Some(&recent))
        .with_formula_hint(Some(hint))
        .build(&translator, "text");

    assert!(prompt.contains("0. The first title in the full text: Introduction"));
    assert!(prompt.contains("1. The most similar title in the full text: Results"));
    assert!(prompt.contains("2. This is the formula placeholder hint: \n{v1}: a+b\n"));
    assert!(prompt.contains("\"<L1>xxx<R2>\""));
}

/// Test that the recent title is not repeated when it is the first one
#[test]
fn test_build_withSameTitleTwice_shouldMentionItOnce() {
    let translator = MockTranslator::echo();
    let title = common::title_paragraph("t0", "Introduction");

    let prompt = TranslationPromptBuilder::new("German")
        .with_titles(Some(&title), Some(&title))
        .build(&translator, "text");

    assert_eq!(prompt.matches("Introduction").count(), 1);
}

/// Test that a custom system prompt replaces the first line only
#[test]
fn test_build_withCustomSystemPrompt_shouldReplaceFirstLine() {
    let translator = MockTranslator::echo();
    let prompt = TranslationPromptBuilder::new("Spanish")
        .with_custom_system_prompt(Some("Translate like a physicist."))
        .build(&translator, "text");

    assert!(prompt.starts_with("Translate like a physicist.\n"));
    assert!(prompt.contains("5. Translate text into Spanish."));
}
