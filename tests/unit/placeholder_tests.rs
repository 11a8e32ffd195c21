/*!
 * Tests for collision-free placeholder allocation
 */

use std::sync::Arc;

use paraglot::document::{Composition, Formula, characters_from_str};
use paraglot::errors::TranslationError;
use paraglot::providers::mock::{MockPlaceholders, MockTranslator};
use paraglot::translation::PlaceholderFactory;

/// Test that a token already present in the text is skipped
#[test]
fn test_make_formula_placeholder_withTokenInText_shouldTakeNextId() {
    let translator = MockTranslator::echo();
    let factory = PlaceholderFactory::new(&translator);
    let formula = Arc::new(Formula {
        characters: characters_from_str("x"),
    });

    let placeholder = factory
        .make_formula_placeholder(&formula, 1, "literal {v1} and {v2} in the text")
        .unwrap();

    assert_eq!(placeholder.id, 3);
    assert_eq!(placeholder.token, "{v3}");
    assert!(Arc::ptr_eq(&placeholder.formula, &formula));
}

/// Test that bare tokens get an escaped pattern
#[test]
fn test_make_rich_text_placeholder_withBareTokens_shouldEscapePatterns() {
    let translator = MockTranslator::echo().with_placeholders(MockPlaceholders::Angle);
    let factory = PlaceholderFactory::new(&translator);
    let Composition::SameStyleCharacters(run) = Composition::styled("bold", paraglot::document::Style::new("F2", 9.0))
    else {
        unreachable!()
    };

    let placeholder = factory.make_rich_text_placeholder(&run, 4, "a <L4> b").unwrap();

    assert_eq!(placeholder.id, 5);
    assert_eq!(placeholder.left_token, "<L5>");
    assert_eq!(placeholder.right_token, "<R5>");
    assert_eq!(placeholder.left_pattern, regex::escape("<L5>"));
}

/// Test that a right token that is the same for every id can exhaust the search
#[test]
fn test_make_rich_text_placeholder_withFixedRightTokenInText_shouldExhaust() {
    let translator = MockTranslator::echo();
    let factory = PlaceholderFactory::new(&translator);
    let Composition::SameStyleCharacters(run) = Composition::styled("bold", paraglot::document::Style::new("F2", 9.0))
    else {
        unreachable!()
    };

    let result = factory.make_rich_text_placeholder(&run, 1, "html: </style>");

    assert!(matches!(
        result,
        Err(TranslationError::PlaceholderExhausted { start_id: 1, attempts: 10_000, .. })
    ));
}
