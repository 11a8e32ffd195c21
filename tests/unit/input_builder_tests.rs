/*!
 * Tests for turning paragraphs into translator input
 */

use std::sync::Arc;

use paraglot::document::{
    Character, Composition, Font, FontMap, Formula, KeywordFontResolver, Page, PageFontMaps, Paragraph, Style,
    XObject,
};
use paraglot::providers::mock::MockTranslator;
use paraglot::translation::input::MAX_PLACEHOLDERS;
use paraglot::translation::{Placeholder, TranslateInputBuilder};

use crate::common;

fn page_fonts() -> FontMap {
    PageFontMaps::from_page(&common::page(0, Vec::new())).page
}

/// Test that formulas get default `{vN}` tokens numbered from 1
#[test]
fn test_build_withFormula_shouldUseDefaultFormulaToken() {
    let translator = MockTranslator::echo();
    let builder = TranslateInputBuilder::new(&translator, &KeywordFontResolver);

    let input = builder
        .build(&common::formula_paragraph("p"), &page_fonts(), false)
        .unwrap()
        .unwrap();

    assert_eq!(input.unicode, "The energy {v1} is conserved.");
    assert_eq!(input.placeholders.len(), 1);
    assert_eq!(input.placeholders[0].id(), 1);
}

/// Test that a bold run is wrapped and ids advance by two
#[test]
fn test_build_withBoldRunThenFormula_shouldSkipRightTokenId() {
    let translator = MockTranslator::echo();
    let builder = TranslateInputBuilder::new(&translator, &KeywordFontResolver);
    let paragraph = Paragraph::new(
        "p",
        Some(common::body_style()),
        vec![
            Composition::styled("Note", common::bold_style()),
            Composition::line(": see "),
            Composition::formula("x^2"),
        ],
    );

    let input = builder.build(&paragraph, &page_fonts(), false).unwrap().unwrap();

    assert_eq!(input.unicode, "<style id='1'>Note</style>: see {v3}");
    let ids: Vec<usize> = input.placeholders.iter().map(Placeholder::id).collect();
    assert_eq!(ids, vec![1, 3]);
}

/// Test that more than the placeholder limit disables rich text for the paragraph
#[test]
fn test_build_withTooManyStyledRuns_shouldDropRichTextOnly() {
    let translator = MockTranslator::echo();
    let builder = TranslateInputBuilder::new(&translator, &KeywordFontResolver);
    let mut compositions = vec![Composition::formula("a+b")];
    for i in 0..=MAX_PLACEHOLDERS {
        compositions.push(Composition::line(" and "));
        compositions.push(Composition::styled(&format!("term{}", i), common::bold_style()));
    }
    let paragraph = Paragraph::new("dense", Some(common::body_style()), compositions);

    let input = builder.build(&paragraph, &page_fonts(), false).unwrap().unwrap();

    assert!(!input.has_rich_text());
    assert_eq!(input.placeholders.len(), 1);
    assert!(input.unicode.starts_with("{v1} and term0 and term1"));
    assert!(!input.unicode.contains("<style"));
}

/// Test that a run differing only by a font that resolves identically is left bare
#[test]
fn test_build_withEquivalentFont_shouldNotWrapRun() {
    let translator = MockTranslator::echo();
    let builder = TranslateInputBuilder::new(&translator, &KeywordFontResolver);
    let mut fonts = page_fonts();
    fonts.insert(
        "F9".to_string(),
        Font {
            font_id: "F9".to_string(),
            name: "Arial".to_string(),
            ..Font::default()
        },
    );
    let paragraph = Paragraph::new(
        "p",
        Some(common::body_style()),
        vec![Composition::line("Plain "), Composition::styled("text", Style::new("F9", 10.0))],
    );

    let input = builder.build(&paragraph, &fonts, false).unwrap().unwrap();

    assert_eq!(input.unicode, "Plain text");
    assert!(input.placeholders.is_empty());
}

/// Test that paragraphs inside an embedded object use the object's font table
#[test]
fn test_build_withXObjectFonts_shouldResolveLocalFonts() {
    let translator = MockTranslator::echo();
    let builder = TranslateInputBuilder::new(&translator, &KeywordFontResolver);
    let page = Page {
        fonts: common::sample_fonts(),
        xobjects: vec![XObject {
            xobj_id: 7,
            fonts: vec![Font {
                font_id: "F2".to_string(),
                name: "Helvetica".to_string(),
                ..Font::default()
            }],
        }],
        ..Page::default()
    };
    let maps = PageFontMaps::from_page(&page);
    let mut paragraph = Paragraph::new(
        "x",
        Some(common::body_style()),
        vec![Composition::line("Inside "), Composition::styled("form", common::bold_style())],
    );
    paragraph.xobj_id = Some(7);

    let input = builder.build(&paragraph, maps.for_paragraph(&paragraph), false).unwrap().unwrap();
    assert_eq!(input.unicode, "Inside form");
    assert!(input.placeholders.is_empty());

    // The same run on the page itself renders bold
    paragraph.xobj_id = None;
    let input = builder.build(&paragraph, maps.for_paragraph(&paragraph), false).unwrap().unwrap();
    assert_eq!(input.unicode, "Inside <style id='1'>form</style>");
}

/// Test that formula hints leave out formulas made of unmapped glyphs
#[test]
fn test_placeholders_hint_withUnmappedFormula_shouldOmitIt() {
    let translator = MockTranslator::echo();
    let builder = TranslateInputBuilder::new(&translator, &KeywordFontResolver);
    let unmapped = Formula {
        characters: (0..5).map(|i| Character::new(format!("(cid:{})", i))).collect(),
    };
    let paragraph = Paragraph::new(
        "p",
        Some(common::body_style()),
        vec![
            Composition::line("Given "),
            Composition::formula("a=b"),
            Composition::line(" and "),
            Composition::Formula(Arc::new(unmapped)),
        ],
    );

    let input = builder.build(&paragraph, &page_fonts(), false).unwrap().unwrap();
    let hint = input.placeholders_hint().unwrap();

    assert_eq!(hint.len(), 1);
    assert_eq!(hint.get("{v1}").map(String::as_str), Some("a=b"));
}

/// Test that a lone formula is never sent for translation
#[test]
fn test_build_withLoneFormula_shouldProduceNothing() {
    let translator = MockTranslator::echo();
    let builder = TranslateInputBuilder::new(&translator, &KeywordFontResolver);
    let paragraph = Paragraph::new("f", None, vec![Composition::formula("\\int f")]);

    assert!(builder.build(&paragraph, &page_fonts(), false).unwrap().is_none());
}
