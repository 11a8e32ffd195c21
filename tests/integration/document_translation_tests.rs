/*!
 * End-to-end tests for translating whole documents.
 *
 * Documents go through the document translator with scripted mock backends,
 * exercising the input builder, prompt, reparser, scheduler and trackers
 * together.
 */

use std::sync::Arc;

use paraglot::document::{Composition, Document, KeywordFontResolver, Paragraph};
use paraglot::errors::TranslationError;
use paraglot::progress::{CancellationFlag, SilentProgress};
use paraglot::providers::mock::MockTranslator;
use paraglot::providers::{Translator, TranslatorBackend};
use paraglot::translation::core::TRACKING_FILE_NAME;
use paraglot::translation::{DocumentTranslator, ParagraphOptions, ParagraphTranslator};

use crate::common;

async fn document_translator(mock: &MockTranslator, options: ParagraphOptions, workers: usize) -> DocumentTranslator {
    let shared: Arc<dyn Translator> = Arc::new(mock.clone());
    let backend = TranslatorBackend::probe(shared).await.unwrap();
    DocumentTranslator::new(
        ParagraphTranslator::new(backend, Arc::new(KeywordFontResolver), options),
        workers,
    )
}

fn french() -> ParagraphOptions {
    ParagraphOptions {
        target_language: "French".to_string(),
        ..ParagraphOptions::default()
    }
}

fn paragraph<'a>(document: &'a Document, page: usize, index: usize) -> &'a Paragraph {
    &document.pages[page].paragraphs[index]
}

/// Test that formulas, styled runs and plain text all come through a full run
#[tokio::test]
async fn test_translate_withSampleDocument_shouldRebuildEveryParagraph() {
    let mock = MockTranslator::scripted(common::fake_french);
    let progress = Arc::new(SilentProgress::new());
    let translator = document_translator(&mock, french(), 3).await.with_progress(progress.clone());
    let mut document = common::sample_document();
    let Composition::Formula(formula) = paragraph(&document, 0, 1).compositions[1].clone() else {
        panic!("sample formula paragraph changed");
    };

    translator.translate(&mut document).await.unwrap();

    // "ok" is below the minimum length and never reaches the backend
    assert_eq!(mock.request_count(), 4);
    assert_eq!(progress.advanced(), 5);

    let title = paragraph(&document, 0, 0);
    assert_eq!(title.unicode, "Lois de conservation");
    assert_eq!(
        title.compositions,
        vec![Composition::unicode("Lois de conservation", Some(common::body_style()))]
    );

    let with_formula = paragraph(&document, 0, 1);
    assert_eq!(with_formula.compositions.len(), 3);
    assert_eq!(
        with_formula.compositions[0],
        Composition::unicode("L'énergie ", Some(common::body_style()))
    );
    match &with_formula.compositions[1] {
        Composition::Formula(restored) => assert!(Arc::ptr_eq(restored, &formula)),
        other => panic!("expected the formula back, got {:?}", other),
    }

    let with_bold = paragraph(&document, 0, 2);
    assert_eq!(
        with_bold.compositions,
        vec![
            Composition::unicode("Lisez le ", Some(common::body_style())),
            Composition::unicode("manuel", Some(common::bold_style())),
            Composition::unicode(" attentivement.", Some(common::body_style())),
        ]
    );

    assert_eq!(paragraph(&document, 1, 0).unicode, "L'énergie ne se crée ni ne se détruit.");
    assert_eq!(paragraph(&document, 1, 1), &common::text_paragraph("1-1", "ok"));
}

/// Test that the document's first title is offered as context to later paragraphs
#[tokio::test]
async fn test_translate_withTitle_shouldMentionTitleInPrompts() {
    let mock = MockTranslator::scripted(common::fake_french);
    let translator = document_translator(&mock, french(), 1).await;
    let mut document = common::sample_document();

    translator.translate(&mut document).await.unwrap();

    let requests = mock.requests();
    assert!(requests.iter().all(|r| r.llm));
    assert!(
        requests
            .iter()
            .all(|r| r.input.contains("0. The first title in the full text: Conservation Laws"))
    );
    assert!(requests.iter().all(|r| !r.input.contains("The most similar title")));
    assert!(requests.iter().any(|r| r.input.ends_with("Read the <style id='1'>manual</style> carefully.")));
}

/// Test that a plain backend gets formula placeholders but no style tags
#[tokio::test]
async fn test_translate_withPlainBackend_shouldFlattenStyledRuns() {
    let mock = MockTranslator::scripted(common::fake_french).plain_only();
    let translator = document_translator(&mock, french(), 2).await;
    let mut document = common::sample_document();

    translator.translate(&mut document).await.unwrap();

    let inputs: Vec<String> = mock.requests().into_iter().map(|r| r.input).collect();
    assert!(inputs.contains(&"Read the manual carefully.".to_string()));
    assert!(inputs.contains(&"The energy {v1} is conserved.".to_string()));
    assert!(mock.requests().iter().all(|r| !r.llm));
    assert_eq!(
        paragraph(&document, 0, 2).compositions,
        vec![Composition::unicode("Lisez le manuel attentivement.", Some(common::body_style()))]
    );
}

/// Test that one failing paragraph leaves the others translated
#[tokio::test]
async fn test_translate_withUnplaceableParagraph_shouldIsolateFailure() {
    let mock = MockTranslator::scripted(common::fake_french);
    let translator = document_translator(&mock, french(), 2).await;
    let mut document = common::sample_document();
    // A literal closing tag makes every rich-text id collide
    let broken = Paragraph::new(
        "0-3",
        Some(common::body_style()),
        vec![
            Composition::line("Close with </style> after the "),
            Composition::styled("manual", common::bold_style()),
        ],
    );
    document.pages[0].paragraphs.push(broken.clone());

    let tracker = translator.translate(&mut document).await.unwrap();

    assert_eq!(paragraph(&document, 0, 3), &broken);
    assert_eq!(paragraph(&document, 0, 1).compositions.len(), 3);
    assert_eq!(paragraph(&document, 1, 0).unicode, "L'énergie ne se crée ni ne se détruit.");
    assert!(tracker.pages[0].paragraphs[3].output.is_none());
}

/// Test that backend errors are recorded per attempt and the run still succeeds
#[tokio::test]
async fn test_translate_withFailingBackend_shouldKeepDocumentAndRecordErrors() {
    let mock = MockTranslator::failing();
    let translator = document_translator(&mock, french(), 4).await;
    let mut document = common::sample_document();
    let before = document.clone();

    let tracker = translator.translate(&mut document).await.unwrap();

    for (page, original) in document.pages.iter().zip(before.pages.iter()) {
        assert_eq!(page.paragraphs, original.paragraphs);
    }
    let attempt = &tracker.pages[0].paragraphs[1].llm_translate_trackers[0];
    assert!(attempt.has_error);
    assert!(attempt.error_message.contains("Simulated provider failure"));
}

/// Test that cancelling mid-run stops new paragraphs and returns them all
#[tokio::test]
async fn test_translate_withCancellationDuringRun_shouldStopAndRestoreParagraphs() {
    let flag = CancellationFlag::new();
    let trigger = flag.clone();
    let mock = MockTranslator::scripted(move |text| {
        trigger.cancel();
        common::fake_french(text)
    });
    let translator = document_translator(&mock, french(), 1)
        .await
        .with_progress(Arc::new(SilentProgress::with_cancellation(flag)));
    let mut document = common::sample_document();
    let before = document.clone();

    let result = translator.translate(&mut document).await;

    assert!(matches!(result, Err(TranslationError::Cancelled)));
    assert_eq!(mock.request_count(), 1);
    assert_eq!(document.paragraph_count(), before.paragraph_count());
    let changed = document
        .pages
        .iter()
        .zip(before.pages.iter())
        .flat_map(|(after, before)| after.paragraphs.iter().zip(before.paragraphs.iter()))
        .filter(|(after, before)| {
            assert_eq!(after.debug_id, before.debug_id);
            after != before
        })
        .count();
    assert_eq!(changed, 1);
}

/// Test that the debug report lands in the working directory
#[tokio::test]
async fn test_translate_withTrackingDir_shouldWriteReport() {
    let temp_dir = common::create_temp_dir().unwrap();
    let mock = MockTranslator::scripted(common::fake_french);
    let translator = document_translator(&mock, french(), 2)
        .await
        .with_tracking_dir(Some(temp_dir.path().to_path_buf()));
    let mut document = common::sample_document();

    translator.translate(&mut document).await.unwrap();

    let report = std::fs::read_to_string(temp_dir.path().join(TRACKING_FILE_NAME)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&report).unwrap();
    let first_page = json["page"][0]["paragraph"].as_array().unwrap();
    assert_eq!(first_page.len(), 3);
    assert_eq!(first_page[2]["input"], "Read the <style id='1'>manual</style> carefully.");
    assert_eq!(
        first_page[2]["output"],
        "Lisez le <style id='1'>manuel</style> attentivement."
    );
    assert_eq!(first_page[2]["llm_translate_trackers"][0]["placeholder_full_match"], true);
    // Non-ASCII text is written as is
    assert!(report.contains("L'énergie"));

    let second_page = json["page"][1]["paragraph"].as_array().unwrap();
    assert_eq!(second_page[1]["pdf_unicode"], "ok");
    assert!(second_page[1]["output"].is_null());
}
