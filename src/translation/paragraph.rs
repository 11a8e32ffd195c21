/*!
 * Single-paragraph translation pipeline.
 *
 * Pre-processing builds the translator input, the backend is called either
 * with a full prompt or with the bare text, the answer is normalized and
 * reparsed, and the paragraph is rewritten in place. A failure at any step
 * is logged and leaves the paragraph as it was.
 */

use log::{debug, error, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::app_config::TranslationConfig;
use crate::document::{Composition, FontResolver, PageFontMaps, Paragraph};
use crate::errors::TranslationError;
use crate::providers::{RateLimitHint, Translator, TranslatorBackend};
use crate::translation::context::TitleSnapshot;
use crate::translation::input::{TranslateInput, TranslateInputBuilder};
use crate::translation::prompts::TranslationPromptBuilder;
use crate::translation::reparse::reparse;
use crate::translation::tracker::ParagraphTracker;

/// Runs of 20 or more dots, spaces, ellipses or CJK stops
static DEGENERATE_PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[. 。…，]{20,}").unwrap());

/// Collapse degenerate punctuation runs some models produce.
pub fn normalize_translation(text: &str) -> String {
    DEGENERATE_PUNCTUATION.replace_all(text, ".").into_owned()
}

/// Per-paragraph translation settings.
#[derive(Debug, Clone)]
pub struct ParagraphOptions {
    /// Target language as named in prompts
    pub target_language: String,
    pub min_text_length: usize,
    pub disable_rich_text_translate: bool,
    pub add_formula_placeholder_hint: bool,
    pub custom_system_prompt: Option<String>,
    pub fallback_to_plain_translate: bool,
}

impl ParagraphOptions {
    pub fn from_config(config: &TranslationConfig, target_language: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            min_text_length: config.min_text_length,
            disable_rich_text_translate: config.disable_rich_text_translate,
            add_formula_placeholder_hint: config.add_formula_placeholder_hint,
            custom_system_prompt: config.custom_system_prompt.clone(),
            fallback_to_plain_translate: config.fallback_to_plain_translate,
        }
    }
}

impl Default for ParagraphOptions {
    fn default() -> Self {
        Self::from_config(&TranslationConfig::default(), "English")
    }
}

/// What happened to a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphOutcome {
    /// Nothing to translate (vertical, empty, too short, lone formula)
    Skipped,
    /// The translator returned the input unchanged
    Unchanged,
    Translated,
    /// The attempt failed; the paragraph is untouched
    Failed,
}

/// Translates paragraphs one at a time against a fixed backend.
pub struct ParagraphTranslator {
    backend: TranslatorBackend,
    font_resolver: Arc<dyn FontResolver>,
    options: ParagraphOptions,
}

impl ParagraphTranslator {
    pub fn new(backend: TranslatorBackend, font_resolver: Arc<dyn FontResolver>, options: ParagraphOptions) -> Self {
        Self {
            backend,
            font_resolver,
            options,
        }
    }

    pub fn backend(&self) -> &TranslatorBackend {
        &self.backend
    }

    pub fn options(&self) -> &ParagraphOptions {
        &self.options
    }

    /// Translate `paragraph` in place, recording diagnostics in `tracker`.
    pub async fn translate_paragraph(
        &self,
        paragraph: &mut Paragraph,
        tracker: &mut ParagraphTracker,
        fonts: &PageFontMaps,
        titles: &TitleSnapshot,
        token_count: usize,
    ) -> ParagraphOutcome {
        match self.try_translate(paragraph, tracker, fonts, titles, token_count).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    "Error translating paragraph. Paragraph: {} ({}). Error: {}",
                    paragraph.debug_id, paragraph.unicode, e
                );
                if let Some(attempt) = tracker.last_llm_translate_tracker() {
                    attempt.set_error_message(e.to_string());
                }
                ParagraphOutcome::Failed
            }
        }
    }

    async fn try_translate(
        &self,
        paragraph: &mut Paragraph,
        tracker: &mut ParagraphTracker,
        fonts: &PageFontMaps,
        titles: &TitleSnapshot,
        token_count: usize,
    ) -> Result<ParagraphOutcome, TranslationError> {
        let Some(input) = self.prepare(paragraph, tracker, fonts)? else {
            return Ok(ParagraphOutcome::Skipped);
        };

        let translated = self.call_backend(&input, tracker, titles, token_count).await?;
        let translated = normalize_translation(&translated);

        self.apply(paragraph, tracker, &input, translated)
    }

    /// Build the translator input, or `None` when the paragraph is skipped.
    fn prepare(
        &self,
        paragraph: &Paragraph,
        tracker: &mut ParagraphTracker,
        fonts: &PageFontMaps,
    ) -> Result<Option<TranslateInput>, TranslationError> {
        if paragraph.vertical {
            return Ok(None);
        }
        tracker.set_pdf_unicode(paragraph.unicode.as_str());

        // Plain backends cannot be told to keep style tags
        let disable_rich_text = self.options.disable_rich_text_translate || !self.backend.supports_llm();
        let builder = TranslateInputBuilder::new(self.backend.translator().as_ref(), self.font_resolver.as_ref());
        let Some(input) = builder.build(paragraph, fonts.for_paragraph(paragraph), disable_rich_text)? else {
            return Ok(None);
        };

        tracker.set_input(input.unicode.as_str());
        if input.unicode.chars().count() < self.options.min_text_length {
            debug!(
                "Text too short to translate, skip. Text: {}. Paragraph id: {}.",
                input.unicode, paragraph.debug_id
            );
            return Ok(None);
        }
        Ok(Some(input))
    }

    fn build_prompt(&self, translator: &dyn Translator, input: &TranslateInput, titles: &TitleSnapshot) -> String {
        let formula_hint = if self.options.add_formula_placeholder_hint {
            input.placeholders_hint()
        } else {
            None
        };
        TranslationPromptBuilder::new(&self.options.target_language)
            .with_custom_system_prompt(self.options.custom_system_prompt.as_deref())
            .with_titles(titles.first.as_deref(), titles.recent.as_deref())
            .with_formula_hint(formula_hint)
            .build(translator, &input.unicode)
    }

    async fn call_backend(
        &self,
        input: &TranslateInput,
        tracker: &mut ParagraphTracker,
        titles: &TitleSnapshot,
        token_count: usize,
    ) -> Result<String, TranslationError> {
        let hint = RateLimitHint::new(token_count);
        let attempt = tracker.new_llm_translate_tracker();

        match &self.backend {
            TranslatorBackend::Plain(translator) => Ok(translator.translate(&input.unicode, hint).await?),
            TranslatorBackend::Llm(translator) => {
                let prompt = self.build_prompt(translator.as_ref(), input, titles);
                attempt.set_input(prompt.as_str());
                match translator.llm_translate(Some(&prompt), hint).await {
                    Ok(output) => {
                        attempt.set_output(output.as_str());
                        Ok(output)
                    }
                    Err(e) if self.options.fallback_to_plain_translate => {
                        warn!("LLM translation failed ({}), falling back to plain translation", e);
                        attempt.set_error_message(e.to_string());
                        attempt.set_fallback_to_translate();
                        Ok(translator.translate(&input.unicode, hint).await?)
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    fn apply(
        &self,
        paragraph: &mut Paragraph,
        tracker: &mut ParagraphTracker,
        input: &TranslateInput,
        translated: String,
    ) -> Result<ParagraphOutcome, TranslationError> {
        tracker.set_output(translated.as_str());
        if translated == input.unicode {
            if let Some(attempt) = tracker.last_llm_translate_tracker() {
                attempt.set_placeholder_full_match();
            }
            return Ok(ParagraphOutcome::Unchanged);
        }

        let outcome = reparse(input, &translated)?;
        if outcome.placeholder_full_match {
            if let Some(attempt) = tracker.last_llm_translate_tracker() {
                attempt.set_placeholder_full_match();
            }
        }

        let base_style = paragraph.style.clone();
        paragraph.unicode = translated;
        paragraph.compositions = outcome.compositions;
        for composition in &mut paragraph.compositions {
            if let Composition::SameStyleUnicodeCharacters(run) = composition {
                if run.style.is_none() {
                    run.style = base_style.clone();
                }
            }
        }
        Ok(ParagraphOutcome::Translated)
    }
}
