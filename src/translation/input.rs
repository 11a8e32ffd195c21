/*!
 * Flattening paragraphs into translator input.
 *
 * A paragraph's compositions are turned into a single string in which
 * formulas are replaced by a placeholder token and styled runs that need
 * protecting are wrapped in a left/right token pair. The placeholders are
 * kept alongside the text so the translated output can be mapped back.
 */

use log::{error, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::document::{
    Composition, FontMap, FontResolver, Paragraph, ResolvedFont, SameStyleCharacters, Style,
    characters_to_string,
};
use crate::errors::TranslationError;
use crate::providers::Translator;
use crate::translation::placeholder::{Placeholder, PlaceholderFactory};
use crate::translation::style::{is_same_style, is_same_style_except_font, is_same_style_except_size};

/// Placeholder count above which rich text is dropped for a paragraph
pub const MAX_PLACEHOLDERS: usize = 40;

/// Formulas made of more unmapped glyphs than this share get no hint
const UNMAPPED_HINT_RATIO: f64 = 0.8;

/// Encoding hint handed to the font resolver
const FONT_ENCODING_HINT: &str = "1";

/// Text sent to the translator plus what is needed to rebuild the paragraph.
#[derive(Debug, Clone)]
pub struct TranslateInput {
    pub unicode: String,
    pub placeholders: Vec<Placeholder>,
    pub base_style: Option<Style>,
}

impl TranslateInput {
    /// Map from formula token to formula text.
    ///
    /// Formulas that are mostly `(cid:N)` markers carry no useful text and
    /// are left out. Returns `None` when nothing is left.
    pub fn placeholders_hint(&self) -> Option<BTreeMap<String, String>> {
        let hint: BTreeMap<String, String> = self
            .placeholders
            .iter()
            .filter_map(|placeholder| match placeholder {
                Placeholder::Formula(p) => Some(p),
                Placeholder::RichText(_) => None,
            })
            .filter(|p| {
                let total = p.formula.characters.len();
                let unmapped = p.formula.characters.iter().filter(|c| c.is_unmapped()).count();
                (unmapped as f64) <= total as f64 * UNMAPPED_HINT_RATIO
            })
            .map(|p| (p.token.clone(), p.formula.text()))
            .collect();

        if hint.is_empty() { None } else { Some(hint) }
    }

    pub fn has_rich_text(&self) -> bool {
        self.placeholders.iter().any(|p| matches!(p, Placeholder::RichText(_)))
    }
}

/// Builds a `TranslateInput` for one paragraph.
pub struct TranslateInputBuilder<'a> {
    factory: PlaceholderFactory<'a>,
    font_resolver: &'a dyn FontResolver,
}

impl<'a> TranslateInputBuilder<'a> {
    pub fn new(source: &'a dyn Translator, font_resolver: &'a dyn FontResolver) -> Self {
        Self {
            factory: PlaceholderFactory::new(source),
            font_resolver,
        }
    }

    /// Build the translator input for `paragraph`.
    ///
    /// `Ok(None)` means there is nothing to translate, either because the
    /// paragraph has no content, is a lone formula or already translated
    /// text, or contains a composition this crate does not understand.
    pub fn build(
        &self,
        paragraph: &Paragraph,
        fonts: &FontMap,
        disable_rich_text: bool,
    ) -> Result<Option<TranslateInput>, TranslationError> {
        match paragraph.compositions.as_slice() {
            [] => Ok(None),
            [single] => Ok(Self::build_single(paragraph, single)),
            _ => self.build_many(paragraph, fonts, disable_rich_text),
        }
    }

    fn build_single(paragraph: &Paragraph, composition: &Composition) -> Option<TranslateInput> {
        match composition {
            Composition::Line(_) | Composition::Character(_) | Composition::SameStyleCharacters(_) => {
                Some(TranslateInput {
                    unicode: paragraph.unicode.clone(),
                    placeholders: Vec::new(),
                    base_style: paragraph.style.clone(),
                })
            }
            // A lone formula is never translated
            Composition::Formula(_) => None,
            Composition::SameStyleUnicodeCharacters(_) => None,
            Composition::Unknown => {
                error!("Unknown composition type in paragraph {} ({})", paragraph.debug_id, paragraph.unicode);
                None
            }
        }
    }

    fn build_many(
        &self,
        paragraph: &Paragraph,
        fonts: &FontMap,
        disable_rich_text: bool,
    ) -> Result<Option<TranslateInput>, TranslationError> {
        let mut next_id = 1;
        let mut placeholders = Vec::new();
        let mut text = String::new();

        for composition in &paragraph.compositions {
            match composition {
                Composition::Line(line) => text.push_str(&characters_to_string(&line.characters)),
                Composition::Character(character) => text.push_str(&character.char_unicode),
                Composition::Formula(formula) => {
                    let placeholder = self.factory.make_formula_placeholder(formula, next_id, &paragraph.unicode)?;
                    next_id = placeholder.id + 1;
                    text.push_str(&placeholder.token);
                    placeholders.push(Placeholder::Formula(placeholder));
                }
                Composition::SameStyleCharacters(run) => {
                    let raw = characters_to_string(&run.characters);
                    if disable_rich_text || self.can_skip_placeholder(run, paragraph, fonts) {
                        text.push_str(&raw);
                        continue;
                    }
                    let placeholder = self.factory.make_rich_text_placeholder(run, next_id, &paragraph.unicode)?;
                    next_id = placeholder.id + 2;
                    text.push_str(&placeholder.left_token);
                    text.push_str(&raw);
                    text.push_str(&placeholder.right_token);
                    placeholders.push(Placeholder::RichText(placeholder));
                }
                Composition::SameStyleUnicodeCharacters(_) | Composition::Unknown => {
                    error!(
                        "Unexpected composition in paragraph {} during translation ({})",
                        paragraph.debug_id, paragraph.unicode
                    );
                    return Ok(None);
                }
            }

            if placeholders.len() > MAX_PLACEHOLDERS && !disable_rich_text {
                warn!(
                    "Too many placeholders ({}) in paragraph {}, disabling rich text translation for this paragraph",
                    placeholders.len(),
                    paragraph.debug_id
                );
                return self.build_many(paragraph, fonts, true);
            }
        }

        Ok(Some(TranslateInput {
            unicode: text,
            placeholders,
            base_style: paragraph.style.clone(),
        }))
    }

    /// Whether a styled run renders like the paragraph around it.
    fn can_skip_placeholder(&self, run: &Arc<SameStyleCharacters>, paragraph: &Paragraph, fonts: &FontMap) -> bool {
        let Some(base) = paragraph.style.as_ref() else {
            return false;
        };
        if is_same_style(&run.style, base) || is_same_style_except_size(&run.style, base) {
            return true;
        }
        if !is_same_style_except_font(&run.style, base) {
            return false;
        }
        match (self.resolve_font(&run.style, fonts), self.resolve_font(base, fonts)) {
            (Some(a), Some(b)) => a.font_id == b.font_id,
            _ => false,
        }
    }

    fn resolve_font(&self, style: &Style, fonts: &FontMap) -> Option<ResolvedFont> {
        let font = fonts.get(style.font_id.as_deref()?)?;
        self.font_resolver.map(font, FONT_ENCODING_HINT)
    }
}
