/*!
 * Placeholder tokens protecting formulas and styled runs.
 *
 * Placeholders live for one translation attempt of one paragraph. A token
 * is only accepted if it does not already occur in the paragraph's text;
 * otherwise the next id is tried.
 */

use std::sync::Arc;

use crate::document::{Formula, SameStyleCharacters};
use crate::errors::{PlaceholderKind, TranslationError};
use crate::providers::Translator;

pub use crate::providers::PlaceholderToken;

/// Highest number of ids tried for a single placeholder
pub const MAX_PLACEHOLDER_ATTEMPTS: usize = 10_000;

/// Single token standing in for a formula.
#[derive(Debug, Clone)]
pub struct FormulaPlaceholder {
    pub id: usize,
    pub formula: Arc<Formula>,
    pub token: String,
    pub pattern: String,
}

/// Token pair wrapping a styled run.
#[derive(Debug, Clone)]
pub struct RichTextPlaceholder {
    pub id: usize,
    pub run: Arc<SameStyleCharacters>,
    pub left_token: String,
    pub left_pattern: String,
    pub right_token: String,
    pub right_pattern: String,
}

#[derive(Debug, Clone)]
pub enum Placeholder {
    Formula(FormulaPlaceholder),
    RichText(RichTextPlaceholder),
}

impl Placeholder {
    pub fn id(&self) -> usize {
        match self {
            Self::Formula(p) => p.id,
            Self::RichText(p) => p.id,
        }
    }

    /// Pattern locating the whole placeholder in translated text.
    pub fn capture_pattern(&self) -> String {
        match self {
            Self::Formula(p) => format!("(?:{})", p.pattern),
            Self::RichText(p) => format!("(?:{}.*?{})", p.left_pattern, p.right_pattern),
        }
    }

    /// Patterns of the individual tokens, used to strip leftovers.
    pub fn strip_patterns(&self) -> Vec<String> {
        match self {
            Self::Formula(p) => vec![format!("(?:{})", p.pattern)],
            Self::RichText(p) => vec![format!("(?:{})", p.left_pattern), format!("(?:{})", p.right_pattern)],
        }
    }
}

/// Allocates collision-free placeholders from a translator's token source.
pub struct PlaceholderFactory<'a> {
    source: &'a dyn Translator,
}

impl<'a> PlaceholderFactory<'a> {
    pub fn new(source: &'a dyn Translator) -> Self {
        Self { source }
    }

    /// Formula placeholder with the lowest free id starting at `start_id`.
    pub fn make_formula_placeholder(
        &self,
        formula: &Arc<Formula>,
        start_id: usize,
        paragraph_text: &str,
    ) -> Result<FormulaPlaceholder, TranslationError> {
        for id in start_id..start_id.saturating_add(MAX_PLACEHOLDER_ATTEMPTS) {
            let (token, pattern) = self.source.formula_placeholder(id).into_parts();
            if paragraph_text.contains(&token) {
                continue;
            }
            return Ok(FormulaPlaceholder {
                id,
                formula: Arc::clone(formula),
                token,
                pattern,
            });
        }
        Err(TranslationError::PlaceholderExhausted {
            kind: PlaceholderKind::Formula,
            start_id,
            attempts: MAX_PLACEHOLDER_ATTEMPTS,
        })
    }

    /// Rich-text placeholder whose two tokens are both free.
    pub fn make_rich_text_placeholder(
        &self,
        run: &Arc<SameStyleCharacters>,
        start_id: usize,
        paragraph_text: &str,
    ) -> Result<RichTextPlaceholder, TranslationError> {
        for id in start_id..start_id.saturating_add(MAX_PLACEHOLDER_ATTEMPTS) {
            let (left_token, left_pattern) = self.source.rich_text_left_placeholder(id).into_parts();
            let (right_token, right_pattern) = self.source.rich_text_right_placeholder(id).into_parts();
            if paragraph_text.contains(&left_token) || paragraph_text.contains(&right_token) {
                continue;
            }
            return Ok(RichTextPlaceholder {
                id,
                run: Arc::clone(run),
                left_token,
                left_pattern,
                right_token,
                right_pattern,
            });
        }
        Err(TranslationError::PlaceholderExhausted {
            kind: PlaceholderKind::RichText,
            start_id,
            attempts: MAX_PLACEHOLDER_ATTEMPTS,
        })
    }
}
