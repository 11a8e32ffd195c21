/*!
 * Prompt construction for LLM-capable backends.
 *
 * The prompt is a system line naming the target language, an optional list
 * of hints about the document (titles, formula contents), the placeholder
 * rules and finally the text to translate after a fixed marker.
 */

use std::collections::BTreeMap;

use crate::document::Paragraph;
use crate::providers::Translator;

/// Line introducing the text to translate; everything after it is the source text
pub const SOURCE_TEXT_MARKER: &str =
    "Now, please carefully read the following text to be translated and directly output your translation.\n\n";

const HINTS_HEADER: &str =
    "When translating, please refer to the following information to improve translation quality:";

const RULES_HEADER: &str = "When translating, please follow the following rules:";

/// Builder for a single paragraph's LLM prompt.
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder<'a> {
    target_language: &'a str,
    custom_system_prompt: Option<&'a str>,
    first_title: Option<&'a Paragraph>,
    recent_title: Option<&'a Paragraph>,
    formula_hint: Option<BTreeMap<String, String>>,
}

impl<'a> TranslationPromptBuilder<'a> {
    pub fn new(target_language: &'a str) -> Self {
        Self {
            target_language,
            custom_system_prompt: None,
            first_title: None,
            recent_title: None,
            formula_hint: None,
        }
    }

    /// Replace the generated system line.
    pub fn with_custom_system_prompt(mut self, prompt: Option<&'a str>) -> Self {
        self.custom_system_prompt = prompt.filter(|p| !p.trim().is_empty());
        self
    }

    /// Document titles used as context.
    pub fn with_titles(mut self, first: Option<&'a Paragraph>, recent: Option<&'a Paragraph>) -> Self {
        self.first_title = first;
        self.recent_title = recent;
        self
    }

    pub fn with_formula_hint(mut self, hint: Option<BTreeMap<String, String>>) -> Self {
        self.formula_hint = hint;
        self
    }

    fn system_line(&self) -> String {
        match self.custom_system_prompt {
            Some(prompt) => prompt.to_string(),
            None => format!(
                "You are a professional and reliable machine translation engine responsible for translating the input text into {}.",
                self.target_language
            ),
        }
    }

    fn hints(&self) -> Vec<String> {
        let mut hints = Vec::new();
        if let Some(first) = self.first_title {
            hints.push(format!("The first title in the full text: {}", first.unicode));
        }
        if let Some(recent) = self.recent_title {
            let same_as_first = self.first_title.is_some_and(|first| first.debug_id == recent.debug_id);
            if !same_as_first {
                hints.push(format!("The most similar title in the full text: {}", recent.unicode));
            }
        }
        if let Some(hint) = &self.formula_hint {
            hints.push(format!("This is the formula placeholder hint: \n{}", render_formula_hint(hint)));
        }
        hints
    }

    /// Render the prompt for `text`, using `translator`'s own placeholder tokens in the rules.
    pub fn build(&self, translator: &dyn Translator, text: &str) -> String {
        let mut lines = vec![self.system_line()];

        let hints = self.hints();
        if !hints.is_empty() {
            lines.push(HINTS_HEADER.to_string());
            lines.extend(hints.iter().enumerate().map(|(i, hint)| format!("{}. {}", i, hint)));
        }

        let left = translator.rich_text_left_placeholder(1);
        let right = translator.rich_text_right_placeholder(2);
        let formula = translator.formula_placeholder(3);

        lines.push(RULES_HEADER.to_string());
        lines.push(format!(
            "1. Do not translate style tags, such as \"{}xxx{}\"!",
            left.token(),
            right.token()
        ));
        lines.push(format!(
            "2. Do not translate formula placeholders, such as \"{}\". The system will automatically replace the placeholders with the corresponding formulas.",
            formula.token()
        ));
        lines.push(
            "3. If there is no need to translate (such as proper nouns, codes, etc.), then return the original text."
                .to_string(),
        );
        lines.push("4. Only output the translation result without explanations and annotations.".to_string());
        lines.push(format!("5. Translate text into {}.", self.target_language));
        lines.push(format!("\n{}{}\n\n", SOURCE_TEXT_MARKER, text));

        lines.join("\n").trim().to_string()
    }
}

/// Text to translate embedded in a prompt built by `TranslationPromptBuilder`.
///
/// Prompts without the marker are returned whole.
pub fn extract_source_text(prompt: &str) -> &str {
    match prompt.rfind(SOURCE_TEXT_MARKER) {
        Some(pos) => &prompt[pos + SOURCE_TEXT_MARKER.len()..],
        None => prompt,
    }
}

/// One `token: formula` line per entry, in token order
fn render_formula_hint(hint: &BTreeMap<String, String>) -> String {
    hint.iter()
        .map(|(token, formula)| format!("{}: {}", token, formula))
        .collect::<Vec<_>>()
        .join("\n")
}
