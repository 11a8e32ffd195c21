/*!
 * Rebuilding paragraph compositions from translated text.
 *
 * The translated text is scanned for the placeholders that were sent out.
 * Formula placeholders come back as the original formula, styled runs come
 * back either as the original run (when the translator left it alone) or as
 * translated text carrying the run's style. Everything in between becomes
 * plain translated text with stray placeholder tokens removed.
 */

use log::debug;
use regex::{Captures, Regex, RegexBuilder};

use crate::document::Composition;
use crate::errors::TranslationError;
use crate::translation::input::TranslateInput;
use crate::translation::placeholder::Placeholder;

/// Result of reparsing one translation.
#[derive(Debug, Clone)]
pub struct ReparseOutcome {
    pub compositions: Vec<Composition>,
    /// Every placeholder was found somewhere in the output
    pub placeholder_full_match: bool,
}

fn case_insensitive(pattern: &str) -> Result<Regex, TranslationError> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

fn group_name(index: usize) -> String {
    format!("ph{}", index)
}

fn inner_name(index: usize) -> String {
    format!("in{}", index)
}

/// Patterns compiled for one `TranslateInput`.
pub struct OutputReparser<'a> {
    input: &'a TranslateInput,
    /// One pattern per placeholder, for the full-match check
    checks: Vec<Regex>,
    /// Alternation of all placeholders, one named group each
    combined: Option<Regex>,
    /// Alternation of every individual token pattern
    strip: Option<Regex>,
}

impl<'a> OutputReparser<'a> {
    pub fn new(input: &'a TranslateInput) -> Result<Self, TranslationError> {
        if input.placeholders.is_empty() {
            return Ok(Self {
                input,
                checks: Vec::new(),
                combined: None,
                strip: None,
            });
        }

        let mut checks = Vec::with_capacity(input.placeholders.len());
        let mut alternatives = Vec::with_capacity(input.placeholders.len());
        let mut strip_alternatives = Vec::new();

        for (index, placeholder) in input.placeholders.iter().enumerate() {
            checks.push(case_insensitive(&placeholder.capture_pattern())?);
            strip_alternatives.extend(placeholder.strip_patterns());
            let alternative = match placeholder {
                Placeholder::Formula(p) => format!("(?P<{}>{})", group_name(index), p.pattern),
                Placeholder::RichText(p) => format!(
                    "(?P<{}>(?:{})(?P<{}>.*?)(?:{}))",
                    group_name(index),
                    p.left_pattern,
                    inner_name(index),
                    p.right_pattern
                ),
            };
            alternatives.push(alternative);
        }

        Ok(Self {
            input,
            checks,
            combined: Some(case_insensitive(&alternatives.join("|"))?),
            strip: Some(case_insensitive(&strip_alternatives.join("|"))?),
        })
    }

    /// Whether every placeholder occurs somewhere in `output`.
    pub fn is_full_match(&self, output: &str) -> bool {
        self.checks.iter().all(|re| re.is_match(output))
    }

    fn remove_placeholders(&self, text: &str) -> String {
        match &self.strip {
            Some(strip) => strip.replace_all(text, "").into_owned(),
            None => text.to_string(),
        }
    }

    fn plain(&self, text: &str, compositions: &mut Vec<Composition>) {
        let stripped = self.remove_placeholders(text);
        if !stripped.is_empty() {
            compositions.push(Composition::unicode(stripped, self.input.base_style.clone()));
        }
    }

    /// Turn translated `output` into compositions.
    pub fn reparse(&self, output: &str) -> Result<ReparseOutcome, TranslationError> {
        let Some(combined) = &self.combined else {
            return Ok(ReparseOutcome {
                compositions: vec![Composition::unicode(output, self.input.base_style.clone())],
                placeholder_full_match: true,
            });
        };

        let placeholder_full_match = self.is_full_match(output);
        if !placeholder_full_match {
            debug!("Failed to match all placeholders for {}", self.input.unicode);
        }

        let mut compositions = Vec::new();
        let mut last_end = 0;
        for caps in combined.captures_iter(output) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.start() > last_end {
                self.plain(&output[last_end..whole.start()], &mut compositions);
            }
            compositions.push(self.placeholder_composition(&caps, whole.as_str())?);
            last_end = whole.end();
        }
        if last_end < output.len() {
            self.plain(&output[last_end..], &mut compositions);
        }

        Ok(ReparseOutcome {
            compositions,
            placeholder_full_match,
        })
    }

    fn placeholder_composition(&self, caps: &Captures<'_>, matched: &str) -> Result<Composition, TranslationError> {
        let (index, placeholder) = self
            .input
            .placeholders
            .iter()
            .enumerate()
            .find(|(index, _)| caps.name(&group_name(*index)).is_some())
            .ok_or_else(|| {
                TranslationError::InconsistentPlaceholder(format!("no placeholder owns match {:?}", matched))
            })?;

        match placeholder {
            Placeholder::Formula(p) => Ok(Composition::Formula(p.formula.clone())),
            Placeholder::RichText(p) => {
                let inner = caps.name(&inner_name(index)).map_or("", |m| m.as_str());
                let original = p.run.text();
                if inner.replace(' ', "") == original.replace(' ', "") {
                    Ok(Composition::SameStyleCharacters(p.run.clone()))
                } else {
                    Ok(Composition::unicode(self.remove_placeholders(inner), Some(p.run.style.clone())))
                }
            }
        }
    }
}

/// Reparse `output` against the placeholders of `input`.
pub fn reparse(input: &TranslateInput, output: &str) -> Result<ReparseOutcome, TranslationError> {
    OutputReparser::new(input)?.reparse(output)
}
