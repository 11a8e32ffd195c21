/*!
 * Per-paragraph translation diagnostics.
 *
 * The tracker tree mirrors the document: one page tracker per page, one
 * paragraph tracker per paragraph, and for each paragraph the list of LLM
 * attempts. Paragraph trackers travel with their paragraph into the worker
 * task and are put back in place when the task finishes.
 */

use serde::Serialize;

/// One call to the translation backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LlmTranslateTracker {
    pub input: String,
    pub output: String,
    pub has_error: bool,
    pub error_message: String,
    pub placeholder_full_match: bool,
    pub fallback_to_translate: bool,
}

impl LlmTranslateTracker {
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn set_output(&mut self, output: impl Into<String>) {
        self.output = output.into();
    }

    pub fn set_error_message(&mut self, message: impl Into<String>) {
        self.has_error = true;
        self.error_message = message.into();
    }

    pub fn set_placeholder_full_match(&mut self) {
        self.placeholder_full_match = true;
    }

    pub fn set_fallback_to_translate(&mut self) {
        self.fallback_to_translate = true;
    }
}

/// Everything observed while translating one paragraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphTracker {
    pub pdf_unicode: Option<String>,
    pub input: Option<String>,
    pub output: Option<String>,
    pub llm_translate_trackers: Vec<LlmTranslateTracker>,
}

impl ParagraphTracker {
    pub fn set_pdf_unicode(&mut self, unicode: impl Into<String>) {
        self.pdf_unicode = Some(unicode.into());
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = Some(input.into());
    }

    pub fn set_output(&mut self, output: impl Into<String>) {
        self.output = Some(output.into());
    }

    /// Start recording a new attempt.
    pub fn new_llm_translate_tracker(&mut self) -> &mut LlmTranslateTracker {
        self.llm_translate_trackers.push(LlmTranslateTracker::default());
        let last = self.llm_translate_trackers.len() - 1;
        &mut self.llm_translate_trackers[last]
    }

    pub fn last_llm_translate_tracker(&mut self) -> Option<&mut LlmTranslateTracker> {
        self.llm_translate_trackers.last_mut()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageTracker {
    pub paragraphs: Vec<ParagraphTracker>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentTracker {
    pub pages: Vec<PageTracker>,
}

#[derive(Serialize)]
struct ParagraphReport<'a> {
    input: &'a str,
    output: Option<&'a str>,
    pdf_unicode: &'a str,
    llm_translate_trackers: &'a [LlmTranslateTracker],
}

#[derive(Serialize)]
struct PageReport<'a> {
    paragraph: Vec<ParagraphReport<'a>>,
}

#[derive(Serialize)]
struct DocumentReport<'a> {
    page: Vec<PageReport<'a>>,
}

impl DocumentTracker {
    /// Pretty JSON report; paragraphs that never got as far as an input are left out.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let report = DocumentReport {
            page: self
                .pages
                .iter()
                .map(|page| PageReport {
                    paragraph: page
                        .paragraphs
                        .iter()
                        .filter_map(|p| {
                            Some(ParagraphReport {
                                input: p.input.as_deref()?,
                                output: p.output.as_deref(),
                                pdf_unicode: p.pdf_unicode.as_deref()?,
                                llm_translate_trackers: &p.llm_translate_trackers,
                            })
                        })
                        .collect(),
                })
                .collect(),
        };
        serde_json::to_string_pretty(&report)
    }
}
