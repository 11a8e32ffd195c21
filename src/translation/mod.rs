/*!
 * Paragraph translation with placeholder protection.
 *
 * Formulas and styled runs are replaced by placeholder tokens before a
 * paragraph reaches the translator and are put back afterwards:
 *
 * - `style`: Style comparison for deciding which runs need protecting
 * - `placeholder`: Collision-free placeholder allocation
 * - `input`: Translator input construction
 * - `prompts`: LLM prompt construction
 * - `reparse`: Rebuilding compositions from translated text
 * - `paragraph`: The per-paragraph pipeline
 * - `scheduler`: Priority worker pool
 * - `context`: Title context shared across paragraphs
 * - `tracker`: Diagnostic trace of every translation
 * - `tokens`: Token estimation used for scheduling
 * - `core`: Whole-document translation
 */

// Re-export main types for easier usage
pub use self::core::DocumentTranslator;
pub use self::input::{TranslateInput, TranslateInputBuilder};
pub use self::paragraph::{ParagraphOptions, ParagraphOutcome, ParagraphTranslator};
pub use self::placeholder::{FormulaPlaceholder, Placeholder, PlaceholderFactory, RichTextPlaceholder};
pub use self::reparse::{OutputReparser, ReparseOutcome};
pub use self::scheduler::PriorityWorkerPool;
pub use self::tracker::{DocumentTracker, ParagraphTracker};

// Submodules
pub mod context;
pub mod core;
pub mod input;
pub mod paragraph;
pub mod placeholder;
pub mod prompts;
pub mod reparse;
pub mod scheduler;
pub mod style;
pub mod tokens;
pub mod tracker;
