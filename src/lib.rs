/*!
 * # Paraglot - paragraph translation with placeholder protection
 *
 * A Rust library for translating the paragraphs of a laid-out document
 * with an LLM while keeping formulas and styled runs intact.
 *
 * ## Features
 *
 * - Formulas and differently styled runs are replaced by placeholder
 *   tokens that cannot collide with the paragraph text
 * - Translator output is reparsed back into formulas, styled runs and
 *   plain runs, tolerating the spacing and casing changes models make
 * - Paragraphs are scheduled by a priority pool sized from a
 *   requests-per-second budget
 * - Every paragraph leaves a trace in an optional JSON tracking report
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: Intermediate document representation and font tables
 * - `translation`: The placeholder protocol and translation pipeline:
 *   - `translation::input`: Translator input construction
 *   - `translation::reparse`: Reassembling translated paragraphs
 *   - `translation::paragraph`: The per-paragraph pipeline
 *   - `translation::core`: Whole-document translation
 * - `providers`: Translator backends:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::mock`: Scriptable backend for tests and dry runs
 * - `progress`: Progress reporting and cancellation
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod progress;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use document::{Composition, Document, Paragraph};
pub use errors::{AppError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use translation::DocumentTranslator;
