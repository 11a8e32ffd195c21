/*!
 * Error types for the paraglot application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with translator backends
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// The backend does not offer this capability
    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

/// Kind of placeholder being allocated, for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    Formula,
    RichText,
}

impl std::fmt::Display for PlaceholderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Formula => write!(f, "formula"),
            Self::RichText => write!(f, "rich text"),
        }
    }
}

/// Errors that can occur while translating a document
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the translator backend
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The run was cancelled cooperatively
    #[error("Translation cancelled")]
    Cancelled,

    /// No collision-free placeholder token was found
    #[error("No free {kind} placeholder after {attempts} ids starting at {start_id}")]
    PlaceholderExhausted {
        kind: PlaceholderKind,
        start_id: usize,
        attempts: usize,
    },

    /// A placeholder pattern could not be compiled
    #[error("Invalid placeholder pattern: {0}")]
    InvalidPattern(String),

    /// A matched placeholder could not be attributed to its origin
    #[error("Inconsistent placeholder match: {0}")]
    InconsistentPlaceholder(String),

    /// The document is malformed
    #[error("Document error: {0}")]
    Document(String),

    /// The token encoder could not be loaded
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),
}

impl From<regex::Error> for TranslationError {
    fn from(error: regex::Error) -> Self {
        Self::InvalidPattern(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
