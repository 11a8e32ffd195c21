/*!
 * Translator backends.
 *
 * This module defines the interface every backend implements and the
 * capability profile the pipeline selects once per run:
 * - `ollama`: Local LLM server, LLM-capable
 * - `mock`: Scriptable backend for tests and dry runs
 */

use async_trait::async_trait;
use log::debug;
use std::fmt::Debug;
use std::sync::Arc;

use crate::errors::ProviderError;

/// Scheduling hint passed along with every translation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitHint {
    /// Estimated token count of the paragraph being translated
    pub paragraph_token_count: usize,
}

impl RateLimitHint {
    pub fn new(paragraph_token_count: usize) -> Self {
        Self { paragraph_token_count }
    }
}

/// Placeholder token handed out by a backend.
///
/// A backend may return just the token, in which case the token is located
/// in translated text by exact (escaped) match, or the token together with
/// a regular expression that also accepts the variants its model tends to
/// produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderToken {
    Bare(String),
    WithPattern { token: String, pattern: String },
}

impl PlaceholderToken {
    pub fn with_pattern(token: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::WithPattern {
            token: token.into(),
            pattern: pattern.into(),
        }
    }

    /// The literal token inserted into the text.
    pub fn token(&self) -> &str {
        match self {
            Self::Bare(token) => token,
            Self::WithPattern { token, .. } => token,
        }
    }

    /// Split into `(token, pattern)`, escaping bare tokens.
    pub fn into_parts(self) -> (String, String) {
        match self {
            Self::Bare(token) => {
                let pattern = regex::escape(&token);
                (token, pattern)
            }
            Self::WithPattern { token, pattern } => (token, pattern),
        }
    }
}

impl From<&str> for PlaceholderToken {
    fn from(token: &str) -> Self {
        Self::Bare(token.to_string())
    }
}

/// Common trait for all translator backends
///
/// `translate` is the plain interface every backend offers. Backends that can
/// follow a full prompt override `llm_translate`; it must answer a `None`
/// prompt with `Ok` so the capability can be probed once at startup.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Translate plain text
    async fn translate(&self, text: &str, hint: RateLimitHint) -> Result<String, ProviderError>;

    /// Run a complete prompt and return the model's answer
    async fn llm_translate(&self, prompt: Option<&str>, hint: RateLimitHint) -> Result<String, ProviderError> {
        let _ = (prompt, hint);
        Err(ProviderError::NotImplemented("llm_translate".to_string()))
    }

    /// Token protecting the formula with the given id
    fn formula_placeholder(&self, id: usize) -> PlaceholderToken {
        PlaceholderToken::with_pattern(format!("{{v{}}}", id), format!(r"\{{\s*v\s*{}\s*\}}", id))
    }

    /// Token opening the styled run with the given id
    fn rich_text_left_placeholder(&self, id: usize) -> PlaceholderToken {
        PlaceholderToken::with_pattern(
            format!("<style id='{}'>", id),
            format!(r#"<\s*style\s*id\s*=\s*['"]?\s*{}\s*['"]?\s*>"#, id),
        )
    }

    /// Token closing the styled run with the given id
    fn rich_text_right_placeholder(&self, id: usize) -> PlaceholderToken {
        let _ = id;
        PlaceholderToken::with_pattern("</style>", r"<\s*/\s*style\s*>")
    }
}

/// Capability profile of the backend, decided once per run
#[derive(Debug, Clone)]
pub enum TranslatorBackend {
    /// Only the plain `translate` interface is available
    Plain(Arc<dyn Translator>),
    /// The backend follows full prompts through `llm_translate`
    Llm(Arc<dyn Translator>),
}

impl TranslatorBackend {
    /// Probe the backend with a null prompt to find out what it supports
    pub async fn probe(translator: Arc<dyn Translator>) -> Result<Self, ProviderError> {
        match translator.llm_translate(None, RateLimitHint::default()).await {
            Ok(_) => {
                debug!("Translator {:?} supports LLM translation", translator);
                Ok(Self::Llm(translator))
            }
            Err(ProviderError::NotImplemented(_)) => {
                debug!("Translator {:?} only supports plain translation", translator);
                Ok(Self::Plain(translator))
            }
            Err(e) => Err(e),
        }
    }

    pub fn translator(&self) -> &Arc<dyn Translator> {
        match self {
            Self::Plain(translator) | Self::Llm(translator) => translator,
        }
    }

    pub fn supports_llm(&self) -> bool {
        matches!(self, Self::Llm(_))
    }
}

pub mod mock;
pub mod ollama;
