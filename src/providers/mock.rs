/*!
 * Mock translator implementations for testing and dry runs.
 *
 * This module provides a translator that simulates different behaviors:
 * - `MockTranslator::echo()` - Returns the text unchanged
 * - `MockTranslator::scripted(f)` - Returns `f(text)`
 * - `MockTranslator::failing()` - Always fails with an error
 * - `MockTranslator::intermittent(n)` - Fails every n-th request
 *
 * Each mock is LLM-capable unless built with `plain_only()`. In LLM mode
 * the behavior is applied to the text embedded at the end of the prompt.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{PlaceholderToken, RateLimitHint, Translator};
use crate::translation::prompts::extract_source_text;

/// Response generator applied to the text to translate
pub type ResponseFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Behavior mode for the mock translator
#[derive(Clone)]
pub enum MockBehavior {
    /// Returns the input text unchanged
    Echo,
    /// Returns the output of a generator
    Scripted(ResponseFn),
    /// Fails every Nth request
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Sleeps before echoing (for concurrency testing)
    Slow { delay_ms: u64 },
}

impl fmt::Debug for MockBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Echo => write!(f, "Echo"),
            Self::Scripted(_) => write!(f, "Scripted"),
            Self::Intermittent { fail_every } => write!(f, "Intermittent({})", fail_every),
            Self::Failing => write!(f, "Failing"),
            Self::Slow { delay_ms } => write!(f, "Slow({}ms)", delay_ms),
        }
    }
}

/// Placeholder tokens handed out by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockPlaceholders {
    /// The trait defaults
    Default,
    /// Bare `{vN}`, `<LN>` and `<RN>` tokens
    Angle,
}

/// A request received by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    /// Text or prompt as received
    pub input: String,
    /// Whether it came through `llm_translate`
    pub llm: bool,
    pub hint: RateLimitHint,
}

/// Mock translator for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockTranslator {
    behavior: MockBehavior,
    llm_capable: bool,
    placeholders: MockPlaceholders,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Requests received, shared between clones
    requests: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            llm_capable: true,
            placeholders: MockPlaceholders::Default,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn scripted(generator: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self::new(MockBehavior::Scripted(Arc::new(generator)))
    }

    /// Always return the same text
    pub fn fixed(response: impl Into<String>) -> Self {
        let response = response.into();
        Self::scripted(move |_| response.clone())
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Disable the LLM interface
    pub fn plain_only(mut self) -> Self {
        self.llm_capable = false;
        self
    }

    pub fn with_placeholders(mut self, placeholders: MockPlaceholders) -> Self {
        self.placeholders = placeholders;
        self
    }

    /// Number of translation requests received (probes excluded)
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of the requests received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    async fn respond(&self, input: &str, text: &str, llm: bool, hint: RateLimitHint) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(MockRequest {
            input: input.to_string(),
            llm,
            hint,
        });

        match &self.behavior {
            MockBehavior::Echo => Ok(text.to_string()),
            MockBehavior::Scripted(generator) => Ok(generator(text)),
            MockBehavior::Intermittent { fail_every } => {
                if *fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(text.to_string())
                }
            }
            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Ok(text.to_string())
            }
        }
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, hint: RateLimitHint) -> Result<String, ProviderError> {
        self.respond(text, text, false, hint).await
    }

    async fn llm_translate(&self, prompt: Option<&str>, hint: RateLimitHint) -> Result<String, ProviderError> {
        if !self.llm_capable {
            return Err(ProviderError::NotImplemented("mock translator is plain only".to_string()));
        }
        match prompt {
            None => Ok(String::new()),
            Some(prompt) => self.respond(prompt, extract_source_text(prompt), true, hint).await,
        }
    }

    fn formula_placeholder(&self, id: usize) -> PlaceholderToken {
        match self.placeholders {
            MockPlaceholders::Default => PlaceholderToken::with_pattern(
                format!("{{v{}}}", id),
                format!(r"\{{\s*v\s*{}\s*\}}", id),
            ),
            MockPlaceholders::Angle => PlaceholderToken::Bare(format!("{{v{}}}", id)),
        }
    }

    fn rich_text_left_placeholder(&self, id: usize) -> PlaceholderToken {
        match self.placeholders {
            MockPlaceholders::Default => PlaceholderToken::with_pattern(
                format!("<style id='{}'>", id),
                format!(r#"<\s*style\s*id\s*=\s*['"]?\s*{}\s*['"]?\s*>"#, id),
            ),
            MockPlaceholders::Angle => PlaceholderToken::Bare(format!("<L{}>", id)),
        }
    }

    fn rich_text_right_placeholder(&self, id: usize) -> PlaceholderToken {
        match self.placeholders {
            MockPlaceholders::Default => PlaceholderToken::with_pattern("</style>", r"<\s*/\s*style\s*>"),
            MockPlaceholders::Angle => PlaceholderToken::Bare(format!("<R{}>", id)),
        }
    }
}
