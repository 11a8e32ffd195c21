/*!
 * Token estimates used for scheduling and rate-limit hints.
 *
 * The default counter encodes with the gpt-4o BPE (`o200k_base`). When the
 * encoder cannot be built, the regex heuristic takes over.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tiktoken_rs::CoreBPE;

use crate::errors::TranslationError;

/// Estimates how many model tokens a text costs.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> Result<usize, TranslationError>;

    /// Count, degrading to zero when the counter fails.
    fn count_or_zero(&self, text: &str) -> usize {
        self.count(text).unwrap_or(0)
    }
}

/// Words, CJK ideographs and punctuation, counted separately
static TOKEN_PIECES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Han}\p{Hiragana}\p{Katakana}\p{Hangul}]|[\p{L}\p{N}]+|[^\s\p{L}\p{N}]").unwrap()
});

/// Tokenizer-free estimate.
///
/// Long words are charged one token per four characters, CJK characters and
/// punctuation one token each. Close enough to BPE counts to order work.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenCounter;

impl TokenCounter for HeuristicTokenCounter {
    fn count(&self, text: &str) -> Result<usize, TranslationError> {
        Ok(TOKEN_PIECES
            .find_iter(text)
            .map(|piece| piece.as_str().chars().count().div_ceil(4))
            .sum())
    }
}

/// Encoder shared by every counter; building it parses the whole vocabulary
static GPT_4O_BPE: Lazy<Result<Arc<CoreBPE>, String>> =
    Lazy::new(|| tiktoken_rs::o200k_base().map(Arc::new).map_err(|e| e.to_string()));

/// Exact BPE counts with the gpt-4o encoding.
#[derive(Clone)]
pub struct TiktokenCounter {
    bpe: Arc<CoreBPE>,
}

impl TiktokenCounter {
    pub fn gpt_4o() -> Result<Self, TranslationError> {
        match &*GPT_4O_BPE {
            Ok(bpe) => Ok(Self { bpe: Arc::clone(bpe) }),
            Err(e) => Err(TranslationError::Tokenizer(e.clone())),
        }
    }
}

impl std::fmt::Debug for TiktokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TiktokenCounter(o200k_base)")
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> Result<usize, TranslationError> {
        Ok(self.bpe.encode_with_special_tokens(text).len())
    }
}

/// The gpt-4o counter, or the heuristic one if the encoder is unavailable.
pub fn default_token_counter() -> Arc<dyn TokenCounter> {
    match TiktokenCounter::gpt_4o() {
        Ok(counter) => Arc::new(counter),
        Err(e) => {
            warn!("{}, falling back to estimated token counts", e);
            Arc::new(HeuristicTokenCounter)
        }
    }
}
