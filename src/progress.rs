/*!
 * Progress reporting and cooperative cancellation.
 *
 * A `ProgressMonitor` hands out one `StageProgress` per processing stage and
 * owns the run's cancellation flag. The console monitor draws indicatif
 * bars; the silent one only counts, which is what tests and library users
 * without a terminal want.
 */

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::errors::TranslationError;

/// Progress of one named stage.
pub trait StageProgress: Send + Sync {
    /// Mark `n` more units of work as done
    fn advance(&self, n: u64);

    fn finish(&self);
}

/// Source of stage progress reporters and of the cancellation signal.
pub trait ProgressMonitor: Send + Sync {
    fn stage_start(&self, name: &str, total: u64) -> Arc<dyn StageProgress>;

    fn cancellation(&self) -> &CancellationFlag;

    fn raise_if_cancelled(&self) -> Result<(), TranslationError> {
        self.cancellation().check()
    }
}

/// Shared cancellation flag; clones observe the same signal.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), TranslationError> {
        if self.is_cancelled() {
            Err(TranslationError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Terminal progress bars.
#[derive(Debug)]
pub struct ConsoleProgress {
    multi_progress: MultiProgress,
    cancellation: CancellationFlag,
}

impl ConsoleProgress {
    pub fn new(cancellation: CancellationFlag) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            cancellation,
        }
    }
}

struct ConsoleStage(ProgressBar);

impl StageProgress for ConsoleStage {
    fn advance(&self, n: u64) {
        self.0.inc(n);
    }

    fn finish(&self) {
        self.0.finish_with_message("done");
    }
}

impl ProgressMonitor for ConsoleProgress {
    fn stage_start(&self, name: &str, total: u64) -> Arc<dyn StageProgress> {
        let progress_bar = self.multi_progress.add(ProgressBar::new(total));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message(name.to_string());
        Arc::new(ConsoleStage(progress_bar))
    }

    fn cancellation(&self) -> &CancellationFlag {
        &self.cancellation
    }
}

/// Monitor that draws nothing and counts advances.
#[derive(Debug, Default)]
pub struct SilentProgress {
    advanced: Arc<AtomicU64>,
    cancellation: CancellationFlag,
}

impl SilentProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(cancellation: CancellationFlag) -> Self {
        Self {
            advanced: Arc::default(),
            cancellation,
        }
    }

    /// Units advanced across all stages so far.
    pub fn advanced(&self) -> u64 {
        self.advanced.load(Ordering::SeqCst)
    }
}

struct CountingStage(Arc<AtomicU64>);

impl StageProgress for CountingStage {
    fn advance(&self, n: u64) {
        self.0.fetch_add(n, Ordering::SeqCst);
    }

    fn finish(&self) {}
}

impl ProgressMonitor for SilentProgress {
    fn stage_start(&self, _name: &str, _total: u64) -> Arc<dyn StageProgress> {
        Arc::new(CountingStage(Arc::clone(&self.advanced)))
    }

    fn cancellation(&self) -> &CancellationFlag {
        &self.cancellation
    }
}
