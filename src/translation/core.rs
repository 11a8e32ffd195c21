/*!
 * Whole-document translation.
 *
 * Pages are walked in order and every paragraph is submitted to the
 * priority pool as its own task. Each task works on a copy of its
 * paragraph and sends it back with its tracker; the copy replaces the
 * original only once it has come back.
 */

use log::{debug, error, info};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::document::{Document, PageFontMaps, Paragraph};
use crate::errors::TranslationError;
use crate::file_utils::FileManager;
use crate::progress::{ProgressMonitor, SilentProgress, StageProgress};
use crate::translation::context::SharedContext;
use crate::translation::paragraph::ParagraphTranslator;
use crate::translation::scheduler::{PriorityWorkerPool, priority_for};
use crate::translation::tokens::{TokenCounter, default_token_counter};
use crate::translation::tracker::{DocumentTracker, PageTracker, ParagraphTracker};

/// Name of the progress stage driven by the document translator
pub const STAGE_NAME: &str = "Translate Paragraphs";

/// Diagnostic report written in debug mode
pub const TRACKING_FILE_NAME: &str = "translate_tracking.json";

/// Advances the stage when dropped, whatever the task's outcome.
struct AdvanceOnDrop(Arc<dyn StageProgress>);

impl Drop for AdvanceOnDrop {
    fn drop(&mut self) {
        self.0.advance(1);
    }
}

/// A paragraph handed back by its task.
struct FinishedParagraph {
    page_index: usize,
    paragraph_index: usize,
    paragraph: Paragraph,
    tracker: ParagraphTracker,
}

/// Translates every paragraph of a document through the priority pool.
pub struct DocumentTranslator {
    paragraph_translator: Arc<ParagraphTranslator>,
    token_counter: Arc<dyn TokenCounter>,
    context: Arc<SharedContext>,
    progress: Arc<dyn ProgressMonitor>,
    workers: usize,
    tracking_dir: Option<PathBuf>,
}

impl DocumentTranslator {
    pub fn new(paragraph_translator: ParagraphTranslator, workers: usize) -> Self {
        Self {
            paragraph_translator: Arc::new(paragraph_translator),
            token_counter: default_token_counter(),
            context: Arc::new(SharedContext::new()),
            progress: Arc::new(SilentProgress::new()),
            workers,
            tracking_dir: None,
        }
    }

    pub fn with_token_counter(mut self, counter: Arc<dyn TokenCounter>) -> Self {
        self.token_counter = counter;
        self
    }

    /// Share title context with other parts of the same document.
    pub fn with_shared_context(mut self, context: Arc<SharedContext>) -> Self {
        self.context = context;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressMonitor>) -> Self {
        self.progress = progress;
        self
    }

    /// Write the tracking report into `dir` after each run.
    pub fn with_tracking_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.tracking_dir = dir;
        self
    }

    pub fn shared_context(&self) -> &Arc<SharedContext> {
        &self.context
    }

    /// Translate `document` in place.
    ///
    /// Paragraph failures are logged and leave the paragraph untranslated,
    /// including a task that panics. On cancellation no further paragraph is
    /// started and `TranslationError::Cancelled` is returned once the
    /// paragraphs in flight are written back. The document is only written
    /// to after all tasks have ended, so dropping the returned future leaves
    /// it unchanged.
    pub async fn translate(&self, document: &mut Document) -> Result<DocumentTracker, TranslationError> {
        self.context.discover_first_title(document);

        let total = document.paragraph_count();
        let stage = self.progress.stage_start(STAGE_NAME, total as u64);
        let pool = PriorityWorkerPool::new(self.workers);
        let (sender, mut receiver) = mpsc::unbounded_channel::<FinishedParagraph>();
        let mut tracker = DocumentTracker::default();
        let mut submitted = 0usize;

        debug!("Translating {} paragraphs with {} workers", total, pool.worker_count());

        for (page_index, page) in document.pages.iter().enumerate() {
            if self.progress.raise_if_cancelled().is_err() {
                break;
            }
            tracker.pages.push(PageTracker {
                paragraphs: vec![ParagraphTracker::default(); page.paragraphs.len()],
            });

            let fonts = Arc::new(PageFontMaps::from_page(page));

            for (paragraph_index, original) in page.paragraphs.iter().enumerate() {
                let mut paragraph = original.clone();
                let token_count = self.token_counter.count_or_zero(&paragraph.unicode);
                // Updated here, not in the task, so the order follows submission
                self.context.observe(&paragraph);
                let titles = self.context.snapshot();

                let translator = Arc::clone(&self.paragraph_translator);
                let progress = Arc::clone(&self.progress);
                let stage = Arc::clone(&stage);
                let fonts = Arc::clone(&fonts);
                let sender = sender.clone();

                submitted += 1;
                pool.submit(priority_for(token_count), async move {
                    let mut paragraph_tracker = ParagraphTracker::default();
                    if progress.raise_if_cancelled().is_ok() {
                        let _advance = AdvanceOnDrop(stage);
                        translator
                            .translate_paragraph(&mut paragraph, &mut paragraph_tracker, &fonts, &titles, token_count)
                            .await;
                    }
                    let finished = FinishedParagraph {
                        page_index,
                        paragraph_index,
                        paragraph,
                        tracker: paragraph_tracker,
                    };
                    if sender.send(finished).is_err() {
                        error!("Paragraph {}/{} finished after the run ended", page_index, paragraph_index);
                    }
                });
            }
        }

        drop(sender);
        pool.join().await;
        stage.finish();

        let mut returned = 0usize;
        while let Some(finished) = receiver.recv().await {
            document.pages[finished.page_index].paragraphs[finished.paragraph_index] = finished.paragraph;
            tracker.pages[finished.page_index].paragraphs[finished.paragraph_index] = finished.tracker;
            returned += 1;
        }
        if returned < submitted {
            error!(
                "{} of {} paragraphs did not finish and were left untranslated",
                submitted - returned,
                submitted
            );
        }

        self.progress.raise_if_cancelled()?;
        self.write_tracking(&tracker);
        Ok(tracker)
    }

    fn write_tracking(&self, tracker: &DocumentTracker) {
        let Some(dir) = &self.tracking_dir else {
            return;
        };
        let path = dir.join(TRACKING_FILE_NAME);
        debug!("save translate tracking to {}", path.display());
        let result = tracker
            .to_json()
            .map_err(anyhow::Error::from)
            .and_then(|json| FileManager::write_to_file(&path, &json));
        match result {
            Ok(()) => info!("Translation tracking written to {}", path.display()),
            Err(e) => error!("Failed to write translation tracking to {}: {}", path.display(), e),
        }
    }
}
