use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{Config, TranslationProvider};
use crate::document::{Document, KeywordFontResolver};
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::progress::{CancellationFlag, ConsoleProgress, ProgressMonitor};
use crate::providers::mock::MockTranslator;
use crate::providers::ollama::Ollama;
use crate::providers::{Translator, TranslatorBackend};
use crate::translation::core::DocumentTranslator;
use crate::translation::paragraph::{ParagraphOptions, ParagraphTranslator};
use crate::translation::tracker::DocumentTracker;

// @module: Application controller for document translation

/// Main application controller: loads a document, translates it and writes it back
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Signal shared with the running translation
    cancellation: CancellationFlag,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        if language_utils::language_codes_match(&config.source_language, &config.target_language) {
            warn!(
                "Source and target languages are both '{}', paragraphs will likely come back unchanged",
                config.target_language
            );
        }
        Ok(Self {
            config,
            cancellation: CancellationFlag::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Flag that stops the current run when cancelled
    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancellation
    }

    /// Where the translated document goes when no output path is given
    pub fn output_path_for(&self, input_file: &Path, output_file: Option<PathBuf>) -> PathBuf {
        output_file.unwrap_or_else(|| {
            let dir = input_file.parent().unwrap_or_else(|| Path::new(""));
            FileManager::generate_output_path(input_file, dir, &self.config.target_language)
        })
    }

    // @creates: Backend for the configured provider
    fn create_translator(&self, target_language_name: &str) -> Result<Arc<dyn Translator>> {
        let translation = &self.config.translation;
        let translator: Arc<dyn Translator> = match translation.provider {
            TranslationProvider::Ollama => Arc::new(Ollama::new_with_config(
                &translation.endpoint,
                translation.model.clone(),
                target_language_name,
                translation.temperature,
                translation.retry_count,
                translation.retry_backoff_ms,
                translation.timeout_secs,
            )?),
            TranslationProvider::Mock => Arc::new(MockTranslator::echo()),
        };
        Ok(translator)
    }

    /// Run the main workflow with terminal progress bars
    pub async fn run(&self, input_file: PathBuf, output_file: Option<PathBuf>) -> Result<PathBuf> {
        let target_language_name = language_utils::get_language_name(&self.config.target_language)?;
        let translator = self.create_translator(&target_language_name)?;
        let progress = Arc::new(ConsoleProgress::new(self.cancellation.clone()));
        self.run_with(input_file, output_file, translator, progress).await
    }

    /// Run the workflow against an explicit backend and progress monitor
    pub async fn run_with(
        &self,
        input_file: PathBuf,
        output_file: Option<PathBuf>,
        translator: Arc<dyn Translator>,
        progress: Arc<dyn ProgressMonitor>,
    ) -> Result<PathBuf> {
        let start_time = Instant::now();

        if !FileManager::file_exists(&input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let mut document = FileManager::read_document(&input_file)?;
        info!(
            "🚀 Paraglot: {} pages, {} paragraphs, {} -> {} with {}",
            document.pages.len(),
            document.paragraph_count(),
            self.config.source_language,
            self.config.target_language,
            self.config.translation.provider.display_name()
        );

        let tracker = self.translate_document(&mut document, translator, progress).await?;

        let output_path = self.output_path_for(&input_file, output_file);
        FileManager::write_document(&output_path, &document)?;

        info!(
            "Translated {} of {} paragraphs in {}.",
            Self::count_translated(&tracker),
            document.paragraph_count(),
            Self::format_duration(start_time.elapsed())
        );
        info!("Success: {}", output_path.display());
        Ok(output_path)
    }

    /// Translate a loaded document in place
    pub async fn translate_document(
        &self,
        document: &mut Document,
        translator: Arc<dyn Translator>,
        progress: Arc<dyn ProgressMonitor>,
    ) -> Result<DocumentTracker> {
        let target_language_name = language_utils::get_language_name(&self.config.target_language)?;
        let backend = TranslatorBackend::probe(translator)
            .await
            .context("Failed to reach the translation backend")?;
        if !backend.supports_llm() {
            info!("Backend only offers plain translation, styled runs will not be protected");
        }

        let options = ParagraphOptions::from_config(&self.config.translation, target_language_name);
        let paragraph_translator = ParagraphTranslator::new(backend, Arc::new(KeywordFontResolver), options);

        let tracking_dir = if self.config.debug {
            FileManager::ensure_dir(&self.config.working_dir)?;
            Some(self.config.working_dir.clone())
        } else {
            None
        };

        let workers = self.config.translation.worker_count();
        debug!("Using {} workers for a budget of {} qps", workers, self.config.translation.qps);

        let translator = DocumentTranslator::new(paragraph_translator, workers)
            .with_progress(progress)
            .with_tracking_dir(tracking_dir);

        let tracker = translator.translate(document).await?;
        Ok(tracker)
    }

    fn count_translated(tracker: &DocumentTracker) -> usize {
        tracker
            .pages
            .iter()
            .flat_map(|page| page.paragraphs.iter())
            .filter(|paragraph| paragraph.output.is_some())
            .count()
    }

    // @formats: Duration for the final summary
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
