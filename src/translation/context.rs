/*!
 * Cross-document title context.
 *
 * Holds snapshots of the document's first title and of the most recent
 * title submitted for translation. Only the submitting side writes; worker
 * tasks receive the snapshots current at submission time.
 */

use log::info;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::document::{Document, Paragraph};

/// Title snapshots shared by every paragraph task of a run.
#[derive(Debug, Default)]
pub struct SharedContext {
    first_title: RwLock<Option<Arc<Paragraph>>>,
    recent_title: RwLock<Option<Arc<Paragraph>>>,
}

impl SharedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_title(&self) -> Option<Arc<Paragraph>> {
        self.first_title.read().clone()
    }

    pub fn recent_title(&self) -> Option<Arc<Paragraph>> {
        self.recent_title.read().clone()
    }

    /// Seed both slots from the document unless a first title is already known.
    pub fn discover_first_title(&self, document: &Document) {
        if self.first_title.read().is_some() {
            return;
        }
        let title = document.find_title_paragraph().cloned().map(Arc::new);
        if let Some(title) = &title {
            info!("Found first title paragraph: {}", title.unicode);
        }
        *self.first_title.write() = title.clone();
        *self.recent_title.write() = title;
    }

    /// Record `paragraph` as the most recent title if it is one.
    pub fn observe(&self, paragraph: &Paragraph) {
        if paragraph.is_title() {
            *self.recent_title.write() = Some(Arc::new(paragraph.clone()));
        }
    }

    /// Both snapshots, as handed to a task.
    pub fn snapshot(&self) -> TitleSnapshot {
        TitleSnapshot {
            first: self.first_title(),
            recent: self.recent_title(),
        }
    }
}

/// Titles captured when a paragraph was submitted.
#[derive(Debug, Clone, Default)]
pub struct TitleSnapshot {
    pub first: Option<Arc<Paragraph>>,
    pub recent: Option<Arc<Paragraph>>,
}
