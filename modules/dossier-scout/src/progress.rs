// Progress events for a running batch, delivered over a channel so the
// consumer decides which thread or task renders them.

use dossier_common::SourceId;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeStatus {
    /// Record came from the cache; the extractor was not called.
    Cached,
    Extracted,
    /// The extractor ran but found nothing.
    Empty,
    Failed,
    TimedOut,
    /// No known URL and no way to guess one.
    Skipped,
}

impl ScrapeStatus {
    pub fn produced_record(self) -> bool {
        matches!(self, ScrapeStatus::Cached | ScrapeStatus::Extracted)
    }
}

/// Exactly one per registered source per batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeEvent {
    pub run_id: Uuid,
    pub source_id: SourceId,
    pub url: Option<String>,
    pub status: ScrapeStatus,
    pub message: String,
}

/// Sending half handed to the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    tx: Option<mpsc::UnboundedSender<ScrapeEvent>>,
}

impl Progress {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ScrapeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Drops every event.
    pub fn silent() -> Self {
        Self { tx: None }
    }

    pub(crate) fn emit(&self, event: ScrapeEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        // A closed receiver means the caller stopped listening; the batch carries on.
        if tx.send(event).is_err() {
            debug!("Progress receiver dropped");
        }
    }
}
