//! Sequential scrape of every registered source for one entity.
//!
//! Sources are tried in registration order, one at a time. Each one either
//! yields a `SourceRecord` (fresh or from the cache) or is logged and skipped;
//! a failing source never aborts the batch. Exactly one `ScrapeEvent` is
//! emitted per registered source.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dossier_common::{Config, SourceId, SourceRecord};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::{ScrapeCache, SharedCache};
use crate::error::{Result, ScoutError};
use crate::extractor::Extractor;
use crate::progress::{Progress, ScrapeEvent, ScrapeStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub run_id: Uuid,
    pub attempted: u32,
    pub succeeded: u32,
    pub cached: u32,
    pub failed: u32,
    pub skipped: u32,
    pub elapsed_ms: u64,
}

impl BatchSummary {
    fn record(&mut self, status: ScrapeStatus) {
        self.attempted += 1;
        match status {
            ScrapeStatus::Extracted => self.succeeded += 1,
            ScrapeStatus::Cached => self.cached += 1,
            ScrapeStatus::Empty | ScrapeStatus::Failed | ScrapeStatus::TimedOut => self.failed += 1,
            ScrapeStatus::Skipped => self.skipped += 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub records: Vec<SourceRecord>,
    pub summary: BatchSummary,
}

/// A batch running on a background task.
pub struct BatchHandle {
    pub run_id: Uuid,
    pub events: mpsc::UnboundedReceiver<ScrapeEvent>,
    pub result: JoinHandle<BatchOutcome>,
}

impl BatchHandle {
    /// Wait for the batch, discarding any events not yet read.
    pub async fn wait(self) -> Result<BatchOutcome> {
        self.result
            .await
            .map_err(|e| ScoutError::Task(e.to_string()))
    }
}

pub struct ScrapeOrchestrator {
    extractors: Vec<Arc<dyn Extractor>>,
    timeout: Duration,
}

impl ScrapeOrchestrator {
    /// `extractors` order is the order sources are tried in.
    pub fn new(extractors: Vec<Arc<dyn Extractor>>, timeout: Duration) -> Self {
        info!(
            sources = extractors.len(),
            timeout_secs = timeout.as_secs(),
            "ScrapeOrchestrator initialized"
        );
        Self {
            extractors,
            timeout,
        }
    }

    pub fn from_config(extractors: Vec<Arc<dyn Extractor>>, config: &Config) -> Self {
        Self::new(extractors, config.extract_timeout)
    }

    pub fn sources(&self) -> Vec<SourceId> {
        self.extractors
            .iter()
            .map(|e| e.source_id().clone())
            .collect()
    }

    /// Run one batch in the caller's task. An empty result means nothing was found.
    pub async fn scrape_all(
        &self,
        name_hint: &str,
        known_urls: &BTreeMap<SourceId, String>,
        cache: &mut ScrapeCache,
        progress: &Progress,
    ) -> Vec<SourceRecord> {
        self.run(Uuid::new_v4(), name_hint, known_urls, cache, progress)
            .await
            .records
    }

    /// Run one batch on a background task, holding the shared cache for the
    /// whole batch. Fails with `BatchInProgress` if another batch holds it.
    pub fn spawn_batch(
        self: &Arc<Self>,
        cache: &SharedCache,
        name_hint: impl Into<String>,
        known_urls: BTreeMap<SourceId, String>,
    ) -> Result<BatchHandle> {
        let mut guard = Arc::clone(cache)
            .try_lock_owned()
            .map_err(|_| ScoutError::BatchInProgress)?;

        let run_id = Uuid::new_v4();
        let (progress, events) = Progress::channel();
        let name_hint = name_hint.into();
        let this = Arc::clone(self);

        let result = tokio::spawn(async move {
            this.run(run_id, &name_hint, &known_urls, &mut guard, &progress)
                .await
        });

        Ok(BatchHandle {
            run_id,
            events,
            result,
        })
    }

    async fn run(
        &self,
        run_id: Uuid,
        name_hint: &str,
        known_urls: &BTreeMap<SourceId, String>,
        cache: &mut ScrapeCache,
        progress: &Progress,
    ) -> BatchOutcome {
        let started = Instant::now();
        let mut records = Vec::new();
        let mut summary = BatchSummary {
            run_id,
            ..Default::default()
        };

        info!(%run_id, name = name_hint, sources = self.extractors.len(), "Scrape batch started");

        for extractor in &self.extractors {
            let source = extractor.source_id().clone();
            let url = known_urls
                .get(&source)
                .cloned()
                .or_else(|| extractor.guess_url(name_hint));

            let (status, message) = match &url {
                None => (
                    ScrapeStatus::Skipped,
                    "no known or guessable URL".to_string(),
                ),
                Some(url) => match cache.get(url) {
                    Some(record) => {
                        records.push(record.clone());
                        (ScrapeStatus::Cached, "from cache".to_string())
                    }
                    None => {
                        let (status, message, record) =
                            self.extract_one(extractor.as_ref(), url).await;
                        if let Some(record) = record {
                            cache.set(url.clone(), record.clone());
                            records.push(record);
                        }
                        (status, message)
                    }
                },
            };

            summary.record(status);
            progress.emit(ScrapeEvent {
                run_id,
                source_id: source,
                url,
                status,
                message,
            });
        }

        summary.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            %run_id,
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            cached = summary.cached,
            failed = summary.failed,
            skipped = summary.skipped,
            elapsed_ms = summary.elapsed_ms,
            "Scrape batch finished"
        );

        BatchOutcome { records, summary }
    }

    async fn extract_one(
        &self,
        extractor: &dyn Extractor,
        url: &str,
    ) -> (ScrapeStatus, String, Option<SourceRecord>) {
        let source = extractor.source_id();
        let started = Instant::now();

        match tokio::time::timeout(self.timeout, extractor.extract(url)).await {
            Ok(Ok(Some(record))) if !record.is_empty() => {
                info!(
                    source = %source,
                    url,
                    fields = record.fields().len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Extracted record"
                );
                let message = format!("{} fields", record.fields().len());
                (ScrapeStatus::Extracted, message, Some(record))
            }
            Ok(Ok(_)) => {
                info!(source = %source, url, "Extractor found nothing");
                (ScrapeStatus::Empty, "nothing found".to_string(), None)
            }
            Ok(Err(e)) => {
                warn!(source = %source, url, error = %e, "Extractor failed, continuing");
                (ScrapeStatus::Failed, e.to_string(), None)
            }
            Err(_) => {
                warn!(
                    source = %source,
                    url,
                    timeout_secs = self.timeout.as_secs(),
                    "Extractor timed out, continuing"
                );
                (
                    ScrapeStatus::TimedOut,
                    format!("timed out after {:?}", self.timeout),
                    None,
                )
            }
        }
    }
}
