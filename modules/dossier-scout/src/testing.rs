// Test mocks for the scrape orchestrator.
//
// MockExtractor (Extractor): HashMap-based URL→SourceRecord. Unregistered URLs
// extract to `Ok(None)`; `.failing()` URLs return `Err`. Records every URL it
// is asked for so tests can assert the cache kept it from being called.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use dossier_common::{FieldKey, FieldValue, SourceId, SourceRecord};

use crate::extractor::{guess_from_template, Extractor};

/// Builder pattern: `.on_record()`, `.failing()`, `.with_guess()`, `.with_delay()`.
pub struct MockExtractor {
    source_id: SourceId,
    records: HashMap<String, SourceRecord>,
    failing: HashSet<String>,
    guess_template: Option<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockExtractor {
    pub fn new(source_id: &str) -> Self {
        Self {
            source_id: SourceId::from(source_id),
            records: HashMap::new(),
            failing: HashSet::new(),
            guess_template: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on_record(mut self, url: &str, record: SourceRecord) -> Self {
        self.records.insert(url.to_string(), record);
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// URL template with a `{slug}` placeholder, slugged with '-'.
    pub fn with_guess(mut self, template: &str) -> Self {
        self.guess_template = Some(template.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    fn guess_url(&self, name_hint: &str) -> Option<String> {
        self.guess_template
            .as_deref()
            .and_then(|t| guess_from_template(t, name_hint, '-'))
    }

    async fn extract(&self, url: &str) -> Result<Option<SourceRecord>> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(url) {
            bail!(
                "MockExtractor({}): simulated failure for {url}",
                self.source_id
            );
        }
        Ok(self.records.get(url).cloned())
    }
}

/// A record with just a name, for tests that only care about provenance.
pub fn named_record(source_id: &str, url: &str, name: &str) -> SourceRecord {
    SourceRecord::new(source_id, url).with_field(FieldKey::Name, FieldValue::scalar(name))
}
