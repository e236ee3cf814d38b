use std::collections::HashMap;
use std::sync::Arc;

use dossier_common::SourceRecord;
use tokio::sync::Mutex;

/// Extracted records keyed by the exact URL string they were fetched from.
/// No normalization, eviction or TTL: entries live until `clear()`.
#[derive(Debug, Default)]
pub struct ScrapeCache {
    entries: HashMap<String, SourceRecord>,
}

impl ScrapeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<&SourceRecord> {
        self.entries.get(url)
    }

    pub fn set(&mut self, url: impl Into<String>, record: SourceRecord) {
        self.entries.insert(url.into(), record);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One cache per application session. Whoever holds the lock owns the only
/// running batch; see `ScrapeOrchestrator::spawn_batch`.
pub type SharedCache = Arc<Mutex<ScrapeCache>>;

pub fn shared_cache() -> SharedCache {
    Arc::new(Mutex::new(ScrapeCache::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_exact_strings() {
        let mut cache = ScrapeCache::new();
        let url = "https://example.com/a";
        cache.set(url, SourceRecord::new("a", url));
        assert!(cache.get("https://example.com/a").is_some());
        assert!(cache.get("https://example.com/a/").is_none());
        assert!(cache.get("HTTPS://example.com/a").is_none());
    }

    #[test]
    fn clear_empties_everything() {
        let mut cache = ScrapeCache::new();
        cache.set("u1", SourceRecord::new("a", "u1"));
        cache.set("u2", SourceRecord::new("b", "u2"));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
