// Curation pipeline: harvest candidates, classify, probe liveness with bounded
// concurrency, drop what is dead, rank what is left.

use std::collections::HashSet;
use std::time::Instant;

use dossier_common::normalize::{is_blank, name_tokens, sanitize_url};
use dossier_common::{Config, FieldKey, SourceId, SourceRecord};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::info;

use crate::classify::{Reachability, UrlCandidate};
use crate::error::Result;
use crate::liveness::LivenessChecker;
use crate::ranker::{accepts, rank};

/// Ranked URLs plus the per-URL diagnostics behind them.
#[derive(Debug, Clone, Serialize)]
pub struct Curation {
    pub ranked: Vec<String>,
    pub candidates: Vec<UrlCandidate>,
}

impl Curation {
    pub fn reachable(&self) -> impl Iterator<Item = &UrlCandidate> {
        self.candidates
            .iter()
            .filter(|c| c.reachability == Reachability::Reachable)
    }
}

pub struct UrlCurator {
    checker: LivenessChecker,
    concurrency: usize,
}

impl UrlCurator {
    pub fn new(checker: LivenessChecker, concurrency: usize) -> Self {
        Self {
            checker,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            LivenessChecker::from_config(config)?,
            config.liveness_concurrency,
        ))
    }

    /// Every URL worth considering, in priority order: `known_urls` first,
    /// then for each record (ordered by `priority`, unlisted sources after in
    /// record order) its own page followed by its `urls` map. Tracking
    /// parameters are removed and exact duplicates dropped.
    pub fn collect_candidates(
        known_urls: &[String],
        records: &[SourceRecord],
        priority: &[SourceId],
    ) -> Vec<String> {
        let mut ordered: Vec<&SourceRecord> = priority
            .iter()
            .flat_map(|id| records.iter().filter(move |r| r.source_id() == id))
            .collect();
        ordered.extend(records.iter().filter(|r| !priority.contains(r.source_id())));

        let harvested = ordered.into_iter().flat_map(|record| {
            let linked = record
                .get(FieldKey::Urls)
                .map(|v| v.as_url_map().into_values().collect::<Vec<_>>())
                .unwrap_or_default();
            std::iter::once(record.source_url().to_string()).chain(linked)
        });

        let mut seen = HashSet::new();
        known_urls
            .iter()
            .cloned()
            .chain(harvested)
            .filter(|url| !is_blank(url))
            .map(|url| sanitize_url(&url))
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }

    /// Classify, probe and rank. Candidates that fail the ranking filters are
    /// never probed and stay `Unknown`; only `Reachable` ones are ranked.
    pub async fn curate(&self, urls: &[String], limit: usize, name_hint: &str) -> Curation {
        let started = Instant::now();
        let tokens = name_tokens(name_hint);
        let mut candidates: Vec<UrlCandidate> = urls.iter().map(|u| UrlCandidate::new(u)).collect();

        let probes: Vec<(usize, String, String)> = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| accepts(c, &tokens))
            .map(|(i, c)| (i, c.normalized.clone(), c.domain_key.clone()))
            .collect();
        let probed = probes.len();

        let checks = probes.into_iter().map(|(i, url, key)| async move {
            (i, self.checker.check(&url, &key).await)
        });
        let results: Vec<(usize, Reachability)> = stream::iter(checks)
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (i, reachability) in results {
            candidates[i].reachability = reachability;
        }

        let live: Vec<&str> = candidates
            .iter()
            .filter(|c| c.reachability == Reachability::Reachable)
            .map(|c| c.normalized.as_str())
            .collect();
        let ranked = rank(&live, limit, name_hint);

        info!(
            input = urls.len(),
            probed,
            reachable = live.len(),
            ranked = ranked.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Curated reference URLs"
        );

        Curation { ranked, candidates }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_common::FieldValue;

    #[test]
    fn candidates_follow_priority_and_dedupe() {
        let records = vec![
            SourceRecord::new("b", "https://b.example/jane").with_field(
                FieldKey::Urls,
                FieldValue::UrlMap(
                    [(
                        "imdb".to_string(),
                        "https://www.imdb.com/name/nm1/".to_string(),
                    )]
                    .into(),
                ),
            ),
            SourceRecord::new("a", "https://a.example/jane?utm_source=feed"),
        ];
        let known = vec!["https://www.imdb.com/name/nm1/".to_string()];
        let urls = UrlCurator::collect_candidates(&known, &records, &[SourceId::from("a")]);
        assert_eq!(
            urls,
            vec![
                "https://www.imdb.com/name/nm1/",
                "https://a.example/jane",
                "https://b.example/jane",
            ]
        );
    }
}
