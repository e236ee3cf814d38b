use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use dossier_common::SourceId;
use dossier_scout::testing::{named_record, MockExtractor};
use dossier_scout::{
    shared_cache, Extractor, Progress, ScoutError, ScrapeCache, ScrapeEvent, ScrapeOrchestrator,
    ScrapeStatus,
};
use tokio::sync::mpsc::UnboundedReceiver;

const TIMEOUT: Duration = Duration::from_secs(2);

fn known(pairs: &[(&str, &str)]) -> BTreeMap<SourceId, String> {
    pairs
        .iter()
        .map(|(id, url)| (SourceId::from(*id), url.to_string()))
        .collect()
}

fn drain(rx: &mut UnboundedReceiver<ScrapeEvent>) -> Vec<ScrapeEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// A mock serving a record named `name` at `https://<id>/jane`.
fn serving(id: &str, name: &str) -> MockExtractor {
    let url = format!("https://{id}/jane");
    MockExtractor::new(id).on_record(&url, named_record(id, &url, name))
}

fn four_sources() -> Vec<Arc<MockExtractor>> {
    vec![
        Arc::new(serving("s1", "Jane Doe")),
        Arc::new(MockExtractor::new("s2").failing("https://s2/jane")),
        Arc::new(serving("s3", "Jane Doe")),
        Arc::new(serving("s4", "jane doe")),
    ]
}

fn orchestrator(mocks: &[Arc<MockExtractor>], timeout: Duration) -> ScrapeOrchestrator {
    let extractors: Vec<Arc<dyn Extractor>> = mocks
        .iter()
        .map(|m| m.clone() as Arc<dyn Extractor>)
        .collect();
    ScrapeOrchestrator::new(extractors, timeout)
}

fn four_known_urls() -> BTreeMap<SourceId, String> {
    known(&[
        ("s1", "https://s1/jane"),
        ("s2", "https://s2/jane"),
        ("s3", "https://s3/jane"),
        ("s4", "https://s4/jane"),
    ])
}

#[tokio::test]
async fn one_failing_source_does_not_abort_the_batch() {
    let mocks = four_sources();
    let orchestrator = orchestrator(&mocks, TIMEOUT);
    let (progress, mut rx) = Progress::channel();
    let mut cache = ScrapeCache::new();

    let records = orchestrator
        .scrape_all("Jane Doe", &four_known_urls(), &mut cache, &progress)
        .await;

    let sources: Vec<&str> = records.iter().map(|r| r.source_id().as_str()).collect();
    assert_eq!(sources, vec!["s1", "s3", "s4"]);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 4);
    let statuses: Vec<ScrapeStatus> = events.iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![
            ScrapeStatus::Extracted,
            ScrapeStatus::Failed,
            ScrapeStatus::Extracted,
            ScrapeStatus::Extracted,
        ]
    );
    assert_eq!(cache.len(), 3);
}

#[tokio::test]
async fn cache_hit_skips_the_extractor() {
    let mocks = four_sources();
    let orchestrator = orchestrator(&mocks, TIMEOUT);
    let mut cache = ScrapeCache::new();
    let cached = named_record("s1", "https://s1/jane", "Jane Cached");
    cache.set("https://s1/jane", cached.clone());

    let records = orchestrator
        .scrape_all(
            "Jane Doe",
            &four_known_urls(),
            &mut cache,
            &Progress::silent(),
        )
        .await;

    assert_eq!(mocks[0].call_count(), 0);
    assert_eq!(records[0], cached);
    assert_eq!(cache.get("https://s1/jane"), Some(&cached));
}

#[tokio::test]
async fn second_pass_is_served_from_cache() {
    let mocks = four_sources();
    let orchestrator = orchestrator(&mocks, TIMEOUT);
    let mut cache = ScrapeCache::new();
    let urls = four_known_urls();

    let first = orchestrator
        .scrape_all("Jane Doe", &urls, &mut cache, &Progress::silent())
        .await;
    let second = orchestrator
        .scrape_all("Jane Doe", &urls, &mut cache, &Progress::silent())
        .await;

    assert_eq!(first, second);
    assert_eq!(mocks[0].call_count(), 1);
    // failures are not cached, so the failing source is tried again
    assert_eq!(mocks[1].call_count(), 2);
}

#[tokio::test]
async fn guess_url_used_when_nothing_is_known() {
    let guessed = "https://guess.example/people/jane-doe";
    let mocks = vec![
        Arc::new(
            MockExtractor::new("guess")
                .with_guess("https://guess.example/people/{slug}")
                .on_record(guessed, named_record("guess", guessed, "Jane Doe")),
        ),
        Arc::new(MockExtractor::new("noguess")),
    ];
    let orchestrator = orchestrator(&mocks, TIMEOUT);
    let (progress, mut rx) = Progress::channel();

    let records = orchestrator
        .scrape_all(
            "Jane Doe",
            &BTreeMap::new(),
            &mut ScrapeCache::new(),
            &progress,
        )
        .await;

    assert_eq!(records.len(), 1);
    assert_eq!(mocks[0].calls(), vec![guessed.to_string()]);
    let events = drain(&mut rx);
    assert_eq!(events[1].status, ScrapeStatus::Skipped);
    assert!(events[1].url.is_none());
}

#[tokio::test]
async fn empty_and_slow_sources_are_failures_not_errors() {
    let mocks = vec![
        Arc::new(MockExtractor::new("empty")),
        Arc::new(serving("slow", "Jane").with_delay(Duration::from_secs(5))),
    ];
    let orchestrator = orchestrator(&mocks, Duration::from_millis(50));
    let (progress, mut rx) = Progress::channel();

    let records = orchestrator
        .scrape_all(
            "Jane Doe",
            &known(&[
                ("empty", "https://empty/jane"),
                ("slow", "https://slow/jane"),
            ]),
            &mut ScrapeCache::new(),
            &progress,
        )
        .await;

    assert!(records.is_empty());
    let statuses: Vec<ScrapeStatus> = drain(&mut rx).iter().map(|e| e.status).collect();
    assert_eq!(statuses, vec![ScrapeStatus::Empty, ScrapeStatus::TimedOut]);
}

#[tokio::test]
async fn background_batch_reports_summary_and_events() {
    let mocks = four_sources();
    let orchestrator = Arc::new(orchestrator(&mocks, TIMEOUT));
    let cache = shared_cache();

    let mut handle = orchestrator
        .spawn_batch(&cache, "Jane Doe", four_known_urls())
        .unwrap();
    let run_id = handle.run_id;

    let mut events = Vec::new();
    while let Some(event) = handle.events.recv().await {
        events.push(event);
    }
    let outcome = handle.wait().await.unwrap();

    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|e| e.run_id == run_id));
    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.summary.run_id, run_id);
    assert_eq!(outcome.summary.attempted, 4);
    assert_eq!(outcome.summary.succeeded, 3);
    assert_eq!(outcome.summary.failed, 1);
    assert_eq!(cache.lock().await.len(), 3);
}

#[tokio::test]
async fn concurrent_batch_is_rejected() {
    let slow = vec![Arc::new(
        serving("slow", "Jane").with_delay(Duration::from_millis(200)),
    )];
    let orchestrator = Arc::new(orchestrator(&slow, TIMEOUT));
    let cache = shared_cache();
    let urls = known(&[("slow", "https://slow/jane")]);

    let first = orchestrator
        .spawn_batch(&cache, "Jane Doe", urls.clone())
        .unwrap();
    let second = orchestrator.spawn_batch(&cache, "Jane Doe", urls.clone());
    assert!(matches!(second, Err(ScoutError::BatchInProgress)));

    first.wait().await.unwrap();
    let third = orchestrator.spawn_batch(&cache, "Jane Doe", urls).unwrap();
    let outcome = third.wait().await.unwrap();
    assert_eq!(outcome.summary.cached, 1);
}
