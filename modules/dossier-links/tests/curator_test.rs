use std::sync::Arc;
use std::time::Duration;

use dossier_links::testing::MockTransport;
use dossier_links::{LivenessChecker, Reachability, UrlCurator};

#[tokio::test]
async fn dead_links_are_dropped_and_filtered_links_never_probed() {
    let urls: Vec<String> = [
        "https://www.themoviedb.org/person/31-jane-doe",
        "https://www.wikidata.org/wiki/Q404",
        "https://www.imdb.com/name/nm0000001/",
        "https://ad.doubleclick.net/jane-doe",
        "https://www.tvmaze.com/people/55/jane-doe/episodes",
        "https://twitter.com/janedoe",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let primary = Arc::new(
        MockTransport::new("http")
            .on_status("https://www.themoviedb.org/person/31-jane-doe", 200)
            .on_status("https://www.wikidata.org/wiki/Q404", 404)
            .on_status("https://twitter.com/janedoe", 302),
    );
    let checker = LivenessChecker::new(primary.clone(), None, Duration::from_secs(1));
    let curator = UrlCurator::new(checker, 4);

    let curation = curator.curate(&urls, 10, "Jane Doe").await;

    assert_eq!(
        curation.ranked,
        vec![
            "https://www.imdb.com/name/nm0000001",
            "https://www.themoviedb.org/person/31-jane-doe",
            "https://twitter.com/janedoe",
        ]
    );
    assert_eq!(curation.candidates.len(), urls.len());
    assert_eq!(curation.candidates[1].reachability, Reachability::Dead);
    assert_eq!(curation.candidates[3].reachability, Reachability::Unknown);
    assert_eq!(curation.candidates[4].reachability, Reachability::Unknown);
    assert_eq!(curation.reachable().count(), 3);

    // wikidata HEAD + GET retry, tmdb, twitter; imdb is anti-bot and skipped
    assert_eq!(primary.call_count(), 4);
    assert!(primary
        .calls()
        .iter()
        .all(|(url, _)| !url.contains("doubleclick") && !url.contains("imdb")));
}

#[tokio::test]
async fn empty_input_is_an_empty_curation() {
    let checker = LivenessChecker::new(
        Arc::new(MockTransport::new("http")),
        None,
        Duration::from_secs(1),
    );
    let curation = UrlCurator::new(checker, 2).curate(&[], 10, "Jane Doe").await;
    assert!(curation.ranked.is_empty());
    assert!(curation.candidates.is_empty());
}
