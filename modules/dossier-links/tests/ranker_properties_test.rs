//! Ranking invariants over mixed inputs: fixed point under re-ranking and a
//! one-URL-per-domain cap within each bucket.

use std::collections::HashSet;

use dossier_links::{classify, domain_class, rank, DomainClass};

const NAME: &str = "Jane Doe";

fn mixed_inputs() -> Vec<Vec<&'static str>> {
    vec![
        vec![
            "https://www.imdb.com/name/nm0000001/?ref_=nv_sr_1",
            "https://m.imdb.com/name/nm0000009",
            "https://www.imdb.com/title/tt0111161/",
            "https://en.wikipedia.org/wiki/Jane_Doe#Career",
            "https://de.wikipedia.org/wiki/Jane_Doe",
            "https://twitter.com/janedoe",
            "https://x.com/janedoe_real",
            "https://www.instagram.com/janedoe/",
            "https://janedoe.com/",
            "https://pagead2.googlesyndication.com/jane",
            "https://www.tvmaze.com/people/55/jane-doe/gallery",
            "https://unrelated.org/news/17",
        ],
        vec![
            "https://www.wikidata.org/wiki/Q42",
            "https://linktr.ee/janedoe",
            "https://www.discogs.com/artist/12345-Jane-Doe",
            "https://www.themoviedb.org/person/31-jane-doe",
            "https://bsky.app/profile/janedoe.bsky.social",
            "https://www.youtube.com/@janedoe",
            "https://www.facebook.com/janedoe",
        ],
        vec![],
    ]
}

#[test]
fn ranking_is_a_fixed_point() {
    for urls in mixed_inputs() {
        for limit in [0, 1, 3, 5, 50] {
            let once = rank(&urls, limit, NAME);
            let twice = rank(&once, limit, NAME);
            assert_eq!(once, twice, "limit {limit}");
        }
    }
}

#[test]
fn never_two_urls_for_one_domain_in_a_bucket() {
    for urls in mixed_inputs() {
        let ranked = rank(&urls, 50, NAME);
        let mut seen = HashSet::new();
        for url in &ranked {
            let key = classify(url);
            let social = domain_class(&key) == DomainClass::Social;
            assert!(seen.insert((social, key)), "duplicate domain for {url}");
        }
    }
}

#[test]
fn output_respects_limit_and_bucket_order() {
    let inputs = mixed_inputs();
    let urls = &inputs[0];
    let ranked = rank(urls, 50, NAME);

    assert_eq!(
        ranked,
        vec![
            "https://en.wikipedia.org/wiki/Jane_Doe",
            "https://janedoe.com",
            "https://www.imdb.com/name/nm0000001",
            "https://twitter.com/janedoe",
            "https://www.instagram.com/janedoe",
        ]
    );
    assert_eq!(rank(urls, 2, NAME).len(), 2);
}
