//! Deterministic ranking of reference URLs.
//!
//! `rank` keeps at most one URL per domain in each bucket, puts reference
//! profiles before social networks, and sorts each bucket lexicographically so
//! the same input always produces the same list. Output URLs are already
//! normalized, so ranking a ranked list returns it unchanged.

use std::collections::HashSet;

use dossier_common::normalize::{is_web_url, name_tokens};

use crate::classify::{DomainClass, UrlCandidate};

/// Rank and cap `urls`. Callers feed higher-priority candidates first: within
/// a bucket the first URL seen for a domain wins.
pub fn rank<S: AsRef<str>>(urls: &[S], limit: usize, name_hint: &str) -> Vec<String> {
    let tokens = name_tokens(name_hint);
    let mut profile = Bucket::default();
    let mut social = Bucket::default();

    for raw in urls {
        let candidate = UrlCandidate::new(raw.as_ref());
        if !accepts(&candidate, &tokens) {
            continue;
        }
        match candidate.class {
            DomainClass::Social => social.offer(candidate),
            DomainClass::Profile | DomainClass::General => profile.offer(candidate),
        }
    }

    profile
        .into_sorted()
        .into_iter()
        .chain(social.into_sorted())
        .take(limit)
        .collect()
}

/// Filters applied before bucketing: a plain http(s) URL without credentials,
/// not an ad host, profile shaped, and for general domains mentioning the
/// entity name.
pub(crate) fn accepts(candidate: &UrlCandidate, name_tokens: &[String]) -> bool {
    if !is_web_url(&candidate.normalized) || candidate.is_ad() || !candidate.is_profile_shaped {
        return false;
    }
    match candidate.class {
        DomainClass::General => mentions_name(&candidate.normalized, name_tokens),
        DomainClass::Profile | DomainClass::Social => true,
    }
}

/// Partial textual match: any name token appears in the lowercased URL.
fn mentions_name(normalized: &str, name_tokens: &[String]) -> bool {
    let lowered = normalized.to_lowercase();
    name_tokens.iter().any(|token| lowered.contains(token.as_str()))
}

#[derive(Default)]
struct Bucket {
    domains: HashSet<String>,
    urls: Vec<String>,
}

impl Bucket {
    fn offer(&mut self, candidate: UrlCandidate) {
        if self.domains.insert(candidate.domain_key) {
            self.urls.push(candidate.normalized);
        }
    }

    fn into_sorted(mut self) -> Vec<String> {
        self.urls.sort();
        self.urls
    }
}
