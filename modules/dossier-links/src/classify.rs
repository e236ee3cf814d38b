// URL classification: which source a URL belongs to and whether its path is
// that source's entity page rather than some other page on the same host.

use dossier_common::normalize::{bare_host, host_of, parse_lenient, strip_query_and_fragment};
use serde::Serialize;

use crate::registry::{self, ProfileRule, AD_HOST_MARKERS};

/// Which ranking bucket a domain falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainClass {
    /// A known reference source with a profile rule.
    Profile,
    /// A social network.
    Social,
    /// Anything else. Kept only when it mentions the entity's name.
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reachability {
    Unknown,
    Reachable,
    Dead,
    Error,
}

/// One URL as it moves through the curation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlCandidate {
    pub raw: String,
    pub normalized: String,
    pub domain_key: String,
    pub class: DomainClass,
    pub is_profile_shaped: bool,
    pub reachability: Reachability,
}

impl UrlCandidate {
    pub fn new(raw: &str) -> Self {
        let normalized = strip_query_and_fragment(raw);
        let domain_key = classify(&normalized);
        Self {
            raw: raw.to_string(),
            is_profile_shaped: is_profile_shaped(&normalized, &domain_key),
            class: domain_class(&domain_key),
            normalized,
            domain_key,
            reachability: Reachability::Unknown,
        }
    }

    pub fn is_ad(&self) -> bool {
        is_ad_host(&self.normalized)
    }
}

/// Canonical domain key for a URL: the registry key for known and social
/// domains, otherwise the host without `www.`.
pub fn classify(url: &str) -> String {
    let Some(host) = host_of(url) else {
        return url.trim().to_lowercase();
    };
    let host = bare_host(&host);

    if let Some(rule) = registry::rule_for_host(host) {
        return rule.key.to_string();
    }
    if let Some(social) = registry::social_for_host(host) {
        return social.key.to_string();
    }
    host.to_string()
}

pub fn domain_class(domain_key: &str) -> DomainClass {
    if registry::is_social_key(domain_key) {
        DomainClass::Social
    } else if registry::rule_for_key(domain_key).is_some() {
        DomainClass::Profile
    } else {
        DomainClass::General
    }
}

/// Whether the URL's path is shaped like an entity page for `domain_key`.
/// Social and general domains always pass; general domains are filtered on the
/// entity name instead, by the ranker.
pub fn is_profile_shaped(url: &str, domain_key: &str) -> bool {
    if registry::is_social_key(domain_key) {
        return true;
    }
    let Some(domain) = registry::rule_for_key(domain_key) else {
        return true;
    };
    let Some(parsed) = parse_lenient(url) else {
        return false;
    };

    match domain.rule {
        ProfileRule::AnyPath => true,
        ProfileRule::Structured {
            required_segment,
            id_pattern,
            forbidden_tokens,
        } => {
            let path = parsed.path();
            let lowered = path.to_lowercase();
            let segments: Vec<&str> = lowered.split('/').filter(|s| !s.is_empty()).collect();

            if let Some(required) = required_segment {
                if !segments.contains(&required) {
                    return false;
                }
            }
            if let Some(pattern) = id_pattern {
                if !pattern.is_match(path) {
                    return false;
                }
            }
            !segments
                .iter()
                .any(|segment| forbidden_tokens.iter().any(|t| token_matches(segment, t)))
        }
    }
}

fn token_matches(segment: &str, token: &str) -> bool {
    if token.ends_with(':') {
        segment.starts_with(token)
    } else {
        segment == token
    }
}

pub fn is_ad_host(url: &str) -> bool {
    host_of(url).is_some_and(|host| AD_HOST_MARKERS.iter().any(|m| host.contains(m)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_strips_www_and_uses_registry_keys() {
        assert_eq!(classify("https://www.imdb.com/name/nm0000001/"), "imdb");
        assert_eq!(
            classify("https://en.wikipedia.org/wiki/Jane_Doe"),
            "wikipedia"
        );
        assert_eq!(classify("https://x.com/janedoe"), "twitter");
        assert_eq!(classify("https://www.JaneDoe.com/about"), "janedoe.com");
    }

    #[test]
    fn imdb_requires_name_or_title_id() {
        assert!(is_profile_shaped("https://www.imdb.com/name/nm0000001", "imdb"));
        assert!(is_profile_shaped("https://www.imdb.com/title/tt0111161/", "imdb"));
        assert!(!is_profile_shaped("https://www.imdb.com/name/nm0000001/mediaviewer", "imdb"));
        assert!(!is_profile_shaped("https://www.imdb.com/chart/top", "imdb"));
    }

    #[test]
    fn wikipedia_rejects_namespace_pages() {
        assert!(is_profile_shaped("https://en.wikipedia.org/wiki/Jane_Doe", "wikipedia"));
        assert!(!is_profile_shaped(
            "https://en.wikipedia.org/wiki/Category:Actresses",
            "wikipedia"
        ));
        assert!(!is_profile_shaped("https://en.wikipedia.org/w/index.php", "wikipedia"));
    }

    #[test]
    fn tvmaze_rejects_gallery_pages() {
        assert!(is_profile_shaped("https://www.tvmaze.com/people/123/jane-doe", "tvmaze"));
        assert!(!is_profile_shaped(
            "https://www.tvmaze.com/people/123/jane-doe/gallery",
            "tvmaze"
        ));
        assert!(!is_profile_shaped("https://www.tvmaze.com/shows/1", "tvmaze"));
    }

    #[test]
    fn wikidata_requires_entity_id() {
        assert!(is_profile_shaped("https://www.wikidata.org/wiki/Q42", "wikidata"));
        assert!(!is_profile_shaped("https://www.wikidata.org/wiki/Special:Search", "wikidata"));
    }

    #[test]
    fn social_and_any_path_domains_always_pass() {
        assert!(is_profile_shaped("https://www.instagram.com/p/abc123", "instagram"));
        assert!(is_profile_shaped("https://linktr.ee/janedoe", "linktree"));
    }

    #[test]
    fn ad_hosts_are_detected_by_substring() {
        assert!(is_ad_host("https://ad.doubleclick.net/click?x=1"));
        assert!(!is_ad_host("https://www.themoviedb.org/person/1"));
    }

    #[test]
    fn candidate_carries_classification() {
        let candidate =
            UrlCandidate::new("https://www.themoviedb.org/person/31-jane-doe?language=en#bio");
        assert_eq!(
            candidate.normalized,
            "https://www.themoviedb.org/person/31-jane-doe"
        );
        assert_eq!(candidate.domain_key, "tmdb");
        assert_eq!(candidate.class, DomainClass::Profile);
        assert!(candidate.is_profile_shaped);
        assert_eq!(candidate.reachability, Reachability::Unknown);
    }
}
