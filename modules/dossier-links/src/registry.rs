//! Table of known reference domains and their profile-path rules.
//!
//! One `DomainRule` per domain key. Adding a source means adding a row here,
//! never a special case at a call site.

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Profile path patterns
// =============================================================================

static RE_IMDB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(?:name/nm|title/tt)\d+/?$").expect("valid regex"));
static RE_TMDB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(?:person|movie|tv)/\d+(?:-[\w-]*)?/?$").expect("valid regex"));
static RE_WIKIDATA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/wiki/Q\d+/?$").expect("valid regex"));
static RE_LETTERBOXD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(?:actor|director|film)/[^/]+/?$").expect("valid regex"));
static RE_ROTTEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(?:celebrity|m)/[^/]+/?$").expect("valid regex"));
static RE_DISCOGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/artist/\d+(?:-[^/]*)?/?$").expect("valid regex"));
static RE_MUSICBRAINZ: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/artist/[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}/?$")
        .expect("valid regex")
});

// =============================================================================
// Non-profile path tokens
// =============================================================================

const WIKIPEDIA_FORBIDDEN: &[&str] = &[
    "category:",
    "file:",
    "special:",
    "talk:",
    "template:",
    "help:",
    "portal:",
];
const TVMAZE_FORBIDDEN: &[&str] = &["episodes", "gallery", "tag", "scene", "category"];
const TMDB_FORBIDDEN: &[&str] = &["images", "videos", "changes"];

// =============================================================================
// Rules
// =============================================================================

/// How a path is judged to be an entity's canonical page.
#[derive(Debug, Clone, Copy)]
pub enum ProfileRule {
    Structured {
        /// A path segment that must be present ("wiki", "people").
        required_segment: Option<&'static str>,
        /// Pattern the whole path must match.
        id_pattern: Option<&'static LazyLock<Regex>>,
        /// Segments that mark a non-profile page. Tokens ending in ':' match
        /// as a prefix ("category:actors").
        forbidden_tokens: &'static [&'static str],
    },
    /// Any path counts as a profile (link-in-bio style hosts).
    AnyPath,
}

#[derive(Debug, Clone, Copy)]
pub struct DomainRule {
    pub key: &'static str,
    pub hosts: &'static [&'static str],
    pub rule: ProfileRule,
    /// Sits behind anti-bot fronting; challenge statuses still prove existence.
    pub anti_bot: bool,
}

pub static KNOWN_DOMAINS: &[DomainRule] = &[
    DomainRule {
        key: "imdb",
        hosts: &["imdb.com"],
        rule: ProfileRule::Structured {
            required_segment: None,
            id_pattern: Some(&RE_IMDB),
            forbidden_tokens: &[],
        },
        anti_bot: true,
    },
    DomainRule {
        key: "tmdb",
        hosts: &["themoviedb.org"],
        rule: ProfileRule::Structured {
            required_segment: None,
            id_pattern: Some(&RE_TMDB),
            forbidden_tokens: TMDB_FORBIDDEN,
        },
        anti_bot: false,
    },
    DomainRule {
        key: "wikidata",
        hosts: &["wikidata.org"],
        rule: ProfileRule::Structured {
            required_segment: None,
            id_pattern: Some(&RE_WIKIDATA),
            forbidden_tokens: &[],
        },
        anti_bot: false,
    },
    DomainRule {
        key: "wikipedia",
        hosts: &["wikipedia.org"],
        rule: ProfileRule::Structured {
            required_segment: Some("wiki"),
            id_pattern: None,
            forbidden_tokens: WIKIPEDIA_FORBIDDEN,
        },
        anti_bot: false,
    },
    DomainRule {
        key: "letterboxd",
        hosts: &["letterboxd.com"],
        rule: ProfileRule::Structured {
            required_segment: None,
            id_pattern: Some(&RE_LETTERBOXD),
            forbidden_tokens: &[],
        },
        anti_bot: true,
    },
    DomainRule {
        key: "rottentomatoes",
        hosts: &["rottentomatoes.com"],
        rule: ProfileRule::Structured {
            required_segment: None,
            id_pattern: Some(&RE_ROTTEN),
            forbidden_tokens: &[],
        },
        anti_bot: true,
    },
    DomainRule {
        key: "discogs",
        hosts: &["discogs.com"],
        rule: ProfileRule::Structured {
            required_segment: None,
            id_pattern: Some(&RE_DISCOGS),
            forbidden_tokens: &[],
        },
        anti_bot: false,
    },
    DomainRule {
        key: "musicbrainz",
        hosts: &["musicbrainz.org"],
        rule: ProfileRule::Structured {
            required_segment: None,
            id_pattern: Some(&RE_MUSICBRAINZ),
            forbidden_tokens: &[],
        },
        anti_bot: false,
    },
    DomainRule {
        key: "tvmaze",
        hosts: &["tvmaze.com"],
        rule: ProfileRule::Structured {
            required_segment: Some("people"),
            id_pattern: None,
            forbidden_tokens: TVMAZE_FORBIDDEN,
        },
        anti_bot: false,
    },
    DomainRule {
        key: "linktree",
        hosts: &["linktr.ee"],
        rule: ProfileRule::AnyPath,
        anti_bot: false,
    },
];

// =============================================================================
// Social networks
// =============================================================================

/// Social networks: always accepted as profiles, ranked after reference sites.
pub struct SocialDomain {
    pub key: &'static str,
    pub hosts: &'static [&'static str],
}

pub static SOCIAL_DOMAINS: &[SocialDomain] = &[
    SocialDomain {
        key: "twitter",
        hosts: &["twitter.com", "x.com"],
    },
    SocialDomain {
        key: "instagram",
        hosts: &["instagram.com"],
    },
    SocialDomain {
        key: "facebook",
        hosts: &["facebook.com", "fb.com"],
    },
    SocialDomain {
        key: "tiktok",
        hosts: &["tiktok.com"],
    },
    SocialDomain {
        key: "youtube",
        hosts: &["youtube.com", "youtu.be"],
    },
    SocialDomain {
        key: "bluesky",
        hosts: &["bsky.app"],
    },
    SocialDomain {
        key: "reddit",
        hosts: &["reddit.com"],
    },
    SocialDomain {
        key: "threads",
        hosts: &["threads.net"],
    },
];

/// Host substrings of tracking and advertising endpoints.
pub const AD_HOST_MARKERS: &[&str] = &[
    "doubleclick",
    "googleadservices",
    "googlesyndication",
    "google-analytics",
    "googletagmanager",
    "amazon-adsystem",
    "adservice",
    "adnxs",
    "taboola",
    "outbrain",
    "scorecardresearch",
];

// =============================================================================
// Lookups
// =============================================================================

/// `host` equals `domain` or is a subdomain of it.
pub(crate) fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

pub fn rule_for_host(host: &str) -> Option<&'static DomainRule> {
    KNOWN_DOMAINS
        .iter()
        .find(|d| d.hosts.iter().any(|h| host_matches(host, h)))
}

pub fn social_for_host(host: &str) -> Option<&'static SocialDomain> {
    SOCIAL_DOMAINS
        .iter()
        .find(|d| d.hosts.iter().any(|h| host_matches(host, h)))
}

pub fn rule_for_key(key: &str) -> Option<&'static DomainRule> {
    KNOWN_DOMAINS.iter().find(|d| d.key == key)
}

pub fn is_social_key(key: &str) -> bool {
    SOCIAL_DOMAINS.iter().any(|d| d.key == key)
}

pub fn is_anti_bot(key: &str) -> bool {
    rule_for_key(key).is_some_and(|d| d.anti_bot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique_across_tables() {
        let mut keys: Vec<&str> = KNOWN_DOMAINS.iter().map(|d| d.key).collect();
        keys.extend(SOCIAL_DOMAINS.iter().map(|d| d.key));
        let count = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), count);
    }

    #[test]
    fn subdomains_match_but_lookalikes_do_not() {
        assert!(host_matches("en.wikipedia.org", "wikipedia.org"));
        assert!(host_matches("imdb.com", "imdb.com"));
        assert!(!host_matches("notimdb.com", "imdb.com"));
    }

    #[test]
    fn x_and_twitter_share_a_key() {
        assert_eq!(social_for_host("x.com").map(|d| d.key), Some("twitter"));
        assert_eq!(
            social_for_host("mobile.twitter.com").map(|d| d.key),
            Some("twitter")
        );
    }

    #[test]
    fn patterns_compile() {
        for domain in KNOWN_DOMAINS {
            if let ProfileRule::Structured { id_pattern: Some(re), .. } = domain.rule {
                assert!(!re.as_str().is_empty());
            }
        }
    }
}
