// Pure normalization helpers shared by the reconcilers and the URL pipeline.

use url::{ParseError, Url};

/// Query parameters that identify a click, not a resource.
const TRACKING_PARAMS: &[&str] = &[
    "_dt",
    "fbclid",
    "gclid",
    "igshid",
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "ref",
    "ref_",
    "mc_cid",
    "mc_eid",
];

/// Comparison key for literal value matching: trimmed and case-folded.
pub fn comparison_key(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Parse a URL, tolerating a missing scheme ("imdb.com/name/nm1"). Input that
/// already carries a scheme is never re-prefixed, so `mailto:` and `tel:`
/// links come back as `None` (no host).
pub fn parse_lenient(raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match Url::parse(trimmed) {
        Ok(parsed) => parsed.has_host().then_some(parsed),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let prefixed = Url::parse(&format!("https://{trimmed}")).ok()?;
            prefixed.has_host().then_some(prefixed)
        }
        Err(_) => None,
    }
}

/// An `http`/`https` URL with a host and no embedded credentials.
pub fn is_web_url(raw: &str) -> bool {
    let Some(url) = parse_lenient(raw) else {
        return false;
    };
    matches!(url.scheme(), "http" | "https")
        && url.username().is_empty()
        && url.password().is_none()
}

/// Strip tracking parameters and the fragment. Scheme and host come back
/// lowercased because `Url` normalizes them. Unparsable input is returned trimmed.
pub fn sanitize_url(raw: &str) -> String {
    let Some(mut parsed) = parse_lenient(raw) else {
        return raw.trim().to_string();
    };
    parsed.set_fragment(None);

    if parsed.query().is_some() {
        let clean_pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if clean_pairs.is_empty() {
            parsed.set_query(None);
        } else {
            parsed.query_pairs_mut().clear().extend_pairs(clean_pairs);
        }
    }

    parsed.to_string()
}

/// Drop query string and fragment entirely, lowercase the host and remove the
/// trailing slash. Applying it twice yields the same string.
pub fn strip_query_and_fragment(raw: &str) -> String {
    let Some(mut parsed) = parse_lenient(raw) else {
        let trimmed = raw.trim();
        let cut = trimmed.find(['?', '#']).unwrap_or(trimmed.len());
        return trimmed[..cut].trim_end_matches('/').to_string();
    };
    parsed.set_query(None);
    parsed.set_fragment(None);
    parsed.to_string().trim_end_matches('/').to_string()
}

/// Lowercased host of a URL, if it has one.
pub fn host_of(raw: &str) -> Option<String> {
    parse_lenient(raw).and_then(|u| u.host_str().map(str::to_lowercase))
}

/// Host without a leading `www.`.
pub fn bare_host(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Lowercased alphanumeric tokens of a name, dropping initials.
pub fn name_tokens(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

/// ASCII slug for guess URLs: "Jane O'Doe" with `-` gives "jane-o-doe".
pub fn slugify(name: &str, separator: char) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join(&separator.to_string())
}
