use anyhow::Result;
use async_trait::async_trait;
use dossier_common::normalize::slugify;
use dossier_common::{SourceId, SourceRecord};

/// One external directory's fetch-and-parse collaborator.
///
/// `extract` returns `Ok(None)` when the page had nothing for this entity.
/// Parsing the page itself is the implementor's business.
#[async_trait]
pub trait Extractor: Send + Sync {
    fn source_id(&self) -> &SourceId;

    /// URL to try when no known URL exists for this source.
    fn guess_url(&self, _name_hint: &str) -> Option<String> {
        None
    }

    async fn extract(&self, url: &str) -> Result<Option<SourceRecord>>;
}

/// Fill `{slug}` in a URL template with a slug of the name.
/// "https://example.com/people/{slug}" with "Jane O'Doe" and '-' gives
/// "https://example.com/people/jane-o-doe". `None` when the name has no
/// usable characters.
pub fn guess_from_template(template: &str, name_hint: &str, separator: char) -> Option<String> {
    let slug = slugify(name_hint, separator);
    if slug.is_empty() {
        return None;
    }
    Some(template.replace("{slug}", &slug))
}
