use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::is_blank;

// --- Source identity ---

/// Identifier of one external directory (e.g. "imdb", "tmdb").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for SourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// --- Field keys ---

/// Shape of the value a field carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    List,
    BodyArt,
    UrlMap,
}

/// Every field the extractors may populate, for people and productions alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    // Person identity
    Name,
    Birthdate,
    Birthplace,
    Nationality,
    Ethnicity,
    Gender,
    Height,
    Weight,
    Measurements,
    HairColor,
    EyeColor,
    CareerStart,
    CareerEnd,
    Biography,
    // Production
    Title,
    ReleaseDate,
    Studio,
    Director,
    Duration,
    Synopsis,
    // Multi-valued
    Aliases,
    Tags,
    Awards,
    Tattoos,
    Piercings,
    Urls,
}

impl FieldKey {
    pub const ALL: [FieldKey; 26] = [
        FieldKey::Name,
        FieldKey::Birthdate,
        FieldKey::Birthplace,
        FieldKey::Nationality,
        FieldKey::Ethnicity,
        FieldKey::Gender,
        FieldKey::Height,
        FieldKey::Weight,
        FieldKey::Measurements,
        FieldKey::HairColor,
        FieldKey::EyeColor,
        FieldKey::CareerStart,
        FieldKey::CareerEnd,
        FieldKey::Biography,
        FieldKey::Title,
        FieldKey::ReleaseDate,
        FieldKey::Studio,
        FieldKey::Director,
        FieldKey::Duration,
        FieldKey::Synopsis,
        FieldKey::Aliases,
        FieldKey::Tags,
        FieldKey::Awards,
        FieldKey::Tattoos,
        FieldKey::Piercings,
        FieldKey::Urls,
    ];

    pub fn kind(self) -> FieldKind {
        match self {
            FieldKey::Aliases | FieldKey::Tags | FieldKey::Awards => FieldKind::List,
            FieldKey::Tattoos | FieldKey::Piercings => FieldKind::BodyArt,
            FieldKey::Urls => FieldKind::UrlMap,
            _ => FieldKind::Scalar,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Name => "name",
            FieldKey::Birthdate => "birthdate",
            FieldKey::Birthplace => "birthplace",
            FieldKey::Nationality => "nationality",
            FieldKey::Ethnicity => "ethnicity",
            FieldKey::Gender => "gender",
            FieldKey::Height => "height",
            FieldKey::Weight => "weight",
            FieldKey::Measurements => "measurements",
            FieldKey::HairColor => "hair_color",
            FieldKey::EyeColor => "eye_color",
            FieldKey::CareerStart => "career_start",
            FieldKey::CareerEnd => "career_end",
            FieldKey::Biography => "biography",
            FieldKey::Title => "title",
            FieldKey::ReleaseDate => "release_date",
            FieldKey::Studio => "studio",
            FieldKey::Director => "director",
            FieldKey::Duration => "duration",
            FieldKey::Synopsis => "synopsis",
            FieldKey::Aliases => "aliases",
            FieldKey::Tags => "tags",
            FieldKey::Awards => "awards",
            FieldKey::Tattoos => "tattoos",
            FieldKey::Piercings => "piercings",
            FieldKey::Urls => "urls",
        }
    }

    /// Parse a collaborator's key. Accepts the canonical snake_case names plus
    /// the spellings extractors commonly emit ("aka", "birthday", "hair_colour").
    pub fn parse(key: &str) -> Option<Self> {
        let lowered = key.trim().to_lowercase().replace(['-', ' '], "_");
        if let Some(found) = FieldKey::ALL.iter().find(|k| k.as_str() == lowered) {
            return Some(*found);
        }
        let alias = match lowered.as_str() {
            "aka" | "alias" | "also_known_as" => FieldKey::Aliases,
            "birthday" | "date_of_birth" | "dob" => FieldKey::Birthdate,
            "place_of_birth" => FieldKey::Birthplace,
            "hair" | "hair_colour" => FieldKey::HairColor,
            "eyes" | "eye_colour" => FieldKey::EyeColor,
            "bio" => FieldKey::Biography,
            "years_active_start" | "active_from" => FieldKey::CareerStart,
            "years_active_end" | "active_to" => FieldKey::CareerEnd,
            "released" | "date" => FieldKey::ReleaseDate,
            "runtime" | "length" => FieldKey::Duration,
            "description" | "plot" => FieldKey::Synopsis,
            "tag" | "genres" | "categories" => FieldKey::Tags,
            "links" => FieldKey::Urls,
            _ => return None,
        };
        Some(alias)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Values ---

/// Position value meaning "unspecified or several places".
pub const UNSPECIFIED_POSITION: &str = "multiple";

/// One tattoo or piercing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyArtEntry {
    pub position: String,
    pub description: Option<String>,
}

impl BodyArtEntry {
    pub fn new(position: &str, description: Option<&str>) -> Self {
        Self {
            position: position.trim().to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from),
        }
    }

    /// Flat statements ("has tattoos", "various") carry no usable position.
    pub fn is_unspecified(&self) -> bool {
        let position = self.position.trim();
        position.is_empty() || position.eq_ignore_ascii_case(UNSPECIFIED_POSITION)
    }

    /// `(lowered position, lowered description)`.
    pub fn dedup_key(&self) -> (String, String) {
        (
            self.position.trim().to_lowercase(),
            self.description
                .as_deref()
                .unwrap_or("")
                .trim()
                .to_lowercase(),
        )
    }
}

impl fmt::Display for BodyArtEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(desc) => write!(f, "{}: {}", self.position, desc),
            None => f.write_str(&self.position),
        }
    }
}

/// A field value as extracted from one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Scalar(String),
    StringList(Vec<String>),
    BodyArtList(Vec<BodyArtEntry>),
    UrlMap(BTreeMap<String, String>),
}

impl FieldValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        FieldValue::Scalar(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::StringList(values.into_iter().map(Into::into).collect())
    }

    /// Whitespace-only scalars and lists of blanks count as absent.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Scalar(s) => is_blank(s),
            FieldValue::StringList(items) => items.iter().all(|s| is_blank(s)),
            FieldValue::BodyArtList(entries) => entries.is_empty(),
            FieldValue::UrlMap(urls) => urls.values().all(|u| is_blank(u)),
        }
    }

    /// Best-effort scalar view. Lists are joined with ", ".
    pub fn as_scalar(&self) -> Option<String> {
        let text = match self {
            FieldValue::Scalar(s) => s.trim().to_string(),
            FieldValue::StringList(items) => non_blank(items).join(", "),
            FieldValue::BodyArtList(entries) => entries
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
            FieldValue::UrlMap(_) => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    /// Best-effort list view. Scalars are split on commas.
    pub fn as_list(&self) -> Vec<String> {
        match self {
            FieldValue::Scalar(s) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            FieldValue::StringList(items) => non_blank(items),
            FieldValue::BodyArtList(entries) => entries.iter().map(ToString::to_string).collect(),
            FieldValue::UrlMap(urls) => urls.values().filter(|u| !is_blank(u)).cloned().collect(),
        }
    }

    /// Best-effort body-art view. Flat text becomes one unspecified entry.
    pub fn as_body_art(&self) -> Vec<BodyArtEntry> {
        match self {
            FieldValue::BodyArtList(entries) => entries.clone(),
            FieldValue::Scalar(s) if is_blank(s) => Vec::new(),
            FieldValue::Scalar(s) => vec![BodyArtEntry::new(UNSPECIFIED_POSITION, Some(s))],
            FieldValue::StringList(items) => non_blank(items)
                .iter()
                .map(|s| BodyArtEntry::new(UNSPECIFIED_POSITION, Some(s)))
                .collect(),
            FieldValue::UrlMap(_) => Vec::new(),
        }
    }

    pub fn as_url_map(&self) -> BTreeMap<String, String> {
        match self {
            FieldValue::UrlMap(urls) => urls
                .iter()
                .filter(|(_, u)| !is_blank(u))
                .map(|(k, u)| (k.clone(), u.trim().to_string()))
                .collect(),
            _ => BTreeMap::new(),
        }
    }

    /// Coerce a loosely typed collaborator value into the typed union.
    /// Returns `None` for nulls and shapes with nothing usable in them.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Null => None,
            Value::String(s) => Some(FieldValue::Scalar(s.clone())),
            Value::Number(n) => Some(FieldValue::Scalar(n.to_string())),
            Value::Bool(b) => Some(FieldValue::Scalar(b.to_string())),
            Value::Array(items) => {
                if items.iter().any(Value::is_object) {
                    let entries: Vec<BodyArtEntry> =
                        items.iter().filter_map(body_art_from_json).collect();
                    return (!entries.is_empty()).then_some(FieldValue::BodyArtList(entries));
                }
                let strings: Vec<String> = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        Value::Bool(b) => Some(b.to_string()),
                        _ => None,
                    })
                    .collect();
                Some(FieldValue::StringList(strings))
            }
            Value::Object(map) => {
                let urls: BTreeMap<String, String> = map
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|u| (k.clone(), u.to_string())))
                    .collect();
                Some(FieldValue::UrlMap(urls))
            }
        }
    }
}

fn non_blank(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn body_art_from_json(item: &serde_json::Value) -> Option<BodyArtEntry> {
    match item {
        serde_json::Value::Object(map) => {
            let position = map
                .get("position")
                .and_then(|p| p.as_str())
                .unwrap_or(UNSPECIFIED_POSITION);
            let description = map.get("description").and_then(|d| d.as_str());
            Some(BodyArtEntry::new(position, description))
        }
        serde_json::Value::String(s) if !is_blank(s) => {
            Some(BodyArtEntry::new(UNSPECIFIED_POSITION, Some(s)))
        }
        _ => None,
    }
}

fn fields_from_json(
    context: &str,
    fields: &serde_json::Map<String, serde_json::Value>,
) -> BTreeMap<FieldKey, FieldValue> {
    let mut out = BTreeMap::new();
    for (raw_key, raw_value) in fields {
        let Some(key) = FieldKey::parse(raw_key) else {
            debug!(context, key = raw_key.as_str(), "Ignoring unknown field key");
            continue;
        };
        match FieldValue::from_json(raw_value) {
            Some(value) => {
                out.insert(key, value);
            }
            None => debug!(context, key = raw_key.as_str(), "Dropping null field value"),
        }
    }
    out
}

// --- Records ---

/// One extractor's output for one entity. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    source_id: SourceId,
    source_url: String,
    fields: BTreeMap<FieldKey, FieldValue>,
    fetched_at: DateTime<Utc>,
}

impl SourceRecord {
    pub fn new(source_id: impl Into<SourceId>, source_url: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            source_url: source_url.into(),
            fields: BTreeMap::new(),
            fetched_at: Utc::now(),
        }
    }

    pub fn with_field(mut self, key: FieldKey, value: FieldValue) -> Self {
        self.fields.insert(key, value);
        self
    }

    /// Build a record from an untyped mapping, coercing each value.
    pub fn from_json_fields(
        source_id: impl Into<SourceId>,
        source_url: impl Into<String>,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        let source_id = source_id.into();
        let fields = fields_from_json(source_id.as_str(), fields);
        Self {
            source_id,
            source_url: source_url.into(),
            fields,
            fetched_at: Utc::now(),
        }
    }

    pub fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn fields(&self) -> &BTreeMap<FieldKey, FieldValue> {
        &self.fields
    }

    /// The value for `key`, or `None` when absent or blank.
    pub fn get(&self, key: FieldKey) -> Option<&FieldValue> {
        self.fields.get(&key).filter(|v| !v.is_empty())
    }

    /// True when the extractor produced nothing usable.
    pub fn is_empty(&self) -> bool {
        self.fields.values().all(FieldValue::is_empty)
    }
}

/// The currently stored record for an entity. Read-only here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    fields: BTreeMap<FieldKey, FieldValue>,
}

impl EntitySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: FieldKey, value: FieldValue) -> Self {
        self.fields.insert(key, value);
        self
    }

    pub fn from_json_fields(fields: &serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            fields: fields_from_json("snapshot", fields),
        }
    }

    pub fn get(&self, key: FieldKey) -> Option<&FieldValue> {
        self.fields.get(&key).filter(|v| !v.is_empty())
    }
}
