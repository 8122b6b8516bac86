//! Exhibit record and request types
//!
//! Field names are snake_case on the wire and on disk. The slug is the
//! document key and is not repeated inside the record.

use crate::error::Error;
use serde::{Deserialize, Deserializer, Serialize};

/// Exhibit kind assigned at creation
pub const EXHIBIT_TYPE_SOLO: &str = "solo";

/// Timestamp format for `created_at` / `updated_at`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A curated grouping of artworks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exhibit {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover: Option<String>,
    /// Artwork identifiers in display order
    #[serde(default)]
    pub artworks: Vec<String>,
    #[serde(rename = "type", default = "default_type")]
    pub kind: String,
    #[serde(default = "default_duration")]
    pub duration: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub opening_reception: Option<String>,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub press_release: String,
    /// Free text; `draft`, `published`, `archived` by convention only
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn default_type() -> String { EXHIBIT_TYPE_SOLO.to_string() }
fn default_duration() -> String { "temporary".to_string() }
fn default_status() -> String { "draft".to_string() }

/// Fields accepted by `create`.
///
/// An explicit `null` is the same as leaving the field out.
#[derive(Debug, Default, Deserialize)]
pub struct NewExhibit {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artworks: Vec<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub opening_reception: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub venue: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub press_release: String,
    #[serde(default)]
    pub status: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl NewExhibit {
    /// Build the stored record (title already validated)
    pub fn into_exhibit(self, created_at: String) -> Exhibit {
        Exhibit {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            cover: self.cover,
            artworks: self.artworks,
            kind: default_type(),
            duration: self.duration.unwrap_or_else(default_duration),
            start_date: self.start_date,
            end_date: self.end_date,
            opening_reception: self.opening_reception,
            venue: self.venue.trim().to_string(),
            press_release: self.press_release.trim().to_string(),
            status: self.status.unwrap_or_else(default_status),
            created_at,
            updated_at: None,
        }
    }
}

/// Partial update restricted to the editable fields.
///
/// Absent fields are left alone and unknown fields are ignored. Nullable
/// fields distinguish "absent" (`None`) from an explicit `null`
/// (`Some(None)`).
#[derive(Debug, Default, Deserialize)]
pub struct ExhibitPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub cover: Option<Option<String>>,
    pub artworks: Option<Vec<String>>,
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub start_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub end_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub opening_reception: Option<Option<String>>,
    pub venue: Option<String>,
    pub press_release: Option<String>,
    pub status: Option<String>,
}

fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

impl ExhibitPatch {
    /// Apply present fields to `exhibit`, trimming string values
    pub fn apply(self, exhibit: &mut Exhibit) {
        if let Some(title) = self.title {
            exhibit.title = trimmed(title);
        }
        if let Some(description) = self.description {
            exhibit.description = trimmed(description);
        }
        if let Some(cover) = self.cover {
            exhibit.cover = cover.map(trimmed);
        }
        if let Some(artworks) = self.artworks {
            exhibit.artworks = artworks;
        }
        if let Some(duration) = self.duration {
            exhibit.duration = trimmed(duration);
        }
        if let Some(start_date) = self.start_date {
            exhibit.start_date = start_date.map(trimmed);
        }
        if let Some(end_date) = self.end_date {
            exhibit.end_date = end_date.map(trimmed);
        }
        if let Some(opening_reception) = self.opening_reception {
            exhibit.opening_reception = opening_reception.map(trimmed);
        }
        if let Some(venue) = self.venue {
            exhibit.venue = trimmed(venue);
        }
        if let Some(press_release) = self.press_release {
            exhibit.press_release = trimmed(press_release);
        }
        if let Some(status) = self.status {
            exhibit.status = trimmed(status);
        }
    }
}

/// Actions accepted by the exhibits endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhibitAction {
    List,
    Create,
    Update,
    Delete,
    Reorder,
}

/// Error message for an unrecognized action
pub const INVALID_ACTION: &str = "Invalid action. Use: list, create, update, delete, reorder";

impl ExhibitAction {
    /// Whether the action writes the document
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::List)
    }
}

impl std::fmt::Display for ExhibitAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Reorder => write!(f, "reorder"),
        }
    }
}

impl std::str::FromStr for ExhibitAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(Self::List),
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "reorder" => Ok(Self::Reorder),
            _ => Err(Error::Validation(INVALID_ACTION.to_string())),
        }
    }
}

/// Convert a title to a URL-safe slug.
///
/// ASCII letters and digits are kept (lowercased); every other run of
/// characters becomes a single `-`, and leading/trailing dashes are dropped.
/// May return an empty string.
pub fn slugify(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Current local time in the exhibit timestamp format
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
