use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One event photo shown in the gallery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryEntry {
    /// Unique identifier, assigned by the store at creation time
    pub id: i64,
    /// Short title
    pub title: String,
    /// Free-text description
    pub description: String,
    /// Calendar date of the event (e.g. `2025-09-28`)
    pub date: String,
    /// Competition tag
    pub competition: String,
    /// Absolute or root-relative URL of the stored image
    pub image_url: String,
}

/// A gallery entry as submitted by the admin, before an id is assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryEntryInput {
    /// Short title
    pub title: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Calendar date of the event
    #[serde(default)]
    pub date: String,
    /// Competition tag
    #[serde(default)]
    pub competition: String,
    /// URL returned by the upload endpoint
    pub image_url: String,
}

impl GalleryEntryInput {
    /// Turns the input into a stored entry with the given id
    #[must_use]
    pub fn into_entry(self, id: i64) -> GalleryEntry {
        GalleryEntry {
            id,
            title: self.title,
            description: self.description,
            date: self.date,
            competition: self.competition,
            image_url: self.image_url,
        }
    }
}

/// The collection served when nothing has been stored yet
#[must_use]
pub fn default_collection() -> Vec<GalleryEntry> {
    vec![GalleryEntry {
        id: 1,
        title: "장성호 멸망전".to_string(),
        description: "2025 장성호 멸망전".to_string(),
        date: "2025-09-28".to_string(),
        competition: "장성호".to_string(),
        image_url: "/winner.jpeg".to_string(),
    }]
}
