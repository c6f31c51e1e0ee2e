use std::sync::Arc;

use axum::{Extension, Json};
use gallery_storage::{GalleryEntry, GalleryEntryInput, GalleryStore};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::types::{AppError, ValidatedJson};

/// New gallery entry submitted by the admin page
#[derive(Debug, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddEntryRequest {
    /// Short title
    #[validate(length(min = 1, message = "missing_title"))]
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
    /// URL returned by `POST /api/upload`
    #[validate(length(min = 1, message = "missing_image_url"))]
    pub image_url: String,
}

impl From<AddEntryRequest> for GalleryEntryInput {
    fn from(request: AddEntryRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            date: request.date,
            competition: request.competition,
            image_url: request.image_url,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct AddEntryResponse {
    pub success: bool,
    /// The stored entry, including its assigned id
    pub item: GalleryEntry,
}

/// Entry to delete
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct RemoveEntryRequest {
    /// Id of the entry to remove
    #[validate(required(message = "missing_id"))]
    pub id: Option<i64>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct RemoveEntryResponse {
    pub success: bool,
}

/// Lists all gallery entries in insertion order
///
/// Falls back to the built-in default collection when nothing is stored or the stored data
/// cannot be read.
#[instrument(skip(gallery_store))]
pub async fn list_entries(
    Extension(gallery_store): Extension<Arc<GalleryStore>>,
) -> Json<Vec<GalleryEntry>> {
    Json(gallery_store.read_all().await)
}

/// Adds a gallery entry
///
/// # Errors
///
/// - `400 BAD_REQUEST` - Invalid JSON or missing title / image URL
/// - `500 INTERNAL_SERVER_ERROR` - The gallery could not be saved
#[instrument(skip(gallery_store, payload))]
pub async fn add_entry(
    Extension(gallery_store): Extension<Arc<GalleryStore>>,
    ValidatedJson(payload): ValidatedJson<AddEntryRequest>,
) -> Result<Json<AddEntryResponse>, AppError> {
    let item = gallery_store.add(payload.into()).await?;

    Ok(Json(AddEntryResponse {
        success: true,
        item,
    }))
}

/// Removes the gallery entry with the given id
///
/// Removing an id that does not exist still succeeds.
///
/// # Errors
///
/// - `400 BAD_REQUEST` - Invalid JSON or missing id
/// - `500 INTERNAL_SERVER_ERROR` - The gallery could not be read or saved
#[instrument(skip(gallery_store, payload))]
pub async fn remove_entry(
    Extension(gallery_store): Extension<Arc<GalleryStore>>,
    ValidatedJson(payload): ValidatedJson<RemoveEntryRequest>,
) -> Result<Json<RemoveEntryResponse>, AppError> {
    let Some(id) = payload.id else {
        return Err(AppError::validation("missing_id"));
    };

    let removed = gallery_store.remove(id).await?;
    tracing::debug!(id, removed, "Handled gallery delete");

    Ok(Json(RemoveEntryResponse { success: true }))
}
