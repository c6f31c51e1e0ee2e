use std::sync::Arc;

use axum::{extract::Multipart, Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::instrument;

use crate::{
    media_storage::{ImageUpload, MediaStorage, MediaStorageError},
    types::AppError,
};

/// Multipart field carrying the image
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize, JsonSchema)]
pub struct UploadResponse {
    pub success: bool,
    /// Generated name of the stored file
    pub filename: String,
    /// Public URL to use as `imageUrl` of a gallery entry
    pub url: String,
}

/// Uploads a single image
///
/// Accepts a multipart form with one `file` field holding a JPEG, PNG, GIF or WebP image.
///
/// # Errors
///
/// - `400 BAD_REQUEST` - Missing file, disallowed type, empty or oversized file
/// - `500 INTERNAL_SERVER_ERROR` - The image could not be stored
#[instrument(skip(media_storage, multipart))]
pub async fn upload_image(
    Extension(media_storage): Extension<Arc<MediaStorage>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let upload = read_file_field(&mut multipart)
        .await?
        .ok_or(MediaStorageError::MissingFile)?;

    let stored = media_storage.upload(upload).await?;

    Ok(Json(UploadResponse {
        success: true,
        filename: stored.filename,
        url: stored.url,
    }))
}

/// Takes the first `file` field that carries a file, skipping everything else
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<ImageUpload>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(ToString::to_string) else {
            continue;
        };
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;

        return Ok(Some(ImageUpload {
            file_name,
            content_type,
            bytes,
        }));
    }

    Ok(None)
}
