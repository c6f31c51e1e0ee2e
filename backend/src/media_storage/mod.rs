//! Image upload validation and storage
mod error;
mod local;
mod s3;

use std::sync::Arc;

use axum::body::Bytes;
use chrono::Utc;
use mime::Mime;
use sha2::{Digest, Sha256};
use strum::{Display, EnumString};
use tracing::{info, instrument};
use uuid::Uuid;

pub use error::{MediaStorageError, MediaStorageResult};
pub use local::{LocalMediaBackend, UPLOADS_DIR};
pub use s3::S3MediaBackend;

const DEFAULT_EXTENSION: &str = "jpg";
const MAX_EXTENSION_LEN: usize = 5;
const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Where uploaded bytes end up
#[async_trait::async_trait]
pub trait MediaBackend: Send + Sync {
    /// Whether an object is already stored under `key`
    async fn exists(&self, key: &str) -> MediaStorageResult<bool>;

    /// Stores `bytes` under `key`
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: Bytes,
        sha256: &[u8],
    ) -> MediaStorageResult<()>;

    /// Publicly reachable URL of the object stored under `key`
    fn public_url(&self, key: &str) -> String;

    /// Human readable location, for logs
    fn describe(&self) -> String;
}

/// How stored files are named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum FileNaming {
    /// `photo_{millis}_{random}.{ext}`
    #[strum(serialize = "timestamp")]
    Timestamp,
    /// `media/{ab}/{cd}/{sha256}.{ext}`, identical uploads share one object
    #[strum(serialize = "content")]
    ContentHash,
}

/// A single file taken from a multipart submission
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Name of the file on the client
    pub file_name: String,
    /// Declared content type
    pub content_type: String,
    /// Raw file content
    pub bytes: Bytes,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Generated name (storage key) of the file
    pub filename: String,
    /// Public URL of the stored file
    pub url: String,
}

/// Validates image uploads and hands them to a [`MediaBackend`]
pub struct MediaStorage {
    backend: Arc<dyn MediaBackend>,
    max_upload_bytes: usize,
    naming: FileNaming,
}

impl MediaStorage {
    /// Creates a new media storage
    ///
    /// # Arguments
    ///
    /// * `backend` - Where accepted files are written
    /// * `max_upload_bytes` - Largest accepted file
    /// * `naming` - How stored files are named
    #[must_use]
    pub fn new(backend: Arc<dyn MediaBackend>, max_upload_bytes: usize, naming: FileNaming) -> Self {
        Self {
            backend,
            max_upload_bytes,
            naming,
        }
    }

    /// Largest accepted file in bytes
    #[must_use]
    pub const fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Human readable location of stored files
    #[must_use]
    pub fn describe(&self) -> String {
        self.backend.describe()
    }

    /// Validates and stores an image
    ///
    /// Nothing is written when validation fails.
    ///
    /// # Errors
    ///
    /// Returns `MediaStorageError::InvalidFileType` if the content type is not JPEG, PNG, GIF or WebP
    /// Returns `MediaStorageError::EmptyFile` if the file has no content
    /// Returns `MediaStorageError::FileTooLarge` if the file exceeds the size cap
    /// Returns `MediaStorageError::S3Error`, `UpstreamError`, `ReadError` or `WriteError` if the backend fails
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name, size = upload.bytes.len()))]
    pub async fn upload(&self, upload: ImageUpload) -> MediaStorageResult<StoredImage> {
        let content_type = validate_content_type(&upload.content_type)?;

        let size = upload.bytes.len();
        if size == 0 {
            return Err(MediaStorageError::EmptyFile);
        }
        if size > self.max_upload_bytes {
            return Err(MediaStorageError::FileTooLarge {
                size,
                max: self.max_upload_bytes,
            });
        }

        let digest = Sha256::digest(&upload.bytes);
        let extension = file_extension(&upload.file_name);

        let key = match self.naming {
            FileNaming::Timestamp => timestamp_key(
                Utc::now().timestamp_millis(),
                &Uuid::new_v4().simple().to_string()[..8],
                &extension,
            ),
            FileNaming::ContentHash => content_key(&hex::encode(digest), &extension),
        };

        let url = self.backend.public_url(&key);

        if self.naming == FileNaming::ContentHash && self.backend.exists(&key).await? {
            info!("Image already stored at {key}, skipping upload");
            return Ok(StoredImage { filename: key, url });
        }

        self.backend
            .put(&key, &content_type, upload.bytes, &digest)
            .await?;

        info!("Stored image {key}");
        Ok(StoredImage { filename: key, url })
    }
}

/// Parses the declared content type and checks it against the allowed image types
///
/// Returns the lowercased essence (`type/subtype`, parameters dropped).
fn validate_content_type(content_type: &str) -> MediaStorageResult<String> {
    let invalid = || MediaStorageError::InvalidFileType(content_type.to_string());
    let mime: Mime = content_type.trim().parse().map_err(|_| invalid())?;

    let essence = mime.essence_str().to_ascii_lowercase();
    if ALLOWED_IMAGE_TYPES.contains(&essence.as_str()) {
        Ok(essence)
    } else {
        Err(invalid())
    }
}

/// Extension of the client-supplied file name, or `jpg` when it has none usable
fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.bytes().all(|b| b.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

fn timestamp_key(millis: i64, suffix: &str, extension: &str) -> String {
    format!("photo_{millis}_{suffix}.{extension}")
}

/// Spreads content-addressed objects over two directory levels
fn content_key(sha256_hex: &str, extension: &str) -> String {
    let ab = &sha256_hex[0..2];
    let cd = &sha256_hex[2..4];
    format!("media/{ab}/{cd}/{sha256_hex}.{extension}")
}
