//! Persistence backends for the gallery document

mod local;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
mod s3;

pub use local::LocalFileBackend;
pub use s3::{DocumentLayout, S3DocumentBackend};

use crate::GalleryStorageResult;

/// Storage for the raw gallery document
///
/// A backend only moves bytes. Parsing, defaults and the read-modify-write cycle live in
/// [`crate::GalleryStore`].
#[async_trait::async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Returns the latest persisted document, or `None` if nothing has been stored yet
    ///
    /// # Errors
    ///
    /// Returns `GalleryStorageError::ReadError` if the backend cannot be read
    async fn load(&self) -> GalleryStorageResult<Option<Vec<u8>>>;

    /// Persists a new full snapshot of the document
    ///
    /// # Errors
    ///
    /// Returns `GalleryStorageError::WriteError` if the snapshot is not stored
    async fn save(&self, document: Vec<u8>) -> GalleryStorageResult<()>;

    /// Human readable location of the document, for logs
    fn describe(&self) -> String;
}
