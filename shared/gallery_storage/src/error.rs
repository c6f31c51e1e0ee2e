//! Error types for gallery storage operations

use thiserror::Error;

/// Result type alias for gallery storage operations
pub type GalleryStorageResult<T> = Result<T, GalleryStorageError>;

/// Errors that can occur while reading or writing the gallery document
#[derive(Debug, Error)]
pub enum GalleryStorageError {
    /// The backend could not be read (filesystem or S3 failure)
    #[error("Failed to read gallery document: {0}")]
    ReadError(String),

    /// The backend rejected the new snapshot
    #[error("Failed to save gallery document: {0}")]
    WriteError(String),

    /// A document exists but is not a valid gallery array
    #[error("Gallery document is corrupt: {0}")]
    CorruptDocument(String),

    /// The in-memory collection could not be encoded
    #[error("Failed to serialize gallery document: {0}")]
    SerializationError(String),
}

impl GalleryStorageError {
    /// Short machine-readable classification, used in logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ReadError(_) => "read_error",
            Self::WriteError(_) => "write_error",
            Self::CorruptDocument(_) => "corrupt_document",
            Self::SerializationError(_) => "serialization_error",
        }
    }
}
