//! Error types for image uploads

use aws_sdk_s3::{
    error::{DisplayErrorContext, SdkError},
    operation::{head_object::HeadObjectError, put_object::PutObjectError},
};
use thiserror::Error;

/// Result type for media storage operations
pub type MediaStorageResult<T> = Result<T, MediaStorageError>;

/// Errors that can occur while accepting or storing an image
#[derive(Error, Debug)]
pub enum MediaStorageError {
    /// The multipart submission had no `file` field
    #[error("No file received")]
    MissingFile,

    /// The declared content type is not an allowed image type
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    /// The file has no content
    #[error("Empty file")]
    EmptyFile,

    /// The file exceeds the configured size cap
    #[error("File too large: {size} bytes (max {max})")]
    FileTooLarge {
        /// Size of the rejected file
        size: usize,
        /// Configured cap
        max: usize,
    },

    /// S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// Upstream service error (5xx from S3)
    #[error("Upstream service error: {0}")]
    UpstreamError(String),

    /// Local filesystem lookup failed
    #[error("Failed to read file: {0}")]
    ReadError(String),

    /// Local filesystem write failed
    #[error("Failed to write file: {0}")]
    WriteError(String),
}

impl From<SdkError<HeadObjectError>> for MediaStorageError {
    fn from(error: SdkError<HeadObjectError>) -> Self {
        match &error {
            SdkError::ServiceError(err) if err.raw().status().as_u16() >= 500 => {
                Self::UpstreamError(format!("{:?}", err.err()))
            }
            _ => Self::S3Error(DisplayErrorContext(&error).to_string()),
        }
    }
}

impl From<SdkError<PutObjectError>> for MediaStorageError {
    fn from(error: SdkError<PutObjectError>) -> Self {
        match &error {
            SdkError::ServiceError(err) if err.raw().status().as_u16() >= 500 => {
                Self::UpstreamError(format!("{:?}", err.err()))
            }
            _ => Self::S3Error(DisplayErrorContext(&error).to_string()),
        }
    }
}
