//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gallery_storage::GalleryStorageError;
use schemars::JsonSchema;
use serde::Serialize;

use crate::media_storage::MediaStorageError;

/// API error response envelope
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: &'static str,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(
        status: StatusCode,
        code: &'static str,
        msg: &'static str,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody { code, message: msg },
            },
        }
    }

    /// Builds a `400 Bad Request` from a validation error code
    #[must_use]
    pub fn validation(code: &str) -> Self {
        let (code, message) = match code {
            "missing_id" => ("missing_id", "Gallery entry id is required"),
            "missing_title" => ("missing_title", "Title is required"),
            "missing_image_url" => ("missing_image_url", "Image URL is required"),
            _ => ("validation_error", "Request validation failed"),
        };
        Self::new(StatusCode::BAD_REQUEST, code, message, false)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert gallery storage errors to application errors
impl From<GalleryStorageError> for AppError {
    fn from(err: GalleryStorageError) -> Self {
        use GalleryStorageError::{CorruptDocument, ReadError, SerializationError, WriteError};

        tracing::error!("Gallery storage error ({}): {err}", err.kind());
        match err {
            WriteError(_) | SerializationError(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "save_failed",
                "Failed to save gallery data",
                true,
            ),
            ReadError(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "read_failed",
                "Failed to read gallery data",
                true,
            ),
            CorruptDocument(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "corrupt_gallery",
                "Stored gallery data is corrupt",
                false,
            ),
        }
    }
}

/// Convert media storage errors to application errors
impl From<MediaStorageError> for AppError {
    fn from(err: MediaStorageError) -> Self {
        use MediaStorageError::{
            EmptyFile, FileTooLarge, InvalidFileType, MissingFile, ReadError, S3Error, UpstreamError,
            WriteError,
        };

        match &err {
            MissingFile => Self::new(
                StatusCode::BAD_REQUEST,
                "missing_file",
                "No file received",
                false,
            ),
            InvalidFileType(content_type) => {
                tracing::debug!("Rejected content type: {content_type}");
                Self::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_file_type",
                    "Invalid file type. Only JPEG, PNG, GIF and WebP images are allowed.",
                    false,
                )
            }
            EmptyFile => Self::new(
                StatusCode::BAD_REQUEST,
                "empty_file",
                "The uploaded file is empty",
                false,
            ),
            FileTooLarge { size, max } => {
                tracing::debug!("Rejected upload of {size} bytes (max {max})");
                Self::new(
                    StatusCode::BAD_REQUEST,
                    "file_too_large",
                    "File too large. Please compress your image.",
                    false,
                )
            }
            UpstreamError(msg) => {
                tracing::error!("S3 upstream error: {msg}");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "upstream_error",
                    "Storage service temporarily unavailable",
                    true,
                )
            }
            S3Error(msg) | ReadError(msg) | WriteError(msg) => {
                tracing::error!("Media storage error: {msg}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "upload_failed",
                    "Upload failed",
                    true,
                )
            }
        }
    }
}

/// Convert multipart parsing errors to application errors
impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        tracing::warn!("Multipart error: {}", err.body_text());
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::new(
                StatusCode::BAD_REQUEST,
                "file_too_large",
                "File too large. Please compress your image.",
                false,
            )
        } else {
            Self::new(
                StatusCode::BAD_REQUEST,
                "invalid_multipart",
                "Invalid multipart payload",
                false,
            )
        }
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}
