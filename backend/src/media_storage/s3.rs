use std::sync::Arc;

use aws_sdk_s3::{
    error::SdkError, operation::head_object::HeadObjectError, primitives::ByteStream,
    Client as S3Client,
};
use axum::body::Bytes;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use super::{MediaBackend, MediaStorageResult};

/// Images stored as publicly readable objects in an S3 bucket
pub struct S3MediaBackend {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    public_base_url: String,
}

impl S3MediaBackend {
    /// Creates a new S3 media backend
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for image storage
    /// * `public_base_url` - Base URL under which objects of the bucket are publicly readable
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, bucket_name: String, public_base_url: String) -> Self {
        Self {
            s3_client,
            bucket_name,
            public_base_url,
        }
    }
}

#[async_trait::async_trait]
impl MediaBackend for S3MediaBackend {
    async fn exists(&self, key: &str) -> MediaStorageResult<bool> {
        let result = self
            .s3_client
            .head_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), HeadObjectError::NotFound(_)) =>
            {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: Bytes,
        sha256: &[u8],
    ) -> MediaStorageResult<()> {
        let size = bytes.len();

        self.s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .checksum_sha256(STANDARD.encode(sha256))
            .body(ByteStream::from(bytes))
            .send()
            .await?;

        debug!("Stored {size} bytes at s3://{}/{key}", self.bucket_name);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }

    fn describe(&self) -> String {
        format!("s3://{}", self.bucket_name)
    }
}
