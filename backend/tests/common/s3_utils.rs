use std::sync::Arc;

use aws_sdk_s3::{
    error::SdkError, operation::head_object::HeadObjectError, primitives::ByteStream,
    Client as S3Client,
};
use backend::{
    media_storage::{FileNaming, MediaStorage, S3MediaBackend},
    types::Environment,
};
use uuid::Uuid;

use super::{setup_test_env, TEST_MAX_UPLOAD_BYTES};

pub const TEST_PUBLIC_BASE_URL: &str = "https://cdn.example.test";

/// Fresh LocalStack bucket with media storage on top of it
pub struct S3TestSetup {
    pub s3_client: Arc<S3Client>,
    pub bucket_name: String,
}

impl S3TestSetup {
    pub async fn new(test_name: &str) -> Self {
        setup_test_env();

        let environment = Environment::Development;
        let s3_config = environment.s3_client_config().await;
        let s3_client = Arc::new(S3Client::from_conf(s3_config));
        let bucket_name = format!("{test_name}-{}", Uuid::new_v4().simple());

        s3_client
            .create_bucket()
            .bucket(&bucket_name)
            .send()
            .await
            .expect("Failed to create test bucket");

        Self {
            s3_client,
            bucket_name,
        }
    }

    pub fn media_storage(&self, naming: FileNaming) -> MediaStorage {
        let backend = S3MediaBackend::new(
            self.s3_client.clone(),
            self.bucket_name.clone(),
            TEST_PUBLIC_BASE_URL.to_string(),
        );
        MediaStorage::new(Arc::new(backend), TEST_MAX_UPLOAD_BYTES, naming)
    }

    /// Object count in the bucket
    pub async fn object_count(&self) -> usize {
        self.s3_client
            .list_objects_v2()
            .bucket(&self.bucket_name)
            .send()
            .await
            .expect("Failed to list test bucket")
            .contents()
            .len()
    }

    pub async fn put_object(&self, key: &str, data: &[u8]) {
        self.s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .expect("Failed to put test object");
    }
}

/// Download data from S3 using S3 client
pub async fn download_from_s3(
    s3_client: &S3Client,
    bucket: &str,
    key: &str,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let response = s3_client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await?;

    let body = response.body.collect().await?;
    Ok(body.into_bytes().to_vec())
}

/// Content type recorded for an object
pub async fn s3_content_type(
    s3_client: &S3Client,
    bucket: &str,
    key: &str,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let response = s3_client.head_object().bucket(bucket).key(key).send().await?;
    Ok(response.content_type().map(ToString::to_string))
}

/// Check if S3 object exists
pub async fn s3_object_exists(
    s3_client: &S3Client,
    bucket: &str,
    key: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    match s3_client.head_object().bucket(bucket).key(key).send().await {
        Ok(_) => Ok(true),
        Err(SdkError::ServiceError(service_err))
            if matches!(service_err.err(), HeadObjectError::NotFound(_)) =>
        {
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
