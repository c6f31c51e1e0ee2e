//! S3 test setup utilities

use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::{config::Region, primitives::ByteStream, Client as S3Client};
use gallery_storage::{DocumentLayout, S3DocumentBackend};
use uuid::Uuid;

const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Test context that provides an S3 client and a fresh bucket in LocalStack
pub struct S3TestContext {
    pub s3_client: Arc<S3Client>,
    pub bucket_name: String,
}

impl S3TestContext {
    /// Creates a new test context with a unique bucket
    pub async fn new(test_name: &str) -> Self {
        let bucket_name = format!("{test_name}-{}", Uuid::new_v4().simple());

        // Setup LocalStack client with hardcoded credentials for CI
        let credentials = Credentials::from_keys("test", "test", None);

        let config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(LOCALSTACK_ENDPOINT)
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .load()
            .await;

        // LocalStack serves buckets by path, not by subdomain
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .build();
        let s3_client = Arc::new(S3Client::from_conf(s3_config));

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

    /// Document backend over this context's bucket
    pub fn backend(&self, layout: DocumentLayout) -> S3DocumentBackend {
        S3DocumentBackend::new(self.s3_client.clone(), self.bucket_name.clone(), layout)
    }

    /// Writes an object directly, bypassing the backend
    pub async fn put_object(&self, key: &str, body: &[u8]) {
        self.s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(ByteStream::from(body.to_vec()))
            .send()
            .await
            .expect("Failed to put test object");
    }

    /// Reads an object directly, bypassing the backend
    pub async fn get_object(&self, key: &str) -> Vec<u8> {
        let response = self
            .s3_client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .expect("Failed to get test object");

        response
            .body
            .collect()
            .await
            .expect("Failed to read test object body")
            .into_bytes()
            .to_vec()
    }

    /// All keys in the bucket, sorted
    pub async fn keys(&self) -> Vec<String> {
        let response = self
            .s3_client
            .list_objects_v2()
            .bucket(&self.bucket_name)
            .send()
            .await
            .expect("Failed to list test bucket");

        let mut keys: Vec<String> = response
            .contents()
            .iter()
            .filter_map(|object| object.key())
            .map(ToString::to_string)
            .collect();
        keys.sort();
        keys
    }
}

impl Drop for S3TestContext {
    fn drop(&mut self) {
        // Clean up the bucket
        let client = self.s3_client.clone();
        let bucket_name = self.bucket_name.clone();

        // Use tokio runtime to empty and delete the bucket
        let handle = tokio::runtime::Handle::try_current();
        if let Ok(handle) = handle {
            handle.spawn(async move {
                if let Ok(listing) = client.list_objects_v2().bucket(&bucket_name).send().await {
                    for key in listing.contents().iter().filter_map(|object| object.key()) {
                        let _ = client
                            .delete_object()
                            .bucket(&bucket_name)
                            .key(key)
                            .send()
                            .await;
                    }
                }
                let _ = client.delete_bucket().bucket(&bucket_name).send().await;
            });
        }
    }
}
