use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use backend::{
    media_storage::{LocalMediaBackend, MediaBackend, MediaStorage, S3MediaBackend, UPLOADS_DIR},
    server,
    types::{Environment, StorageBackendKind},
};
use gallery_storage::{DocumentBackend, GalleryStore, LocalFileBackend, S3DocumentBackend};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.tracing_level().to_string()));

    // Use JSON format for staging/production (Datadog), regular format for development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt().json().with_env_filter(env_filter).init();
        }
        Environment::Development => {
            fmt().with_env_filter(env_filter).init();
        }
    }

    let (document_backend, media_backend, uploads_dir) = match environment.storage_backend() {
        StorageBackendKind::Local => {
            let public_dir = environment.public_dir();
            (
                Arc::new(LocalFileBackend::new(environment.gallery_data_path()))
                    as Arc<dyn DocumentBackend>,
                Arc::new(LocalMediaBackend::new(&public_dir)) as Arc<dyn MediaBackend>,
                Some(public_dir.join(UPLOADS_DIR)),
            )
        }
        StorageBackendKind::S3 => {
            let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
            let bucket_name = environment.s3_bucket();
            (
                Arc::new(S3DocumentBackend::new(
                    s3_client.clone(),
                    bucket_name.clone(),
                    environment.gallery_layout(),
                )) as Arc<dyn DocumentBackend>,
                Arc::new(S3MediaBackend::new(
                    s3_client,
                    bucket_name,
                    environment.public_base_url(),
                )) as Arc<dyn MediaBackend>,
                None,
            )
        }
    };

    let gallery_store = Arc::new(
        GalleryStore::new(document_backend)
            .with_seed_on_empty(environment.seed_default_gallery()),
    );
    let media_storage = Arc::new(MediaStorage::new(
        media_backend,
        environment.max_upload_bytes(),
        environment.upload_naming(),
    ));

    tracing::info!(
        "Gallery data at {}, images at {} (max {} bytes)",
        gallery_store.describe(),
        media_storage.describe(),
        media_storage.max_upload_bytes()
    );

    server::start(environment, gallery_store, media_storage, uploads_dir).await
}
