//! Environment configuration for different deployment stages

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use gallery_storage::DocumentLayout;
use strum::{Display, EnumString};
use tracing::Level;

use crate::media_storage::FileNaming;

/// Default cap when images go to S3
const S3_MAX_UPLOAD_BYTES: usize = 1024 * 1024;
/// Default cap when images go to the local public directory
const LOCAL_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_RETAINED_REVISIONS: usize = 2;
const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Where gallery documents and uploaded images are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageBackendKind {
    /// Local filesystem (document file + public directory)
    Local,
    /// S3 bucket
    S3,
}

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (local files, `LocalStack` for S3)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Storage backend for the gallery document and uploaded images
    ///
    /// # Panics
    ///
    /// Panics if `STORAGE_BACKEND` is set to something other than `local` or `s3`
    #[must_use]
    pub fn storage_backend(&self) -> StorageBackendKind {
        env::var("STORAGE_BACKEND").map_or_else(
            |_| match self {
                Self::Production | Self::Staging => StorageBackendKind::S3,
                Self::Development => StorageBackendKind::Local,
            },
            |val| {
                val.trim()
                    .parse()
                    .unwrap_or_else(|_| panic!("Invalid STORAGE_BACKEND: {val}"))
            },
        )
    }

    /// Path of the gallery document for the local backend
    #[must_use]
    pub fn gallery_data_path(&self) -> PathBuf {
        env::var("GALLERY_DATA_PATH").map_or_else(|_| PathBuf::from("data/gallery.json"), PathBuf::from)
    }

    /// Layout of the gallery document in the S3 bucket
    ///
    /// # Panics
    ///
    /// Panics if `GALLERY_DATA_LAYOUT` is set to something other than `fixed` or `rotated`
    #[must_use]
    pub fn gallery_layout(&self) -> DocumentLayout {
        let layout = env::var("GALLERY_DATA_LAYOUT")
            .unwrap_or_else(|_| "rotated".to_string())
            .trim()
            .to_lowercase();

        match layout.as_str() {
            "fixed" => DocumentLayout::FixedKey {
                key: env::var("GALLERY_DATA_KEY")
                    .unwrap_or_else(|_| "gallery-data.json".to_string()),
            },
            "rotated" => DocumentLayout::Rotated {
                prefix: env::var("GALLERY_DATA_PREFIX")
                    .unwrap_or_else(|_| "gallery-data-".to_string()),
                retain: env::var("GALLERY_RETAINED_REVISIONS")
                    .ok()
                    .and_then(|val| val.parse::<usize>().ok())
                    .unwrap_or(DEFAULT_RETAINED_REVISIONS)
                    .max(1),
            },
            _ => panic!("Invalid GALLERY_DATA_LAYOUT: {layout}"),
        }
    }

    /// Whether the default collection is written on the first read of an empty store
    #[must_use]
    pub fn seed_default_gallery(&self) -> bool {
        env::var("GALLERY_SEED_DEFAULT")
            .map(|val| matches!(val.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false)
    }

    /// Directory served under `/uploads` when images are stored locally
    #[must_use]
    pub fn public_dir(&self) -> PathBuf {
        env::var("PUBLIC_DIR").map_or_else(|_| PathBuf::from("public"), PathBuf::from)
    }

    /// Largest accepted image, in bytes
    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .filter(|bytes| *bytes > 0)
            .unwrap_or(match self.storage_backend() {
                StorageBackendKind::S3 => S3_MAX_UPLOAD_BYTES,
                StorageBackendKind::Local => LOCAL_MAX_UPLOAD_BYTES,
            })
    }

    /// How uploaded files are named
    ///
    /// # Panics
    ///
    /// Panics if `UPLOAD_NAMING` is set to something other than `timestamp` or `content`
    #[must_use]
    pub fn upload_naming(&self) -> FileNaming {
        env::var("UPLOAD_NAMING").map_or(FileNaming::Timestamp, |val| {
            val.trim()
                .parse()
                .unwrap_or_else(|_| panic!("Invalid UPLOAD_NAMING: {val}"))
        })
    }

    /// Returns the S3 bucket name for the environment
    ///
    /// # Panics
    ///
    /// Panics if the `S3_BUCKET_NAME` environment variable is not set in staging or production
    #[must_use]
    pub fn s3_bucket(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("S3_BUCKET_NAME").expect("S3_BUCKET_NAME environment variable is not set")
            }
            Self::Development => {
                env::var("S3_BUCKET_NAME").unwrap_or_else(|_| "kayak-gallery".to_string())
            }
        }
    }

    /// Base URL under which uploaded S3 objects are publicly reachable
    #[must_use]
    pub fn public_base_url(&self) -> String {
        let base = env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| {
            let bucket = self.s3_bucket();
            match self.override_aws_endpoint_url() {
                // LocalStack only supports path-style addressing
                Some(endpoint) => format!("{endpoint}/{bucket}"),
                None => format!("https://{bucket}.s3.amazonaws.com"),
            }
        });
        base.trim_end_matches('/').to_string()
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development | Self::Staging)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            Self::Production | Self::Staging => None,
            Self::Development => Some(LOCALSTACK_ENDPOINT),
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// Log level used when `RUST_LOG` is not set
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development => Level::DEBUG,
            })
    }
}
