use std::path::PathBuf;

use axum::body::Bytes;
use tokio::fs;
use tracing::debug;

use super::{MediaBackend, MediaStorageError, MediaStorageResult};

/// URL prefix and subdirectory of the public directory used for uploads
pub const UPLOADS_DIR: &str = "uploads";

/// Images written to the `uploads` directory under a locally served public directory
pub struct LocalMediaBackend {
    uploads_dir: PathBuf,
}

impl LocalMediaBackend {
    /// Creates a backend writing to `{public_dir}/uploads`
    #[must_use]
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: public_dir.into().join(UPLOADS_DIR),
        }
    }
}

#[async_trait::async_trait]
impl MediaBackend for LocalMediaBackend {
    async fn exists(&self, key: &str) -> MediaStorageResult<bool> {
        fs::try_exists(self.uploads_dir.join(key))
            .await
            .map_err(|e| MediaStorageError::ReadError(format!("{key}: {e}")))
    }

    async fn put(
        &self,
        key: &str,
        _content_type: &str,
        bytes: Bytes,
        _sha256: &[u8],
    ) -> MediaStorageResult<()> {
        let path = self.uploads_dir.join(key);
        let write_error = |e: std::io::Error| MediaStorageError::WriteError(format!("{}: {e}", path.display()));

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(write_error)?;
        }
        fs::write(&path, &bytes).await.map_err(write_error)?;

        debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("/{UPLOADS_DIR}/{key}")
    }

    fn describe(&self) -> String {
        format!("file://{}", self.uploads_dir.display())
    }
}
