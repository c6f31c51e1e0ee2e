use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use super::DocumentBackend;
use crate::{GalleryStorageError, GalleryStorageResult};

/// Gallery document stored in a single file on the local filesystem
pub struct LocalFileBackend {
    path: PathBuf,
}

impl LocalFileBackend {
    /// Creates a backend for the document at `path`
    ///
    /// The parent directory is created on the first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the document
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait::async_trait]
impl DocumentBackend for LocalFileBackend {
    async fn load(&self) -> GalleryStorageResult<Option<Vec<u8>>> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No gallery document at {}", self.path.display());
                Ok(None)
            }
            Err(e) => Err(GalleryStorageError::ReadError(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn save(&self, document: Vec<u8>) -> GalleryStorageResult<()> {
        let write_error =
            |e: std::io::Error| GalleryStorageError::WriteError(format!("{}: {e}", self.path.display()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_error)?;
        }

        // Rename over the target so readers never see a partial document
        let temp_path = self.temp_path();
        fs::write(&temp_path, document).await.map_err(write_error)?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(write_error)?;

        debug!("Saved gallery document to {}", self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }
}
