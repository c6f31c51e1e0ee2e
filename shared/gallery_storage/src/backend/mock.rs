//! In-memory document backend for tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::DocumentBackend;
use crate::{GalleryStorageError, GalleryStorageResult};

/// Document held in memory, with switches to simulate backend failures
#[derive(Default)]
pub struct MemoryBackend {
    document: Mutex<Option<Vec<u8>>>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryBackend {
    /// Creates an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that already holds `document`
    #[must_use]
    pub fn with_document(document: impl Into<Vec<u8>>) -> Self {
        let backend = Self::default();
        backend.set_document(document);
        backend
    }

    /// Replaces the stored bytes, valid or not
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn set_document(&self, document: impl Into<Vec<u8>>) {
        *self.document.lock().expect("document lock poisoned") = Some(document.into());
    }

    /// Currently stored bytes
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    #[must_use]
    pub fn document(&self) -> Option<Vec<u8>> {
        self.document.lock().expect("document lock poisoned").clone()
    }

    /// Makes every subsequent load fail
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent save fail
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DocumentBackend for MemoryBackend {
    async fn load(&self) -> GalleryStorageResult<Option<Vec<u8>>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(GalleryStorageError::ReadError(
                "simulated read failure".to_string(),
            ));
        }
        Ok(self.document())
    }

    async fn save(&self, document: Vec<u8>) -> GalleryStorageResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(GalleryStorageError::WriteError(
                "simulated write failure".to_string(),
            ));
        }
        self.set_document(document);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
