//! Read-modify-write access to the gallery document

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::{
    default_collection, DocumentBackend, GalleryEntry, GalleryEntryInput, GalleryStorageError,
    GalleryStorageResult,
};

/// What the backend currently holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    /// A parsed gallery document
    Stored(Vec<GalleryEntry>),
    /// Nothing has been persisted yet
    Empty,
}

impl Snapshot {
    /// The stored entries, or the default collection when the store is empty
    #[must_use]
    pub fn into_entries(self) -> Vec<GalleryEntry> {
        match self {
            Self::Stored(entries) => entries,
            Self::Empty => default_collection(),
        }
    }
}

/// The gallery content store
///
/// Every mutation loads the whole collection, changes it and writes it back. Mutations are
/// serialized within this process. Writers in other processes sharing the same backend can
/// still overwrite each other (last writer wins).
pub struct GalleryStore {
    backend: Arc<dyn DocumentBackend>,
    write_lock: Mutex<()>,
    seed_on_empty: bool,
}

impl GalleryStore {
    /// Creates a store over the given backend
    #[must_use]
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
            seed_on_empty: false,
        }
    }

    /// Persist the default collection the first time an empty store is read
    #[must_use]
    pub fn with_seed_on_empty(mut self, seed_on_empty: bool) -> Self {
        self.seed_on_empty = seed_on_empty;
        self
    }

    /// Human readable location of the underlying document
    #[must_use]
    pub fn describe(&self) -> String {
        self.backend.describe()
    }

    /// Loads and classifies the persisted document
    ///
    /// # Errors
    ///
    /// Returns `GalleryStorageError::ReadError` if the backend cannot be read
    /// Returns `GalleryStorageError::CorruptDocument` if the document is not a gallery array
    pub async fn load(&self) -> GalleryStorageResult<Snapshot> {
        let Some(document) = self.backend.load().await? else {
            return Ok(Snapshot::Empty);
        };

        let entries = serde_json::from_slice(&document)
            .map_err(|e| GalleryStorageError::CorruptDocument(e.to_string()))?;
        Ok(Snapshot::Stored(entries))
    }

    /// Returns the current collection in insertion order
    ///
    /// Never fails: an empty, unreadable or corrupt store yields the default collection. The
    /// failure is logged with its classification.
    #[instrument(skip(self))]
    pub async fn read_all(&self) -> Vec<GalleryEntry> {
        match self.load().await {
            Ok(Snapshot::Stored(entries)) => entries,
            Ok(Snapshot::Empty) => {
                if self.seed_on_empty {
                    self.seed_default().await;
                }
                default_collection()
            }
            Err(e @ GalleryStorageError::CorruptDocument(_)) => {
                warn!(kind = e.kind(), "Serving default gallery: {e}");
                default_collection()
            }
            Err(e) => {
                error!(kind = e.kind(), "Serving default gallery: {e}");
                default_collection()
            }
        }
    }

    /// Appends a new entry with a freshly assigned id
    ///
    /// # Errors
    ///
    /// Returns `GalleryStorageError::WriteError` if the updated collection is not saved
    /// Returns `GalleryStorageError::ReadError` or `CorruptDocument` if the current collection
    /// cannot be loaded; a damaged document is never overwritten
    /// Returns `GalleryStorageError::CorruptDocument` if the stored ids leave no larger id
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn add(&self, input: GalleryEntryInput) -> GalleryStorageResult<GalleryEntry> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.load().await?.into_entries();
        let id = next_id(&entries, Utc::now().timestamp_millis()).ok_or_else(|| {
            GalleryStorageError::CorruptDocument("gallery id space exhausted".to_string())
        })?;
        let entry = input.into_entry(id);
        entries.push(entry.clone());

        self.persist(&entries).await.inspect_err(|e| {
            error!(kind = e.kind(), "Failed to add gallery entry: {e}");
        })?;

        info!(id = entry.id, "Added gallery entry");
        Ok(entry)
    }

    /// Removes every entry with the given id and returns how many were removed
    ///
    /// The filtered collection is saved even when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns `GalleryStorageError::WriteError` if the filtered collection is not saved
    /// Returns `GalleryStorageError::ReadError` or `CorruptDocument` if the current collection
    /// cannot be loaded
    #[instrument(skip(self))]
    pub async fn remove(&self, id: i64) -> GalleryStorageResult<usize> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.load().await?.into_entries();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = before - entries.len();

        self.persist(&entries).await.inspect_err(|e| {
            error!(kind = e.kind(), "Failed to remove gallery entry: {e}");
        })?;

        info!(removed, "Removed gallery entry");
        Ok(removed)
    }

    async fn seed_default(&self) {
        let _guard = self.write_lock.lock().await;

        // Another request may have written while we waited for the lock
        if !matches!(self.load().await, Ok(Snapshot::Empty)) {
            return;
        }

        match self.persist(&default_collection()).await {
            Ok(()) => info!("Seeded default gallery at {}", self.backend.describe()),
            Err(e) => warn!(kind = e.kind(), "Failed to seed default gallery: {e}"),
        }
    }

    async fn persist(&self, entries: &[GalleryEntry]) -> GalleryStorageResult<()> {
        let document = serde_json::to_vec_pretty(entries)
            .map_err(|e| GalleryStorageError::SerializationError(e.to_string()))?;
        self.backend.save(document).await
    }
}

/// Millisecond timestamp, bumped past the largest existing id
///
/// `None` when the largest existing id is `i64::MAX`.
fn next_id(entries: &[GalleryEntry], now_millis: i64) -> Option<i64> {
    entries
        .iter()
        .map(|entry| entry.id)
        .max()
        .map_or(Some(now_millis), |max_id| {
            max_id.checked_add(1).map(|floor| floor.max(now_millis))
        })
}
