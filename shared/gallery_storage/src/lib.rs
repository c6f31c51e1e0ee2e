//! Gallery content storage
//!
//! This crate owns the gallery document: a single JSON array of [`GalleryEntry`] values that is
//! read in full and rewritten in full on every mutation. The document lives behind a
//! [`DocumentBackend`], either a local file or an S3 bucket.

#![deny(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]

pub mod backend;
mod entry;
mod error;
mod store;

pub use backend::{DocumentBackend, DocumentLayout, LocalFileBackend, S3DocumentBackend};
pub use entry::{default_collection, GalleryEntry, GalleryEntryInput};
pub use error::{GalleryStorageError, GalleryStorageResult};
pub use store::{GalleryStore, Snapshot};
