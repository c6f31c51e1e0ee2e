//! Kayak gallery backend service
//!
//! Serves the gallery content store and the image upload endpoint used by the community
//! website's public gallery and admin pages.

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

/// Image upload validation and storage
pub mod media_storage;

/// HTTP routes
pub mod routes;

/// Server bootstrap
pub mod server;

/// Configuration, errors and extractors
pub mod types;
