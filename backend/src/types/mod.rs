mod environment;
pub mod error;
pub mod extractors;

pub use environment::{Environment, StorageBackendKind};
pub use error::AppError;
pub use extractors::ValidatedJson;
