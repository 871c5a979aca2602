//! Error types for the ORM.

use softjoin_core::BuildError;
use thiserror::Error;

/// ORM-specific errors.
#[derive(Debug, Error)]
pub enum OrmError {
    /// Error from the underlying query builder, passed through as is.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// No model owns the joined table (strict mode only).
    #[error("no model found for table `{0}`")]
    ModelNotFound(String),

    /// An entity was registered twice under the same name and namespace.
    #[error("entity `{0}` is already registered")]
    DuplicateEntity(String),

    /// A custom resolution strategy failed.
    #[error("resolution strategy failed: {0}")]
    Strategy(String),
}

/// Result type alias for ORM operations.
pub type Result<T> = std::result::Result<T, OrmError>;
