//! Error types for the transaction helpers.

use thiserror::Error;

/// Result type alias using the crate's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by providers and the unit registry.
#[derive(Debug, Error)]
pub enum Error {
    /// Error from the underlying pool or connection.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem error while preparing a database location.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A unit with this name is already registered.
    #[error("unit {0:?} is already initialized")]
    AlreadyInitialized(String),

    /// No unit with this name is registered.
    #[error("unit {0:?} is not initialized")]
    UnknownUnit(String),

    /// A transaction closure requested a rollback.
    #[error("transaction aborted: {0}")]
    Aborted(String),
}

impl Error {
    /// True for sqlx's no-rows marker.
    pub(crate) fn is_row_not_found(&self) -> bool {
        matches!(self, Self::Database(sqlx::Error::RowNotFound))
    }
}
