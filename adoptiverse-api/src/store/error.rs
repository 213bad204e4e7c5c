//! Store error types.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Input failed required-field validation. Nothing was written.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The SQLite backend reported an error.
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migrations could not be applied.
    #[error("migration: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Internal error.
    #[error("internal: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn shelter_not_found(id: i64) -> Self {
        StoreError::NotFound(format!("Shelter '{}' not found", id))
    }

    pub fn pet_not_found(id: i64) -> Self {
        StoreError::NotFound(format!("Pet '{}' not found", id))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
