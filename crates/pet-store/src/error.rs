use thiserror::Error;

use crate::PetId;

/// Errors that can occur when interacting with the pet or user store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No pet exists with the given ID.
    #[error("Pet not found: {0}")]
    NotFound(PetId),

    /// Another user already registered this email.
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// The backend refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for pet store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
