//! Domain error types.

use std::collections::BTreeMap;

use common::PetId;
use pet_store::StoreError;
use thiserror::Error;

/// Field name to human-readable message, ordered by field name.
pub type FieldErrors = BTreeMap<String, String>;

/// Errors that can occur in pet use cases.
#[derive(Debug, Error)]
pub enum PetError {
    /// The request did not pass validation.
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// No pet exists with the given ID.
    #[error("Pet not found: {0}")]
    NotFound(PetId),

    /// The caller may not act on this pet.
    #[error("{0}")]
    Forbidden(String),

    /// The pet has already been marked as found.
    #[error("Pet already marked as found")]
    AlreadyFound,

    /// An operation failed for reasons the caller cannot fix.
    ///
    /// The message is safe to show to clients; the cause is logged where it
    /// happened.
    #[error("{0}")]
    Internal(String),

    /// An error occurred in the pet store.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for PetError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => PetError::NotFound(id),
            other => PetError::Store(other),
        }
    }
}

impl PetError {
    /// Builds a validation error for a single field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.into(), message.into());
        PetError::Validation(fields)
    }

    /// Returns the field errors if this is a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            PetError::Validation(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Result type for pet use cases.
pub type Result<T> = std::result::Result<T, PetError>;

/// Errors that can occur in registration, login and token checks.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Already exists user with email {0}")]
    EmailTaken(String),

    /// Unknown email or wrong password. The two are not told apart.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    Internal(String),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for UserError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail(email) => UserError::EmailTaken(email),
            other => UserError::Store(other),
        }
    }
}

/// Result type for user use cases.
pub type UserResult<T> = std::result::Result<T, UserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_field_error() {
        let err = PetError::field("name", "Name is required");
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["name"], "Name is required");
    }

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let id = PetId::new();
        let err = PetError::from(StoreError::NotFound(id));
        assert!(matches!(err, PetError::NotFound(found) if found == id));

        let err = PetError::from(StoreError::Unavailable("down".to_string()));
        assert!(matches!(err, PetError::Store(_)));
    }

    #[test]
    fn test_duplicate_email_maps_to_email_taken() {
        let err = UserError::from(StoreError::DuplicateEmail("ana@example.com".to_string()));
        assert_eq!(
            err.to_string(),
            "Already exists user with email ana@example.com"
        );
    }

    #[test]
    fn test_internal_message_is_displayed_verbatim() {
        let err = PetError::Internal("Failed to upload picture".to_string());
        assert_eq!(err.to_string(), "Failed to upload picture");
        assert!(err.field_errors().is_none());
    }
}
