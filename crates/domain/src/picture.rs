//! Uploaded picture payloads.

use crate::error::{FieldErrors, PetError};

/// Largest picture accepted by default (10 MiB).
pub const DEFAULT_MAX_PICTURE_BYTES: usize = 10 * 1024 * 1024;

/// Content types accepted for pet pictures.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// A picture received from a client, held in memory until it is stored.
#[derive(Clone, PartialEq, Eq)]
pub struct PictureUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PictureUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File extension, without the dot, for the declared content type.
    ///
    /// The client's file name is ignored so stored objects can only carry an
    /// image extension.
    pub fn extension(&self) -> &'static str {
        match self.essence().as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "bin",
        }
    }

    /// Content type without parameters, lower-cased.
    fn essence(&self) -> String {
        self.content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    /// Collects picture problems into `errors` under the `picture` field.
    pub fn validate_into(&self, max_bytes: usize, errors: &mut FieldErrors) {
        let message = if !ALLOWED_CONTENT_TYPES.contains(&self.essence().as_str()) {
            "Invalid file type. Only images are allowed".to_string()
        } else if self.is_empty() {
            "Picture is empty".to_string()
        } else if self.len() > max_bytes {
            format!(
                "File too large. Maximum size is {}MB",
                max_bytes / (1024 * 1024)
            )
        } else {
            return;
        };
        errors.insert("picture".to_string(), message);
    }

    /// Validates the picture on its own.
    pub fn validate(&self, max_bytes: usize) -> Result<(), PetError> {
        let mut errors = FieldErrors::new();
        self.validate_into(max_bytes, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PetError::Validation(errors))
        }
    }
}

// Payloads can be megabytes; only show their size.
impl std::fmt::Debug for PictureUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PictureUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
