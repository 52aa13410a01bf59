//! Domain layer for the pet finder service.
//!
//! This crate provides:
//! - Validation of listing commands against the pet and place catalog
//! - Picture payloads and the storage providers that hold them
//! - The pet creation saga (upload picture, then insert listing)
//! - `PetService` with the listing use cases
//! - `UserService` with registration, login and token checks

pub mod catalog;
pub mod error;
pub mod pet;
pub mod picture;
pub mod storage;
pub mod user;

pub use error::{FieldErrors, PetError, Result, UserError, UserResult};
pub use pet::{
    CreatePet, CreatePetStep, PetService, SAGA_CREATE_PET, STEP_CREATE_PET, STEP_UPLOAD_PICTURE,
    UpdatePet, UploadPictureStep, ValidatedPet,
};
pub use picture::{ALLOWED_CONTENT_TYPES, DEFAULT_MAX_PICTURE_BYTES, PictureUpload};
pub use storage::{InMemoryStorageProvider, LocalStorageProvider, StorageError, StorageProvider};
pub use user::{
    BcryptPasswordHasher, Claims, JwtTokenService, LoginUser, PasswordHasher, RegisterUser,
    Registration, TokenService, UserService,
};
