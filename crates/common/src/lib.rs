//! Shared types for the pet-finder backend.

pub mod pet;
pub mod types;
pub mod user;

pub use pet::Pet;
pub use types::{OwnerId, PetId};
pub use user::User;
