//! Lost-pet listings.

pub mod commands;
pub mod service;
pub mod steps;

pub use commands::{CreatePet, DATE_FORMAT, UpdatePet, ValidatedPet, parse_date};
pub use service::PetService;
pub use steps::{
    CreatePetStep, SAGA_CREATE_PET, STEP_CREATE_PET, STEP_UPLOAD_PICTURE, UploadPictureStep,
};
