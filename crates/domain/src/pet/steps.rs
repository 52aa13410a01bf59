//! Steps of the pet creation saga.
//!
//! Both steps share the [`Pet`] being created: the upload step writes the
//! picture locator into it and the insert step persists it with that locator.
//! The upload must therefore be added to the saga before the insert.

use std::sync::Arc;

use async_trait::async_trait;
use common::Pet;
use pet_store::PetStore;
use saga::Step;

use crate::error::PetError;
use crate::picture::PictureUpload;
use crate::storage::StorageProvider;

/// Saga name used in logs and metrics.
pub const SAGA_CREATE_PET: &str = "create_pet";

pub const STEP_UPLOAD_PICTURE: &str = "upload_picture";
pub const STEP_CREATE_PET: &str = "create_pet";

/// Uploads the pet's picture and records its locator on the pet.
///
/// Compensation deletes the uploaded picture.
pub struct UploadPictureStep {
    picture: PictureUpload,
    storage: Arc<dyn StorageProvider>,
    locator: Option<String>,
}

impl UploadPictureStep {
    pub fn new(picture: PictureUpload, storage: Arc<dyn StorageProvider>) -> Self {
        Self {
            picture,
            storage,
            locator: None,
        }
    }

    /// Locator of the uploaded picture, once uploaded.
    pub fn locator(&self) -> Option<&str> {
        self.locator.as_deref()
    }
}

#[async_trait]
impl Step<Pet, PetError> for UploadPictureStep {
    fn name(&self) -> &'static str {
        STEP_UPLOAD_PICTURE
    }

    async fn execute(&mut self, pet: &mut Pet) -> Result<(), PetError> {
        let locator = self.storage.upload(&self.picture).await.map_err(|e| {
            tracing::error!(pet_id = %pet.id, error = %e, "picture upload failed");
            PetError::Internal("Failed to upload picture".to_string())
        })?;

        pet.picture_url = locator.clone();
        self.locator = Some(locator);
        Ok(())
    }

    async fn compensate(&mut self, pet: &mut Pet) -> Result<(), PetError> {
        let Some(locator) = self.locator.as_deref().filter(|l| !l.is_empty()) else {
            return Ok(());
        };

        self.storage.delete(locator).await.map_err(|e| {
            PetError::Internal(format!("Failed to delete picture {locator}: {e}"))
        })?;

        if pet.picture_url == locator {
            pet.picture_url.clear();
        }
        tracing::info!(pet_id = %pet.id, locator, "uploaded picture removed");
        self.locator = None;
        Ok(())
    }
}

/// Inserts the pet into the store.
///
/// Has no compensation: it is the last step of the creation saga, so nothing
/// after it can fail.
pub struct CreatePetStep<S: PetStore> {
    store: S,
    created: bool,
}

impl<S: PetStore> CreatePetStep<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            created: false,
        }
    }

    pub fn is_created(&self) -> bool {
        self.created
    }
}

#[async_trait]
impl<S> Step<Pet, PetError> for CreatePetStep<S>
where
    S: PetStore + 'static,
{
    fn name(&self) -> &'static str {
        STEP_CREATE_PET
    }

    async fn execute(&mut self, pet: &mut Pet) -> Result<(), PetError> {
        self.store.insert(pet).await.map_err(|e| {
            tracing::error!(pet_id = %pet.id, error = %e, "pet insert failed");
            PetError::Internal("Failed to create pet".to_string())
        })?;

        self.created = true;
        Ok(())
    }
}
