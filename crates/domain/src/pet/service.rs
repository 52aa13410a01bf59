//! Pet service providing the listing use cases.

use std::sync::Arc;

use common::{OwnerId, Pet, PetId};
use pet_store::{Page, PageRequest, PetFilter, PetQuery, PetStore};
use saga::Orchestrator;

use crate::error::{PetError, Result};
use crate::picture::DEFAULT_MAX_PICTURE_BYTES;
use crate::storage::{StorageError, StorageProvider};

use super::steps::{CreatePetStep, SAGA_CREATE_PET, UploadPictureStep};
use super::{CreatePet, UpdatePet};

/// Service for managing lost-pet listings.
///
/// Creating a listing runs a two-step saga: the picture is uploaded first,
/// then the listing is inserted. If the insert fails the uploaded picture is
/// deleted again, so callers see either a complete listing or nothing.
#[derive(Clone)]
pub struct PetService<S: PetStore + Clone + 'static> {
    store: S,
    storage: Arc<dyn StorageProvider>,
    max_picture_bytes: usize,
}

impl<S: PetStore + Clone + 'static> PetService<S> {
    /// Creates a new pet service.
    pub fn new(store: S, storage: Arc<dyn StorageProvider>) -> Self {
        Self {
            store,
            storage,
            max_picture_bytes: DEFAULT_MAX_PICTURE_BYTES,
        }
    }

    /// Sets the largest picture accepted on creation.
    pub fn with_max_picture_bytes(mut self, max_picture_bytes: usize) -> Self {
        self.max_picture_bytes = max_picture_bytes;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn max_picture_bytes(&self) -> usize {
        self.max_picture_bytes
    }

    /// Publishes a new listing for `owner_id`.
    #[tracing::instrument(skip(self, cmd), fields(owner_id = %owner_id))]
    pub async fn create_pet(&self, owner_id: OwnerId, cmd: CreatePet) -> Result<Pet> {
        let validated = cmd.validate(owner_id, self.max_picture_bytes)?;
        let mut pet = validated.pet;

        let mut saga = Orchestrator::new(SAGA_CREATE_PET);
        saga.add_step(UploadPictureStep::new(
            validated.picture,
            self.storage.clone(),
        ))
        .add_step(CreatePetStep::new(self.store.clone()));

        let (result, report) = saga.run_with_report(&mut pet).await;
        if let Err(e) = result {
            tracing::warn!(
                pet_id = %pet.id,
                state = %report.state(),
                compensated = ?report.compensated_steps(),
                error = %e,
                "pet creation rolled back"
            );
            for (step, error) in report.compensation_failures() {
                tracing::error!(pet_id = %pet.id, step, error, "pet creation left residue behind");
            }
            return Err(e);
        }

        metrics::counter!("pets_created_total").increment(1);
        tracing::info!(pet_id = %pet.id, "pet created");
        Ok(pet)
    }

    /// Loads a listing.
    #[tracing::instrument(skip(self))]
    pub async fn get_pet(&self, id: PetId) -> Result<Pet> {
        self.store.get(id).await?.ok_or(PetError::NotFound(id))
    }

    /// Returns one page of listings matching `filter`.
    #[tracing::instrument(skip(self))]
    pub async fn search_pets(&self, filter: PetFilter, page: PageRequest) -> Result<Page<Pet>> {
        let query = PetQuery::new(filter, page);
        Ok(self.store.search(&query).await?)
    }

    /// Changes fields of a listing owned by `owner_id`.
    #[tracing::instrument(skip(self, cmd))]
    pub async fn update_pet(&self, owner_id: OwnerId, id: PetId, cmd: UpdatePet) -> Result<Pet> {
        let pet = self.owned_pet(owner_id, id, "You can only update your own pets").await?;

        let changes = cmd.to_changes(&pet)?;
        if changes.is_empty() {
            return Ok(pet);
        }

        let updated = self.store.update(id, &changes).await?;
        tracing::info!(pet_id = %id, "pet updated");
        Ok(updated)
    }

    /// Flags a listing owned by `owner_id` as found.
    #[tracing::instrument(skip(self))]
    pub async fn mark_found(&self, owner_id: OwnerId, id: PetId) -> Result<Pet> {
        self.owned_pet(owner_id, id, "You can only update your own pets").await?;

        let updated = self
            .store
            .mark_found(id)
            .await?
            .ok_or(PetError::AlreadyFound)?;
        tracing::info!(pet_id = %id, "pet marked as found");
        Ok(updated)
    }

    /// Deletes a listing owned by `owner_id` together with its picture.
    ///
    /// The picture goes first; if it cannot be deleted the listing is kept.
    #[tracing::instrument(skip(self))]
    pub async fn delete_pet(&self, owner_id: OwnerId, id: PetId) -> Result<()> {
        let pet = self.owned_pet(owner_id, id, "You can only delete your own pets").await?;

        if pet.has_picture() {
            match self.storage.delete(&pet.picture_url).await {
                Ok(()) => {}
                // Not issued by this provider, so there is nothing of ours to remove.
                Err(StorageError::InvalidLocator(locator)) => {
                    tracing::warn!(pet_id = %id, locator = %locator, "pet picture not managed by storage, skipping");
                }
                Err(e) => {
                    tracing::error!(pet_id = %id, error = %e, "pet picture delete failed");
                    return Err(PetError::Internal(
                        "Failed to delete pet picture".to_string(),
                    ));
                }
            }
        }

        self.store.delete(id).await?;
        tracing::info!(pet_id = %id, "pet deleted");
        Ok(())
    }

    async fn owned_pet(&self, owner_id: OwnerId, id: PetId, denied: &str) -> Result<Pet> {
        let pet = self.get_pet(id).await?;
        if !pet.is_owned_by(owner_id) {
            return Err(PetError::Forbidden(denied.to_string()));
        }
        Ok(pet)
    }
}
