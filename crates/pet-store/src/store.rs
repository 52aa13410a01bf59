use async_trait::async_trait;

use crate::{Page, Pet, PetChanges, PetId, PetQuery, Result};

/// Core trait for pet persistence backends.
///
/// Implementations must be safe to share across concurrent requests; the
/// callers never coordinate access themselves.
#[async_trait]
pub trait PetStore: Send + Sync {
    /// Inserts a new pet.
    async fn insert(&self, pet: &Pet) -> Result<()>;

    /// Loads a pet by ID. Returns None if it does not exist.
    async fn get(&self, id: PetId) -> Result<Option<Pet>>;

    /// Returns one page of pets matching the query, ordered by `created_at`.
    async fn search(&self, query: &PetQuery) -> Result<Page<Pet>>;

    /// Applies changes to an existing pet and returns the updated record.
    ///
    /// Fails with `StoreError::NotFound` if the pet does not exist.
    async fn update(&self, id: PetId, changes: &PetChanges) -> Result<Pet>;

    /// Flags a pet as found, unless it already is.
    ///
    /// Returns the updated record, or None if the pet was already found. The
    /// check and the write are atomic. Fails with `StoreError::NotFound` if
    /// the pet does not exist.
    async fn mark_found(&self, id: PetId) -> Result<Option<Pet>>;

    /// Deletes a pet.
    ///
    /// Fails with `StoreError::NotFound` if the pet does not exist.
    async fn delete(&self, id: PetId) -> Result<()>;
}
