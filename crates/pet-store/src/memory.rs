use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    Page, Pet, PetChanges, PetId, PetQuery, Result, SortDirection, StoreError, store::PetStore,
};

/// In-memory pet store.
///
/// Used for tests and for running the server without a database. Provides the
/// same behaviour as the PostgreSQL implementation, plus a switch to make
/// inserts fail so callers can exercise their rollback paths.
#[derive(Clone, Default)]
pub struct InMemoryPetStore {
    pets: Arc<RwLock<HashMap<PetId, Pet>>>,
    fail_on_insert: Arc<AtomicBool>,
}

impl InMemoryPetStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures subsequent inserts to fail.
    pub fn set_fail_on_insert(&self, fail: bool) {
        self.fail_on_insert.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored pets.
    pub async fn pet_count(&self) -> usize {
        self.pets.read().await.len()
    }

    /// Removes every pet.
    pub async fn clear(&self) {
        self.pets.write().await.clear();
    }
}

#[async_trait]
impl PetStore for InMemoryPetStore {
    async fn insert(&self, pet: &Pet) -> Result<()> {
        if self.fail_on_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("insert rejected".to_string()));
        }

        let mut pets = self.pets.write().await;
        if pets.contains_key(&pet.id) {
            return Err(StoreError::Unavailable(format!(
                "pet {} already exists",
                pet.id
            )));
        }
        pets.insert(pet.id, pet.clone());
        Ok(())
    }

    async fn get(&self, id: PetId) -> Result<Option<Pet>> {
        Ok(self.pets.read().await.get(&id).cloned())
    }

    async fn search(&self, query: &PetQuery) -> Result<Page<Pet>> {
        let pets = self.pets.read().await;

        let mut matching: Vec<Pet> = pets
            .values()
            .filter(|pet| query.filter.matches(pet))
            .cloned()
            .collect();

        matching.sort_by(|a, b| match query.page.sort_dir {
            SortDirection::Asc => a.created_at.cmp(&b.created_at),
            SortDirection::Desc => b.created_at.cmp(&a.created_at),
        });

        let total = matching.len() as u64;
        let offset = usize::try_from(query.page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.page.limit()).unwrap_or(usize::MAX);
        let data: Vec<Pet> = matching.into_iter().skip(offset).take(limit).collect();

        Ok(Page::new(data, total, &query.page))
    }

    async fn update(&self, id: PetId, changes: &PetChanges) -> Result<Pet> {
        let mut pets = self.pets.write().await;
        let pet = pets.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        changes.apply_to(pet);
        Ok(pet.clone())
    }

    async fn mark_found(&self, id: PetId) -> Result<Option<Pet>> {
        let mut pets = self.pets.write().await;
        let pet = pets.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if pet.is_found {
            return Ok(None);
        }
        PetChanges::mark_found().apply_to(pet);
        Ok(Some(pet.clone()))
    }

    async fn delete(&self, id: PetId) -> Result<()> {
        self.pets
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
