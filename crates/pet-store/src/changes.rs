//! Partial updates to a stored pet.

use chrono::{NaiveDate, Utc};

use crate::Pet;

/// Field-level changes to apply to an existing pet. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetChanges {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub breed: Option<String>,
    pub last_seen_time: Option<NaiveDate>,
    pub last_seen_place: Option<String>,
    pub is_found: Option<bool>,
}

impl PetChanges {
    /// Creates an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change set that only flags the pet as found.
    pub fn mark_found() -> Self {
        Self {
            is_found: Some(true),
            ..Default::default()
        }
    }

    /// Returns true if no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.kind.is_none()
            && self.breed.is_none()
            && self.last_seen_time.is_none()
            && self.last_seen_place.is_none()
            && self.is_found.is_none()
    }

    /// Applies the changes in place and bumps `updated_at` if anything changed.
    pub fn apply_to(&self, pet: &mut Pet) {
        if self.is_empty() {
            return;
        }
        if let Some(ref name) = self.name {
            pet.name = name.clone();
        }
        if let Some(ref kind) = self.kind {
            pet.kind = kind.clone();
        }
        if let Some(ref breed) = self.breed {
            pet.breed = breed.clone();
        }
        if let Some(last_seen_time) = self.last_seen_time {
            pet.last_seen_time = last_seen_time;
        }
        if let Some(ref place) = self.last_seen_place {
            pet.last_seen_place = place.clone();
        }
        if let Some(is_found) = self.is_found {
            pet.is_found = is_found;
        }
        pet.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OwnerId, PetId};

    fn pet() -> Pet {
        let created = Utc::now() - chrono::Duration::hours(1);
        Pet {
            id: PetId::new(),
            owner_id: OwnerId::new(),
            name: "Toby".to_string(),
            description: "Brown dog".to_string(),
            kind: "dog".to_string(),
            breed: "Beagle".to_string(),
            last_seen_time: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            last_seen_place: "Córdoba, Córdoba".to_string(),
            is_found: false,
            picture_url: String::new(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn empty_changes_leave_pet_untouched() {
        let mut p = pet();
        let before = p.clone();
        PetChanges::new().apply_to(&mut p);
        assert_eq!(p, before);
    }

    #[test]
    fn mark_found_only_touches_flag() {
        let mut p = pet();
        let before = p.clone();
        PetChanges::mark_found().apply_to(&mut p);
        assert!(p.is_found);
        assert_eq!(p.name, before.name);
        assert!(p.updated_at > before.updated_at);
    }

    #[test]
    fn applies_set_fields() {
        let mut p = pet();
        let changes = PetChanges {
            name: Some("Max".to_string()),
            breed: Some("Labrador".to_string()),
            ..Default::default()
        };
        changes.apply_to(&mut p);
        assert_eq!(p.name, "Max");
        assert_eq!(p.breed, "Labrador");
        assert_eq!(p.kind, "dog");
    }
}
