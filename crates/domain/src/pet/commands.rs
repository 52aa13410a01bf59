//! Pet commands and their validation.

use chrono::{NaiveDate, Utc};
use common::{OwnerId, Pet, PetId};
use pet_store::PetChanges;
use serde::Deserialize;

use crate::catalog;
use crate::error::{FieldErrors, PetError};
use crate::picture::PictureUpload;

/// Date format used by clients for `last_seen_time`.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

const INVALID_DATE: &str = "Invalid date format. Expected format: dd-mm-yyyy";

/// Parses a `dd-mm-yyyy` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Command to publish a new lost-pet listing.
#[derive(Debug, Clone, Default)]
pub struct CreatePet {
    pub name: String,
    pub description: String,
    pub kind: String,
    pub breed: String,
    /// Date the pet was last seen, as `dd-mm-yyyy`.
    pub last_seen_time: String,
    pub last_seen_province: String,
    pub last_seen_city: String,
    pub picture: Option<PictureUpload>,
}

/// A [`CreatePet`] that passed validation.
#[derive(Debug)]
pub struct ValidatedPet {
    /// The listing to insert, with an empty picture locator.
    pub pet: Pet,
    pub picture: PictureUpload,
}

impl CreatePet {
    /// Checks every field and builds the listing for `owner_id`.
    ///
    /// All problems are reported together.
    pub fn validate(
        self,
        owner_id: OwnerId,
        max_picture_bytes: usize,
    ) -> Result<ValidatedPet, PetError> {
        let mut errors = FieldErrors::new();

        require(&mut errors, "name", &self.name, "Name is required");
        require(
            &mut errors,
            "description",
            &self.description,
            "Description is required",
        );

        if self.kind.trim().is_empty() {
            errors.insert("type".to_string(), "Type is required".to_string());
        } else if !catalog::is_valid_type(&self.kind) {
            errors.insert("type".to_string(), invalid_type_message());
        }

        if self.breed.trim().is_empty() {
            errors.insert("breed".to_string(), "Breed is required".to_string());
        } else if let Some(breeds) = catalog::breeds_for(&self.kind) {
            if !breeds.contains(&self.breed.as_str()) {
                errors.insert("breed".to_string(), invalid_breed_message(breeds));
            }
        }

        let last_seen_time = if self.last_seen_time.trim().is_empty() {
            errors.insert(
                "last_seen_time".to_string(),
                "Last seen time is required".to_string(),
            );
            None
        } else {
            let parsed = parse_date(&self.last_seen_time);
            if parsed.is_none() {
                errors.insert("last_seen_time".to_string(), INVALID_DATE.to_string());
            }
            parsed
        };

        validate_place(
            &mut errors,
            &self.last_seen_province,
            &self.last_seen_city,
        );

        match &self.picture {
            None => {
                errors.insert("picture".to_string(), "Picture is required".to_string());
            }
            Some(picture) => picture.validate_into(max_picture_bytes, &mut errors),
        }

        match (last_seen_time, self.picture) {
            (Some(last_seen_time), Some(picture)) if errors.is_empty() => {
                let now = Utc::now();
                let pet = Pet {
                    id: PetId::new(),
                    owner_id,
                    name: self.name.trim().to_string(),
                    description: self.description.trim().to_string(),
                    kind: self.kind,
                    breed: self.breed,
                    last_seen_time,
                    last_seen_place: catalog::place(&self.last_seen_province, &self.last_seen_city),
                    is_found: false,
                    picture_url: String::new(),
                    created_at: now,
                    updated_at: now,
                };
                Ok(ValidatedPet { pet, picture })
            }
            _ => Err(PetError::Validation(errors)),
        }
    }
}

/// Command to change fields of an existing listing. Unset fields are kept.
///
/// The picture is not editable here: it is only set by the creation saga.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePet {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub breed: Option<String>,
    pub last_seen_time: Option<String>,
    pub last_seen_province: Option<String>,
    pub last_seen_city: Option<String>,
    pub is_found: Option<bool>,
}

impl UpdatePet {
    /// Validates the update against the pet's current state and returns the
    /// changes to store.
    pub fn to_changes(&self, current: &Pet) -> Result<PetChanges, PetError> {
        let mut errors = FieldErrors::new();
        let mut changes = PetChanges::new();

        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                errors.insert("name".to_string(), "Name cannot be empty".to_string());
            } else {
                changes.name = Some(name.trim().to_string());
            }
        }

        if let Some(kind) = &self.kind {
            if catalog::is_valid_type(kind) {
                changes.kind = Some(kind.clone());
            } else {
                errors.insert("type".to_string(), invalid_type_message());
            }
        }

        // Breed is checked against the type the pet will have after the update.
        let effective_kind = self.kind.as_deref().unwrap_or(&current.kind);
        if let Some(breed) = &self.breed {
            match catalog::breeds_for(effective_kind) {
                Some(breeds) if breeds.contains(&breed.as_str()) => {
                    changes.breed = Some(breed.clone());
                }
                Some(breeds) => {
                    errors.insert("breed".to_string(), invalid_breed_message(breeds));
                }
                None if self.kind.is_some() => {
                    // Already reported on `type`.
                }
                None => {
                    errors.insert("breed".to_string(), "Invalid breed for this type".to_string());
                }
            }
        } else if let Some(kind) = &self.kind {
            if catalog::is_valid_type(kind) && !catalog::is_valid_breed(kind, &current.breed) {
                errors.insert(
                    "breed".to_string(),
                    "Breed must be updated together with the type".to_string(),
                );
            }
        }

        if let Some(value) = &self.last_seen_time {
            match parse_date(value) {
                Some(date) => changes.last_seen_time = Some(date),
                None => {
                    errors.insert("last_seen_time".to_string(), INVALID_DATE.to_string());
                }
            }
        }

        match (&self.last_seen_province, &self.last_seen_city) {
            (Some(province), Some(city)) => {
                if validate_place(&mut errors, province, city) {
                    changes.last_seen_place = Some(catalog::place(province, city));
                }
            }
            (Some(_), None) => {
                errors.insert(
                    "last_seen_city".to_string(),
                    "City is required when province is given".to_string(),
                );
            }
            (None, Some(_)) => {
                errors.insert(
                    "last_seen_province".to_string(),
                    "Province is required when city is given".to_string(),
                );
            }
            (None, None) => {}
        }

        changes.is_found = self.is_found;

        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(PetError::Validation(errors))
        }
    }
}

fn require(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field.to_string(), message.to_string());
    }
}

/// Records province and city problems. Returns true if both are valid.
fn validate_place(errors: &mut FieldErrors, province: &str, city: &str) -> bool {
    let before = errors.len();

    if province.trim().is_empty() {
        errors.insert(
            "last_seen_province".to_string(),
            "Province is required".to_string(),
        );
    } else if !catalog::is_valid_province(province) {
        errors.insert(
            "last_seen_province".to_string(),
            "Invalid province".to_string(),
        );
    }

    if city.trim().is_empty() {
        errors.insert("last_seen_city".to_string(), "City is required".to_string());
    } else if catalog::is_valid_province(province) && !catalog::is_valid_city(province, city) {
        errors.insert(
            "last_seen_city".to_string(),
            "Invalid city for this province".to_string(),
        );
    }

    errors.len() == before
}

fn invalid_type_message() -> String {
    format!(
        "Invalid type, must be one of: {}",
        catalog::PET_TYPES.join(", ")
    )
}

fn invalid_breed_message(breeds: &[&str]) -> String {
    format!("Invalid breed, must be one of: {}", breeds.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picture() -> PictureUpload {
        PictureUpload::new("luna.png", "image/png", vec![7; 32])
    }

    fn valid_create() -> CreatePet {
        CreatePet {
            name: "Luna".to_string(),
            description: "Black cat, white spot on the chest".to_string(),
            kind: "cat".to_string(),
            breed: "Siamese".to_string(),
            last_seen_time: "14-03-2024".to_string(),
            last_seen_province: "Buenos Aires".to_string(),
            last_seen_city: "La Plata".to_string(),
            picture: Some(picture()),
        }
    }

    fn existing() -> Pet {
        valid_create()
            .validate(OwnerId::new(), 1024)
            .unwrap()
            .pet
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("05-11-2023"), NaiveDate::from_ymd_opt(2023, 11, 5));
        assert!(parse_date("2023-11-05").is_none());
        assert!(parse_date("31-02-2024").is_none());
    }

    #[test]
    fn test_create_builds_pet() {
        let owner = OwnerId::new();
        let validated = valid_create().validate(owner, 1024).unwrap();

        assert_eq!(validated.pet.owner_id, owner);
        assert_eq!(validated.pet.last_seen_place, "Buenos Aires, La Plata");
        assert_eq!(
            validated.pet.last_seen_time,
            NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
        );
        assert!(!validated.pet.has_picture());
        assert!(!validated.pet.is_found);
        assert_eq!(validated.picture.file_name, "luna.png");
    }

    #[test]
    fn test_create_collects_all_errors() {
        let err = CreatePet::default()
            .validate(OwnerId::new(), 1024)
            .unwrap_err();
        let fields = err.field_errors().unwrap();

        for field in [
            "name",
            "description",
            "type",
            "breed",
            "last_seen_time",
            "last_seen_province",
            "last_seen_city",
            "picture",
        ] {
            assert!(fields.contains_key(field), "missing error for {field}");
        }
        assert_eq!(fields["picture"], "Picture is required");
    }

    #[test]
    fn test_create_checks_catalog() {
        let cmd = CreatePet {
            breed: "Beagle".to_string(),
            last_seen_city: "Rosario".to_string(),
            last_seen_time: "2024-03-14".to_string(),
            ..valid_create()
        };
        let err = cmd.validate(OwnerId::new(), 1024).unwrap_err();
        let fields = err.field_errors().unwrap();

        assert!(fields["breed"].starts_with("Invalid breed, must be one of: "));
        assert_eq!(fields["last_seen_city"], "Invalid city for this province");
        assert_eq!(fields["last_seen_time"], INVALID_DATE);
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn test_create_rejects_oversized_picture() {
        let cmd = CreatePet {
            picture: Some(PictureUpload::new("big.png", "image/png", vec![0; 2048])),
            ..valid_create()
        };
        let err = cmd.validate(OwnerId::new(), 1024).unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("picture"));
    }

    #[test]
    fn test_update_builds_changes() {
        let pet = existing();
        let update = UpdatePet {
            name: Some(" Luna II ".to_string()),
            last_seen_time: Some("01-04-2024".to_string()),
            last_seen_province: Some("Santa Fe".to_string()),
            last_seen_city: Some("Rosario".to_string()),
            is_found: Some(true),
            ..Default::default()
        };

        let changes = update.to_changes(&pet).unwrap();
        assert_eq!(changes.name.as_deref(), Some("Luna II"));
        assert_eq!(changes.last_seen_place.as_deref(), Some("Santa Fe, Rosario"));
        assert_eq!(changes.last_seen_time, NaiveDate::from_ymd_opt(2024, 4, 1));
        assert_eq!(changes.is_found, Some(true));
        assert!(changes.kind.is_none());
    }

    #[test]
    fn test_update_checks_breed_against_current_type() {
        let pet = existing();

        let ok = UpdatePet {
            breed: Some("Persian".to_string()),
            ..Default::default()
        };
        assert!(ok.to_changes(&pet).is_ok());

        let wrong = UpdatePet {
            breed: Some("Beagle".to_string()),
            ..Default::default()
        };
        let err = wrong.to_changes(&pet).unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("breed"));
    }

    #[test]
    fn test_update_type_and_breed_together() {
        let pet = existing();

        let both = UpdatePet {
            kind: Some("dog".to_string()),
            breed: Some("Beagle".to_string()),
            ..Default::default()
        };
        let changes = both.to_changes(&pet).unwrap();
        assert_eq!(changes.kind.as_deref(), Some("dog"));

        let type_only = UpdatePet {
            kind: Some("dog".to_string()),
            ..Default::default()
        };
        let err = type_only.to_changes(&pet).unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("breed"));
    }

    #[test]
    fn test_update_requires_province_and_city_together() {
        let pet = existing();
        let update = UpdatePet {
            last_seen_province: Some("Mendoza".to_string()),
            ..Default::default()
        };
        let err = update.to_changes(&pet).unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("last_seen_city"));
    }

    #[test]
    fn test_update_deserializes_type_field() {
        let update: UpdatePet =
            serde_json::from_str(r#"{"type":"bird","breed":"Canary"}"#).unwrap();
        assert_eq!(update.kind.as_deref(), Some("bird"));
        assert_eq!(update.breed.as_deref(), Some("Canary"));
        assert!(update.name.is_none());
    }

    #[test]
    fn test_empty_update_has_no_changes() {
        let pet = existing();
        let changes = UpdatePet::default().to_changes(&pet).unwrap();
        assert!(changes.is_empty());
    }
}
