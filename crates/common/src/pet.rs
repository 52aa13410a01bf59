//! The lost-pet listing record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{OwnerId, PetId};

/// A lost-pet listing as persisted in the datastore.
///
/// `picture_url` starts empty and is filled in by the picture upload step
/// before the record is inserted; the insert step relies on that ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub owner_id: OwnerId,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub breed: String,
    pub last_seen_time: NaiveDate,
    pub last_seen_place: String,
    pub is_found: bool,
    pub picture_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pet {
    /// Returns true if the given owner published this listing.
    pub fn is_owned_by(&self, owner_id: OwnerId) -> bool {
        self.owner_id == owner_id
    }

    /// Returns true once a picture locator has been attached.
    pub fn has_picture(&self) -> bool {
        !self.picture_url.is_empty()
    }
}
