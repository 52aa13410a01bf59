//! Registered user accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::OwnerId;

/// A registered user. The ID doubles as the owner ID on the user's listings.
///
/// `password_hash` never leaves the server: it is skipped when serializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: OwnerId,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
