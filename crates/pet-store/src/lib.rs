//! Pet listing and user account persistence.
//!
//! Provides the [`PetStore`] capability used by the pet creation saga and the
//! listing use cases, and the [`UserStore`] behind registration and login.
//! Each has an in-memory backend for tests and local runs and a PostgreSQL
//! backend for deployments.

pub mod changes;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;
pub mod users;

pub use changes::PetChanges;
pub use common::{OwnerId, Pet, PetId, User};
pub use error::{Result, StoreError};
pub use memory::InMemoryPetStore;
pub use postgres::PostgresPetStore;
pub use query::{Page, PageConfig, PageRequest, PetFilter, PetQuery, SortDirection};
pub use store::PetStore;
pub use users::{InMemoryUserStore, PostgresUserStore, UserStore};
