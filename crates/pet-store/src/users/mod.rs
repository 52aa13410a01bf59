//! User account persistence.

mod memory;
mod postgres;

use async_trait::async_trait;

pub use memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;

use crate::{OwnerId, Result, User};

/// Core trait for user persistence backends.
///
/// Emails are compared exactly; callers normalize them before storing or
/// looking them up.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user.
    ///
    /// Fails with `StoreError::DuplicateEmail` if the email is taken.
    async fn insert(&self, user: &User) -> Result<()>;

    /// Loads a user by ID.
    async fn get(&self, id: OwnerId) -> Result<Option<User>>;

    /// Loads a user by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}
