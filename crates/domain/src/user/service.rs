//! Registration, login and token checks.

use std::sync::Arc;

use chrono::Utc;
use common::{OwnerId, User};
use pet_store::UserStore;

use crate::error::{UserError, UserResult};

use super::commands::{LoginUser, RegisterUser, normalize_email};
use super::credentials::{PasswordHasher, TokenService};

/// A newly registered user with a token to start a session.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    pub token: String,
}

/// Service for user accounts.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
}

impl UserService {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    pub fn tokens(&self) -> Arc<dyn TokenService> {
        self.tokens.clone()
    }

    /// Registers a user and issues their first token.
    #[tracing::instrument(skip_all)]
    pub async fn register(&self, cmd: RegisterUser) -> UserResult<Registration> {
        cmd.validate()?;

        let email = normalize_email(&cmd.email);
        if self.store.find_by_email(&email).await?.is_some() {
            return Err(UserError::EmailTaken(email));
        }

        let hasher = self.hasher.clone();
        let password = cmd.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "password hashing task failed");
                UserError::Internal("An error occurred while hashing password".to_string())
            })??;

        let now = Utc::now();
        let user = User {
            id: OwnerId::new(),
            name: cmd.name.trim().to_string(),
            last_name: cmd.last_name.trim().to_string(),
            email,
            phone: cmd.phone.trim().to_string(),
            password_hash,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(&user).await?;

        let token = self.tokens.issue(&user)?;
        metrics::counter!("users_registered_total").increment(1);
        tracing::info!(user_id = %user.id, "user registered");
        Ok(Registration { user, token })
    }

    /// Exchanges credentials for a token.
    #[tracing::instrument(skip_all)]
    pub async fn login(&self, cmd: LoginUser) -> UserResult<String> {
        cmd.validate()?;

        let email = normalize_email(&cmd.email);
        let Some(user) = self.store.find_by_email(&email).await? else {
            return Err(UserError::InvalidCredentials);
        };

        let hasher = self.hasher.clone();
        let password = cmd.password;
        let stored = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "password check task failed");
                UserError::Internal("Failed to check credentials".to_string())
            })?;
        if !matches {
            return Err(UserError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(token)
    }

    /// Returns the user a token was issued to.
    pub fn authenticate(&self, token: &str) -> UserResult<OwnerId> {
        self.tokens.verify(token).map(|claims| claims.owner_id())
    }
}
