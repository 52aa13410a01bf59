//! Password hashing and access tokens.
//!
//! Both sit behind traits so the use cases never see bcrypt or JWT details.

use chrono::{Duration, Utc};
use common::{OwnerId, User};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{UserError, UserResult};

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> UserResult<String>;

    /// Returns false for a wrong password and for hashes it cannot read.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// bcrypt with a configurable cost.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> UserResult<String> {
        bcrypt::hash(password, self.cost).map_err(|e| {
            tracing::error!(error = %e, "password hashing failed");
            UserError::Internal("An error occurred while hashing password".to_string())
        })
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is unreadable");
                false
            }
        }
    }
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The user's ID.
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn owner_id(&self) -> OwnerId {
        OwnerId::from_uuid(self.sub)
    }
}

/// Issues and checks access tokens.
pub trait TokenService: Send + Sync {
    fn issue(&self, user: &User) -> UserResult<String>;

    /// Fails with `UserError::InvalidToken` for bad signatures, expired tokens
    /// and anything unparseable.
    fn verify(&self, token: &str) -> UserResult<Claims>;
}

/// HS256-signed JWTs.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtTokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user: &User) -> UserResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.as_uuid(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(
            |e| {
                tracing::error!(error = %e, "token signing failed");
                UserError::Internal("Failed to generate token".to_string())
            },
        )
    }

    fn verify(&self, token: &str) -> UserResult<Claims> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                UserError::InvalidToken
            })
    }
}
