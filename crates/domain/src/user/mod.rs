//! User accounts: registration, login and access tokens.

pub mod commands;
pub mod credentials;
pub mod service;

pub use commands::{LoginUser, MIN_PASSWORD_LEN, RegisterUser, normalize_email};
pub use credentials::{BcryptPasswordHasher, Claims, JwtTokenService, PasswordHasher, TokenService};
pub use service::{Registration, UserService};
