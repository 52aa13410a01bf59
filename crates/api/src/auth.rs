//! Caller identity from `Authorization: Bearer <token>` headers.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use common::OwnerId;
use domain::TokenService;

use crate::error::ApiError;

/// The authenticated user making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub OwnerId);

impl Caller {
    pub fn owner_id(&self) -> OwnerId {
        self.0
    }
}

/// Verifies access tokens for the [`Caller`] extractor.
///
/// Any router state that can hand one out via `FromRef` can use `Caller`.
#[derive(Clone)]
pub struct Authenticator(Arc<dyn TokenService>);

impl Authenticator {
    pub fn new(tokens: Arc<dyn TokenService>) -> Self {
        Self(tokens)
    }

    /// None when the request carries no `Authorization` header at all.
    fn caller(&self, parts: &Parts) -> Option<Result<Caller, ApiError>> {
        let value = parts.headers.get(AUTHORIZATION)?;
        Some(self.verify_header(value.to_str().ok()))
    }

    fn verify_header(&self, value: Option<&str>) -> Result<Caller, ApiError> {
        let token = value
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ApiError::Unauthorized(
                    "Invalid authorization header format. Use 'Bearer <token>'".to_string(),
                )
            })?;

        let claims = self.0.verify(token)?;
        Ok(Caller(claims.owner_id()))
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
    Authenticator: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Authenticator::from_ref(state).caller(parts).unwrap_or_else(|| {
            Err(ApiError::Unauthorized(
                "Authorization header is required".to_string(),
            ))
        })
    }
}

/// Lets public routes accept an optional caller. A header that is present but
/// unusable is still rejected.
impl<S> OptionalFromRequestParts<S> for Caller
where
    S: Send + Sync,
    Authenticator: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Authenticator::from_ref(state).caller(parts).transpose()
    }
}
