//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{FieldErrors, PetError, UserError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Missing or unusable access token on a route that needs one.
    Unauthorized(String),
    /// Pet use case error.
    Pet(PetError),
    /// User account error.
    User(UserError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, fields) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Pet(err) => pet_error_to_response(err),
            ApiError::User(err) => user_error_to_response(err),
        };

        let body = match fields {
            Some(fields) => serde_json::json!({ "error": message, "fields": fields }),
            None => serde_json::json!({ "error": message }),
        };
        (status, axum::Json(body)).into_response()
    }
}

fn pet_error_to_response(err: PetError) -> (StatusCode, String, Option<FieldErrors>) {
    match err {
        PetError::Validation(fields) => (
            StatusCode::BAD_REQUEST,
            "Validation failed".to_string(),
            Some(fields),
        ),
        PetError::NotFound(_) => (StatusCode::NOT_FOUND, "Pet not found".to_string(), None),
        PetError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
        err @ PetError::AlreadyFound => (StatusCode::CONFLICT, err.to_string(), None),
        PetError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
        PetError::Store(e) => {
            tracing::error!(error = %e, "pet store error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                None,
            )
        }
    }
}

fn user_error_to_response(err: UserError) -> (StatusCode, String, Option<FieldErrors>) {
    match err {
        UserError::Validation(fields) => (
            StatusCode::BAD_REQUEST,
            "Validation failed".to_string(),
            Some(fields),
        ),
        err @ UserError::EmailTaken(_) => (StatusCode::CONFLICT, err.to_string(), None),
        err @ (UserError::InvalidCredentials | UserError::InvalidToken) => {
            (StatusCode::UNAUTHORIZED, err.to_string(), None)
        }
        UserError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
        UserError::Store(e) => {
            tracing::error!(error = %e, "user store error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                None,
            )
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        ApiError::User(err)
    }
}

impl From<PetError> for ApiError {
    fn from(err: PetError) -> Self {
        ApiError::Pet(err)
    }
}
