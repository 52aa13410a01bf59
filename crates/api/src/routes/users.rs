//! Registration and login endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use domain::{LoginUser, RegisterUser};
use pet_store::PetStore;
use serde::Serialize;

use super::pets::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct RegisteredUser {
    pub name: String,
    pub last_name: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user: RegisteredUser,
    pub auth_token: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /api/v1/users: Register an account and start a session.
#[tracing::instrument(skip_all)]
pub async fn register<S: PetStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<RegisterUser>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(cmd) = body.map_err(|e| {
        tracing::debug!(error = %e.body_text(), "registration body rejected");
        ApiError::BadRequest("invalid user body".to_string())
    })?;

    let registration = state.user_service.register(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: RegisteredUser {
                name: registration.user.name,
                last_name: registration.user.last_name,
            },
            auth_token: registration.token,
        }),
    ))
}

/// POST /api/v1/auth/login: Exchange email and password for a token.
#[tracing::instrument(skip_all)]
pub async fn login<S: PetStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<LoginUser>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(cmd) = body.map_err(|e| {
        tracing::debug!(error = %e.body_text(), "login body rejected");
        ApiError::BadRequest("invalid body".to_string())
    })?;

    let token = state.user_service.login(cmd).await?;
    Ok(Json(LoginResponse { token }))
}
