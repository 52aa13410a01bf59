//! Lost-pet listing endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, Multipart, Path, Query, State};
use axum::http::StatusCode;
use common::{OwnerId, Pet, PetId};
use domain::{CreatePet, PetService, PictureUpload, UpdatePet, UserService};
use pet_store::{Page, PageConfig, PageRequest, PetFilter, PetStore};
use serde::{Deserialize, Serialize};

use crate::auth::{Authenticator, Caller};
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: PetStore + Clone + 'static> {
    pub pet_service: PetService<S>,
    pub user_service: UserService,
}

impl<S: PetStore + Clone + 'static> FromRef<Arc<AppState<S>>> for Authenticator {
    fn from_ref(state: &Arc<AppState<S>>) -> Self {
        Authenticator::new(state.user_service.tokens())
    }
}

// -- Request types --

/// Query string of `GET /api/v1/pets`. Numbers are parsed leniently: anything
/// unparseable falls back to the default.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort_dir: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub breed: Option<String>,
    pub last_seen_place: Option<String>,
    pub owner_id: Option<String>,
}

impl SearchParams {
    fn filter(&self) -> Result<PetFilter, ApiError> {
        let mut filter = PetFilter::new();
        if let Some(kind) = non_blank(&self.kind) {
            filter = filter.kind(kind);
        }
        if let Some(breed) = non_blank(&self.breed) {
            filter = filter.breed(breed);
        }
        if let Some(place) = non_blank(&self.last_seen_place) {
            filter = filter.last_seen_place(place);
        }
        if let Some(owner_id) = non_blank(&self.owner_id) {
            let uuid = uuid::Uuid::parse_str(owner_id)
                .map_err(|e| ApiError::BadRequest(format!("Invalid owner_id: {e}")))?;
            filter = filter.owner(OwnerId::from_uuid(uuid));
        }
        Ok(filter)
    }

    fn page_request(&self) -> PageRequest {
        let number = |value: &Option<String>| value.as_deref().and_then(|v| v.trim().parse().ok());
        PageRequest::normalize(
            number(&self.page),
            number(&self.size),
            self.sort_dir.as_deref(),
            &PageConfig::PETS,
        )
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// -- Response types --

#[derive(Serialize)]
pub struct PetCreatedResponse {
    pub message: &'static str,
    pub pet: Pet,
}

#[derive(Serialize)]
pub struct PetDetailResponse {
    #[serde(flatten)]
    pub pet: Pet,
    pub can_edit: bool,
    pub can_delete: bool,
}

// -- Handlers --

/// POST /api/v1/pets: Publish a listing from a multipart form.
#[tracing::instrument(skip(state, caller, multipart))]
pub async fn create<S: PetStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    caller: Caller,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<PetCreatedResponse>), ApiError> {
    let mut cmd = CreatePet::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "picture" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            cmd.picture = Some(PictureUpload::new(file_name, content_type, bytes.to_vec()));
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        match name.as_str() {
            "name" => cmd.name = value,
            "description" => cmd.description = value,
            "type" => cmd.kind = value,
            "breed" => cmd.breed = value,
            "last_seen_time" => cmd.last_seen_time = value,
            "last_seen_province" => cmd.last_seen_province = value,
            "last_seen_city" => cmd.last_seen_city = value,
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    let pet = state
        .pet_service
        .create_pet(caller.owner_id(), cmd)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PetCreatedResponse {
            message: "Pet created successfully",
            pet,
        }),
    ))
}

/// GET /api/v1/pets: Search listings with filters and pagination.
#[tracing::instrument(skip(state))]
pub async fn search<S: PetStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Page<Pet>>, ApiError> {
    let filter = params.filter()?;
    let page = state
        .pet_service
        .search_pets(filter, params.page_request())
        .await?;
    Ok(Json(page))
}

/// GET /api/v1/pets/{id}: Load a listing, with the caller's permissions.
#[tracing::instrument(skip(state))]
pub async fn get<S: PetStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    caller: Option<Caller>,
    Path(id): Path<String>,
) -> Result<Json<PetDetailResponse>, ApiError> {
    let pet_id = parse_pet_id(&id)?;
    let pet = state.pet_service.get_pet(pet_id).await?;

    let is_owner = caller.is_some_and(|c| pet.is_owned_by(c.owner_id()));
    Ok(Json(PetDetailResponse {
        pet,
        can_edit: is_owner,
        can_delete: is_owner,
    }))
}

/// PUT /api/v1/pets/{id}: Change fields of the caller's listing.
#[tracing::instrument(skip(state, body))]
pub async fn update<S: PetStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    caller: Caller,
    Path(id): Path<String>,
    body: Result<Json<UpdatePet>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let pet_id = parse_pet_id(&id)?;
    let Json(cmd) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    state
        .pet_service
        .update_pet(caller.owner_id(), pet_id, cmd)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/pets/{id}/mark-found: Flag the caller's listing as found.
#[tracing::instrument(skip(state))]
pub async fn mark_found<S: PetStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let pet_id = parse_pet_id(&id)?;
    state
        .pet_service
        .mark_found(caller.owner_id(), pet_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/pets/{id}: Delete the caller's listing and its picture.
#[tracing::instrument(skip(state))]
pub async fn delete<S: PetStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let pet_id = parse_pet_id(&id)?;
    state
        .pet_service
        .delete_pet(caller.owner_id(), pet_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_pet_id(id: &str) -> Result<PetId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(PetId::from(uuid))
}

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError::BadRequest(e.body_text())
}
