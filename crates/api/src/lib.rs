//! HTTP API server with observability for the pet finder service.
//!
//! Provides REST endpoints for user accounts and lost-pet listings, serves
//! uploaded pictures, and exposes structured logging (tracing) and Prometheus
//! metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use domain::{
    BcryptPasswordHasher, JwtTokenService, LocalStorageProvider, PetService, StorageProvider,
    UserService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use pet_store::{PetStore, UserStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use config::Config;
use routes::pets::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: PetStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
    config: &Config,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    let v1 = Router::new()
        .route("/users", post(routes::users::register::<S>))
        .route("/auth/login", post(routes::users::login::<S>))
        .route(
            "/pets",
            get(routes::pets::search::<S>).post(routes::pets::create::<S>),
        )
        .route(
            "/pets/{id}",
            get(routes::pets::get::<S>)
                .put(routes::pets::update::<S>)
                .delete(routes::pets::delete::<S>),
        )
        .route("/pets/{id}/mark-found", patch(routes::pets::mark_found::<S>))
        .with_state(state);

    Router::new()
        .route("/health", get(routes::health::check))
        .nest("/api/v1", v1)
        .nest_service(&config.upload_url_prefix, ServeDir::new(&config.upload_dir))
        .merge(metrics_router)
        .layer(DefaultBodyLimit::max(config.body_limit()))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Picture storage described by the configuration.
pub fn create_storage(config: &Config) -> Arc<dyn StorageProvider> {
    Arc::new(LocalStorageProvider::new(
        &config.upload_dir,
        config.upload_url_prefix.as_str(),
    ))
}

/// User accounts over `users`, with bcrypt hashing and JWTs as configured.
///
/// Without `JWT_SECRET` a random secret is generated, so tokens stop working
/// when the process restarts.
pub fn create_user_service(users: Arc<dyn UserStore>, config: &Config) -> UserService {
    let secret = config.jwt_secret.clone().unwrap_or_else(|| {
        tracing::warn!("JWT_SECRET not set, using a random secret for this process");
        format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
    });
    let tokens = JwtTokenService::new(
        secret.as_bytes(),
        chrono::Duration::hours(config.jwt_expiration_hours),
    );
    UserService::new(
        users,
        Arc::new(BcryptPasswordHasher::new(config.bcrypt_cost)),
        Arc::new(tokens),
    )
}

/// Creates the application state around the pet store, picture storage and
/// user accounts.
pub fn create_default_state<S: PetStore + Clone + 'static>(
    store: S,
    storage: Arc<dyn StorageProvider>,
    user_service: UserService,
    config: &Config,
) -> Arc<AppState<S>> {
    let pet_service =
        PetService::new(store, storage).with_max_picture_bytes(config.max_upload_bytes);
    Arc::new(AppState {
        pet_service,
        user_service,
    })
}
