pub mod paths;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    handlers::{auth, health},
    server::AuthgateServer,
};

/// Create health check routes
pub fn health_routes() -> Router<AuthgateServer> {
    Router::new().route(paths::health::HEALTH, get(health::health_check))
}

/// Create authentication routes
pub fn auth_routes() -> Router<AuthgateServer> {
    Router::new()
        .route(paths::auth::REGISTER, post(auth::register))
        .route(paths::auth::LOGIN, post(auth::login))
        .route(paths::auth::REFRESH, post(auth::refresh))
        .route(paths::auth::LOGOUT, post(auth::logout))
        .route(paths::auth::ME, get(auth::me))
}

/// Create all routes
pub fn create_routes() -> Router<AuthgateServer> {
    Router::new()
        .merge(health_routes())
        .nest(paths::API_V1, auth_routes())
}
