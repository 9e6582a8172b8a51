//! Authgate HTTP server
//!
//! Wires the `auth-identity` service into an axum router: JSON endpoints under
//! `/api/v1/auth`, a `/health` probe and the shared middleware stack.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod reaper;
pub mod routes;
pub mod server;

pub use config::{ConfigError, ServerConfig, StoreBackend};
pub use error::{ApiError, ApiErrorResponse, ApiResponse, ApiResult};
pub use server::AuthgateServer;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Create the main application router
pub fn create_app(server: AuthgateServer) -> Router {
    let request_timeout = server.config.request_timeout();

    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(middleware::create_cors_layer()),
        )
        .with_state(server)
}
