pub mod auth_context;

pub use auth_context::AuthContext;

use tower_http::cors::{Any, CorsLayer};

/// Create CORS layer
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
