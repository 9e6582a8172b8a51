//! Centralized API route path constants
//!
//! Runtime route definitions and the integration tests both use these, so a
//! path only ever changes in one place.

/// API base path
pub const API_V1: &str = "/api/v1";

/// Health check endpoints
pub mod health {
    pub const HEALTH: &str = "/health";
}

/// Authentication endpoints, relative to [`super::API_V1`]
pub mod auth {
    pub const REGISTER: &str = "/auth/register";
    pub const LOGIN: &str = "/auth/login";
    pub const REFRESH: &str = "/auth/refresh";
    pub const LOGOUT: &str = "/auth/logout";
    pub const ME: &str = "/auth/me";
}

/// Join [`API_V1`] and a relative path
pub fn v1(path: &str) -> String {
    format!("{API_V1}{path}")
}
