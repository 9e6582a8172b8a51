//! Bearer token extraction for protected routes
//!
//! Handlers that take an [`AuthContext`] argument only run once the
//! `Authorization` header carries a valid, unexpired access token.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use chrono::{DateTime, Utc};
use error_common::codes;
use serde::Serialize;
use uuid::Uuid;

use auth_identity::TokenKind;

use crate::error::ApiError;
use crate::server::AuthgateServer;

const BEARER_PREFIX: &str = "Bearer ";

/// Authentication context extracted from an access token
#[derive(Debug, Clone, Serialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Extract the bearer token from the Authorization header
fn extract_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            ApiError::authentication(
                codes::authentication::MISSING_BEARER,
                "Missing Authorization header",
            )
        })?;

    header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            ApiError::authentication(
                codes::authentication::MISSING_BEARER,
                "Invalid Authorization header format. Expected: Bearer <token>",
            )
        })
}

#[async_trait]
impl FromRequestParts<AuthgateServer> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AuthgateServer,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;
        let verified = state.token_issuer.verify(token, TokenKind::Access)?;

        Ok(AuthContext {
            user_id: verified.subject,
            expires_at: verified.expires_at,
        })
    }
}
