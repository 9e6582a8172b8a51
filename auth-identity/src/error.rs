use error_common::ValidationErrors;
use thiserror::Error;

use crate::tokens::TokenKind;

/// Failures raised by the credential and session stores
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Session token already stored")]
    DuplicateSession,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Token signature does not match")]
    InvalidSignature,

    #[error("Token could not be decoded")]
    Malformed,

    #[error("Expected {expected} token, got {found}")]
    WrongKind { expected: TokenKind, found: TokenKind },

    #[error("Token signing failed: {0}")]
    Signing(String),
}

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Hash cost {0} outside the supported range 4..=31")]
    InvalidCost(u32),

    #[error("Password longer than {0} bytes")]
    TooLong(usize),
}

/// Outcome of every [`crate::AuthService`] operation that did not succeed
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("User already exists")]
    EmailTaken,

    /// Shared by "no such user" and "wrong password"
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid session or already logged out")]
    NotLoggedIn,

    /// Store or crypto failure. The source is for server logs only.
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AuthError {
    pub fn internal(error: impl Into<anyhow::Error>) -> Self {
        Self::Internal(error.into())
    }
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        Self::internal(error)
    }
}

impl From<PasswordError> for AuthError {
    fn from(error: PasswordError) -> Self {
        Self::internal(error)
    }
}

impl From<TokenError> for AuthError {
    fn from(error: TokenError) -> Self {
        Self::internal(error)
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
