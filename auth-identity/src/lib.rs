//! Identity and session core for Authgate
//!
//! This crate owns everything with real invariants in the service:
//! - Password hashing and verification (bcrypt)
//! - Access and refresh token issuance and verification (HS256 JWT)
//! - Credential and session stores, in-memory and Postgres
//! - Session rotation: one live refresh token per user, single-use on refresh
//!
//! # Example
//!
//! ```rust
//! use auth_identity::{
//!     AuthService, IdentityConfig, InMemorySessionRepository, InMemoryUserRepository,
//!     LoginRequest, RegisterRequest,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = IdentityConfig::new("a-signing-secret-of-at-least-32-bytes").with_password_hash_cost(4);
//!     let service = AuthService::from_config(
//!         Arc::new(InMemoryUserRepository::new()),
//!         Arc::new(InMemorySessionRepository::new()),
//!         &config,
//!     )?;
//!
//!     service
//!         .register(RegisterRequest {
//!             name: "Amr".into(),
//!             email: "amr@example.com".into(),
//!             password: "P@ss1234".into(),
//!         })
//!         .await?;
//!     let tokens = service
//!         .login(LoginRequest {
//!             email: "amr@example.com".into(),
//!             password: "P@ss1234".into(),
//!         })
//!         .await?;
//!     assert!(!tokens.refresh_token.is_empty());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod locks;
pub mod models;
pub mod password;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod tokens;
pub mod validation;

pub use config::*;
pub use error::*;
pub use locks::RotationLocks;
pub use models::*;
pub use password::{PasswordHasher, MAX_PASSWORD_BYTES};
pub use postgres::{PgSessionRepository, PgUserRepository};
pub use repository::{
    InMemorySessionRepository, InMemoryUserRepository, SessionRepository, StoreResult,
    UserRepository,
};
pub use service::*;
pub use tokens::{token_digest, TokenClaims, TokenIssuer, TokenKind, VerifiedToken};
pub use validation::RequestValidation;
