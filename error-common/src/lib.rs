//! Common error handling utilities for Authgate
//!
//! This crate holds the pieces of error reporting that more than one crate
//! needs to agree on:
//!
//! - **Error Codes**: stable, machine-readable codes for API responses
//! - **Field Errors**: a structured list of rejected input fields, produced by
//!   request validation in `auth-identity` and rendered by the HTTP layer
//!
//! # Example
//!
//! ```rust
//! use error_common::{codes, ValidationErrors};
//!
//! fn validate_name(name: &str) -> Result<(), ValidationErrors> {
//!     let mut errors = ValidationErrors::new();
//!     if name.trim().chars().count() < 3 {
//!         errors.add("name", codes::validation::TOO_SHORT, "Name must be at least 3 characters");
//!     }
//!     errors.into_result()
//! }
//!
//! assert!(validate_name("Amr").is_ok());
//! assert!(validate_name("Al").is_err());
//! ```

pub mod codes;
pub mod types;

pub use types::*;
