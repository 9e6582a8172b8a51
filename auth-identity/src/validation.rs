//! Request validation for the authentication payloads
//!
//! Every request type implements [`RequestValidation`]. Validators collect all
//! field errors into an [`error_common::ValidationErrors`] rather than stopping
//! at the first failure, so one response can list everything wrong with a body.

use error_common::{codes::validation as codes, ValidationErrors};

use crate::models::{LoginRequest, RefreshRequest, RegisterRequest};
use crate::password::MAX_PASSWORD_BYTES;

pub const NAME_MIN_LENGTH: usize = 3;
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Characters that satisfy the "special character" password rule
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

mod patterns {
    #![allow(clippy::unwrap_used)]

    use lazy_static::lazy_static;
    use regex::Regex;

    lazy_static! {
        pub static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    }
}

use patterns::EMAIL_REGEX;

/// Trait for validating request payloads
pub trait RequestValidation {
    /// `Ok(())` when the payload is acceptable, otherwise every field error found
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Record an error for `$field` unless `$predicate` holds
///
/// ```rust
/// use auth_identity::validate_field;
/// use error_common::{codes, ValidationErrors};
///
/// let mut errors = ValidationErrors::new();
/// let age = 12;
/// validate_field!(errors, "age", age >= 18, codes::validation::INVALID_INPUT, "Too young");
/// assert!(errors.has_field("age"));
/// ```
#[macro_export]
macro_rules! validate_field {
    ($errors:expr, $field:expr, $predicate:expr, $code:expr, $message:expr) => {
        if !$predicate {
            $errors.add($field, $code, $message);
        }
    };
}

/// Record a missing-field error when `$value` is blank.
///
/// Evaluates to `true` when the value is present, so callers can skip the
/// remaining rules for an empty field.
#[macro_export]
macro_rules! validate_required {
    ($errors:expr, $field:expr, $value:expr, $message:expr) => {{
        let present = !$value.trim().is_empty();
        $crate::validate_field!(
            $errors,
            $field,
            present,
            error_common::codes::validation::MISSING_REQUIRED_FIELD,
            $message
        );
        present
    }};
}

/// Minimum length in characters, not bytes
#[macro_export]
macro_rules! validate_min_length {
    ($errors:expr, $field:expr, $value:expr, $min:expr, $message:expr) => {
        $crate::validate_field!(
            $errors,
            $field,
            $value.chars().count() >= $min,
            error_common::codes::validation::TOO_SHORT,
            $message
        );
    };
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

fn validate_password_strength(errors: &mut ValidationErrors, password: &str) {
    validate_min_length!(
        errors,
        "password",
        password,
        PASSWORD_MIN_LENGTH,
        "Password must be at least 8 characters"
    );
    // Bytes, not characters: that is what the hasher consumes
    validate_field!(
        errors,
        "password",
        password.len() <= MAX_PASSWORD_BYTES,
        codes::TOO_LONG,
        "Password must be at most 72 bytes"
    );
    validate_field!(
        errors,
        "password",
        password.chars().any(|c| c.is_ascii_alphabetic()),
        codes::WEAK_PASSWORD,
        "Password must contain at least one letter."
    );
    validate_field!(
        errors,
        "password",
        password.chars().any(|c| c.is_ascii_digit()),
        codes::WEAK_PASSWORD,
        "Password must contain at least one number."
    );
    validate_field!(
        errors,
        "password",
        password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)),
        codes::WEAK_PASSWORD,
        "Password must contain at least one special character."
    );
}

impl RequestValidation for RegisterRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if validate_required!(errors, "name", self.name, "Name is required") {
            validate_min_length!(
                errors,
                "name",
                self.name.trim(),
                NAME_MIN_LENGTH,
                "Name must be at least 3 characters"
            );
        }

        if validate_required!(errors, "email", self.email, "Email is required") {
            validate_field!(
                errors,
                "email",
                is_valid_email(&self.email),
                codes::INVALID_FORMAT,
                "Email must be a valid email address"
            );
        }

        if validate_required!(errors, "password", self.password, "Password is required") {
            validate_password_strength(&mut errors, &self.password);
        }

        errors.into_result()
    }
}

impl RequestValidation for LoginRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required!(errors, "email", self.email, "Email is required");
        validate_required!(errors, "password", self.password, "Password is required");
        errors.into_result()
    }
}

impl RequestValidation for RefreshRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required!(
            errors,
            "refresh_token",
            self.refresh_token,
            "Refresh token is required"
        );
        errors.into_result()
    }
}
