use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field as it appears on the wire
    pub field: String,
    /// Stable code from [`crate::codes::validation`]
    pub code: String,
    /// Human-readable explanation
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field error collected while validating one request.
///
/// Validators push into this instead of returning on the first failure, so
/// callers see the full list in a single round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`
    pub fn add(&mut self, field: impl Into<String>, code: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, code, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// True when at least one error was recorded for `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected list
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{joined}")
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::validation;

    #[test]
    fn test_empty_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut errors = ValidationErrors::new();
        errors.add("name", validation::TOO_SHORT, "Name must be at least 3 characters");
        errors.add("email", validation::INVALID_FORMAT, "Email must be a valid address");

        let err = errors.into_result().unwrap_err();
        assert_eq!(err.len(), 2);
        assert!(err.has_field("name"));
        assert!(err.has_field("email"));
        assert!(!err.has_field("password"));
        assert_eq!(
            err.to_string(),
            "name: Name must be at least 3 characters; email: Email must be a valid address"
        );
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let errors = ValidationErrors::from(FieldError::new(
            "refresh_token",
            validation::MISSING_REQUIRED_FIELD,
            "Refresh token is required",
        ));
        let json = serde_json::to_value(&errors).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["field"], "refresh_token");
        assert_eq!(json[0]["code"], "VALIDATION_1002");
    }
}
