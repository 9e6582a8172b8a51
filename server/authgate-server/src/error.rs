use auth_identity::{AuthError, TokenError};
use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use error_common::{codes, FieldError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

/// Message returned for every server-side failure
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred. Please try again later.";

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Error type
    pub error_type: String,
    /// Stable machine-readable code from `error_common::codes`
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Field-specific validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<Vec<FieldError>>,
    /// Timestamp when error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Suggested actions for resolving the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

/// Standard API success response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: Vec<FieldError>,
    },

    #[error("{message}")]
    BadRequest { code: &'static str, message: String },

    #[error("{message}")]
    Authentication { code: &'static str, message: String },

    /// Never rendered with its source; see [`INTERNAL_ERROR_MESSAGE`]
    #[error("An internal error occurred. Please try again later.")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn authentication(code: &'static str, message: impl Into<String>) -> Self {
        Self::Authentication {
            code,
            message: message.into(),
        }
    }

    pub fn internal(error: impl Into<anyhow::Error>) -> Self {
        Self::Internal(error.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::BadRequest { .. } => "bad_request",
            ApiError::Authentication { .. } => "authentication_error",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => codes::validation::INVALID_INPUT,
            ApiError::BadRequest { code, .. } | ApiError::Authentication { code, .. } => *code,
            ApiError::Internal(_) => codes::system::INTERNAL,
        }
    }

    /// Get suggested actions for resolving the error
    pub fn suggestions(&self) -> Option<Vec<String>> {
        match self {
            ApiError::Validation { .. } => Some(vec![
                "Check the request payload for invalid fields".to_string(),
                "Ensure all required fields are provided".to_string(),
            ]),
            ApiError::Authentication { code, .. } if *code == codes::authentication::TOKEN_EXPIRED => {
                Some(vec!["Exchange your refresh token for a new access token".to_string()])
            }
            ApiError::Internal(_) => Some(vec!["Try again in a few moments".to_string()]),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        // Log the error with correlation ID
        match &self {
            ApiError::Internal(source) => error!(
                error_id = %error_id,
                error_type = %self.error_type(),
                status_code = %status_code.as_u16(),
                error = %logger_redacted::redact(&format!("{source:#}")),
                "API error occurred"
            ),
            _ => warn!(
                error_id = %error_id,
                error_type = %self.error_type(),
                code = %self.code(),
                status_code = %status_code.as_u16(),
                "Request rejected"
            ),
        }

        let code = self.code().to_string();
        let error_type = self.error_type().to_string();
        let suggestions = self.suggestions();
        let message = self.to_string();
        let field_errors = match self {
            ApiError::Validation { field_errors, .. } => Some(field_errors),
            _ => None,
        };

        let error_response = ApiErrorResponse {
            error_id,
            error_type,
            code,
            message,
            field_errors,
            timestamp: chrono::Utc::now(),
            suggestions,
        };

        (status_code, Json(error_response)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        let message = error.to_string();
        match error {
            AuthError::Validation(errors) => ApiError::Validation {
                message: "Request validation failed".to_string(),
                field_errors: errors.into_iter().collect(),
            },
            AuthError::EmailTaken => {
                ApiError::bad_request(codes::registration::EMAIL_TAKEN, message)
            }
            AuthError::InvalidCredentials => {
                ApiError::authentication(codes::authentication::INVALID_CREDENTIALS, message)
            }
            AuthError::InvalidRefreshToken => {
                ApiError::authentication(codes::authentication::INVALID_REFRESH_TOKEN, message)
            }
            AuthError::UserNotFound => {
                ApiError::authentication(codes::authentication::USER_NOT_FOUND, message)
            }
            AuthError::NotLoggedIn => {
                ApiError::authentication(codes::authentication::NOT_LOGGED_IN, message)
            }
            AuthError::Internal(source) => ApiError::Internal(source),
        }
    }
}

/// Bearer gate failures. The reason is logged, not returned.
impl From<TokenError> for ApiError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::Expired => {
                ApiError::authentication(codes::authentication::TOKEN_EXPIRED, "Token expired")
            }
            TokenError::Signing(_) => ApiError::internal(error),
            TokenError::InvalidSignature | TokenError::Malformed | TokenError::WrongKind { .. } => {
                warn!(reason = %error, "Bearer token rejected");
                ApiError::authentication(codes::authentication::TOKEN_INVALID, "Invalid token")
            }
        }
    }
}

/// Malformed or missing JSON bodies
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(
            codes::validation::MALFORMED_BODY,
            format!("Invalid JSON: {}", rejection.body_text()),
        )
    }
}

/// `Json` extractor whose rejections render as [`ApiErrorResponse`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Helper function to create successful API responses
pub fn api_success<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use error_common::ValidationErrors;

    #[test]
    fn test_auth_error_status_mapping() {
        let cases = [
            (AuthError::EmailTaken, StatusCode::BAD_REQUEST),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidRefreshToken, StatusCode::UNAUTHORIZED),
            (AuthError::UserNotFound, StatusCode::UNAUTHORIZED),
            (AuthError::NotLoggedIn, StatusCode::UNAUTHORIZED),
            (
                AuthError::Internal(anyhow::anyhow!("pool timed out")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status_code(), status);
        }
    }

    #[test]
    fn test_validation_keeps_field_errors() {
        let mut errors = ValidationErrors::new();
        errors.add("name", codes::validation::TOO_SHORT, "Name must be at least 3 characters");
        let api = ApiError::from(AuthError::Validation(errors));

        assert_eq!(api.status_code(), StatusCode::BAD_REQUEST);
        let field_errors = match api {
            ApiError::Validation { field_errors, .. } => field_errors,
            _ => Vec::new(),
        };
        assert_eq!(field_errors.len(), 1);
        assert_eq!(field_errors[0].field, "name");
    }

    #[test]
    fn test_internal_message_is_opaque() {
        let api = ApiError::from(AuthError::Internal(anyhow::anyhow!(
            "connection refused at 10.0.0.3:5432"
        )));
        assert_eq!(api.to_string(), INTERNAL_ERROR_MESSAGE);
        assert_eq!(api.code(), codes::system::INTERNAL);
    }

    #[test]
    fn test_token_errors_map_to_unauthorized() {
        let expired = ApiError::from(TokenError::Expired);
        assert_eq!(expired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(expired.code(), codes::authentication::TOKEN_EXPIRED);
        assert!(expired.suggestions().is_some());

        let forged = ApiError::from(TokenError::InvalidSignature);
        assert_eq!(forged.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(forged.to_string(), "Invalid token");
    }
}
