//! Logging setup with automatic redaction for Authgate
//!
//! Authentication services see email addresses, passwords and bearer tokens on
//! nearly every request. This crate installs the global `tracing` subscriber
//! and provides helpers that keep those values out of log output.
//!
//! # Redacted Data Types
//!
//! - **Email Addresses**: `john.doe@example.com` → `j***@e***`
//! - **Bearer Headers**: `Bearer eyJ...` → `Bearer [REDACTED]`
//! - **Bare JWTs**: `eyJ...` → `[JWT]`
//! - **Correlation**: [`redact_for_correlation`] swaps each match for a stable
//!   digest tag such as `EMAIL[q1Xk...]`
//!
//! # Example
//!
//! ```rust
//! use logger_redacted::{redact, redact_email, LoggerConfig};
//!
//! let config = LoggerConfig::default();
//! logger_redacted::init(&config).ok();
//!
//! tracing::info!(email = %redact_email("john.doe@example.com"), "user logged in");
//! assert_eq!(redact("token eyJhbGciOiJIUzI1NiJ9.e30.c2ln"), "token [JWT]");
//! ```

pub mod config;
pub mod macros;
pub mod redactor;

pub use config::*;
pub use redactor::*;

use thiserror::Error;
use tracing_subscriber::{fmt::time::ChronoUtc, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("global logger already initialized: {0}")]
    AlreadyInitialized(String),

    #[error("invalid log filter '{0}'")]
    InvalidFilter(String),

    #[error("unknown log format '{0}', expected 'pretty' or 'json'")]
    UnknownFormat(String),
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `config.log_level` when set. Returns
/// [`LoggerError::AlreadyInitialized`] if a subscriber is already installed.
pub fn init(config: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|_| LoggerError::InvalidFilter(config.log_level.clone()))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.include_target)
        .with_timer(ChronoUtc::rfc_3339());

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };

    installed.map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        let config = LoggerConfig {
            format: LogFormat::Json,
            ..Default::default()
        };
        // The first call may race another test binary's subscriber; only the
        // second outcome is deterministic.
        let _ = init(&config);
        assert!(matches!(
            init(&config),
            Err(LoggerError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn test_invalid_filter() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggerConfig {
            log_level: "auth_identity=loud".to_string(),
            ..Default::default()
        };
        assert!(matches!(init(&config), Err(LoggerError::InvalidFilter(_))));
    }

    #[test]
    fn test_redacted_macros_compile_and_run() {
        crate::redacted_info!("user {} signed up", "amr@example.com");
        crate::redacted_warn!("rejected Bearer {}", "abc.def.ghi");
        crate::redacted_error!("store failure for {}", "amr@example.com");
    }
}
