// Logger configuration
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::LoggerError;

/// Output layout for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, multi-line output for local development
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(LoggerError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info` or `auth_identity=debug`
    pub log_level: String,
    pub format: LogFormat,
    pub include_target: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
            include_target: true,
        }
    }
}
