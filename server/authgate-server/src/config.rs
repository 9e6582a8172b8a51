//! Server configuration, read from flags or the environment

use auth_identity::IdentityConfig;
use clap::Parser;
use logger_redacted::{LogFormat, LoggerConfig};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Secrets shorter than this are accepted but logged as weak
pub const MIN_RECOMMENDED_SECRET_LEN: usize = 32;

const MEMORY_SCHEME: &str = "memory://";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must not be empty")]
    EmptySecret,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("Unsupported DATABASE_URL scheme: {0}")]
    UnsupportedDatabase(String),

    #[error("Invalid bind address {0}")]
    InvalidAddress(String),
}

/// Where users and sessions are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres(String),
}

/// Authgate HTTP server
#[derive(Parser, Clone)]
#[command(name = "authgate-server")]
#[command(about = "Registration, login and rotating refresh-token sessions over HTTP")]
#[command(version)]
pub struct ServerConfig {
    /// Postgres connection string, or memory:// for the in-process store
    #[arg(long, env = "DATABASE_URL", default_value = MEMORY_SCHEME)]
    pub database_url: String,

    /// HMAC secret for signing tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Server bind address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    #[arg(long, env = "ACCESS_TOKEN_TTL_SECS", default_value_t = 3600)]
    pub access_token_ttl_secs: u64,

    #[arg(long, env = "REFRESH_TOKEN_TTL_SECS", default_value_t = 604_800)]
    pub refresh_token_ttl_secs: u64,

    /// Idle window after which a user's sessions are pruned at login
    #[arg(long, env = "SESSION_EXPIRATION_SECS", default_value_t = 3600)]
    pub session_expiration_secs: u64,

    /// bcrypt work factor
    #[arg(long, env = "PASSWORD_HASH_COST", default_value_t = auth_identity::DEFAULT_PASSWORD_HASH_COST)]
    pub password_hash_cost: u32,

    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Interval between expired-session sweeps; 0 disables the sweeper
    #[arg(long, env = "SESSION_REAPER_INTERVAL_SECS", default_value_t = 900)]
    pub session_reaper_interval_secs: u64,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 10)]
    pub database_max_connections: u32,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// pretty or json
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("database_url", &self.store_backend_label())
            .field("jwt_secret", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("session_expiration_secs", &self.session_expiration_secs)
            .field("password_hash_cost", &self.password_hash_cost)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field(
                "session_reaper_interval_secs",
                &self.session_reaper_interval_secs,
            )
            .field("database_max_connections", &self.database_max_connections)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl ServerConfig {
    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        let durations = [
            ("ACCESS_TOKEN_TTL_SECS", self.access_token_ttl_secs),
            ("REFRESH_TOKEN_TTL_SECS", self.refresh_token_ttl_secs),
            ("SESSION_EXPIRATION_SECS", self.session_expiration_secs),
            ("REQUEST_TIMEOUT_SECS", self.request_timeout_secs),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, secs)| *secs == 0) {
            return Err(ConfigError::ZeroDuration(*name));
        }
        self.store_backend()?;
        self.socket_addr()?;
        Ok(())
    }

    pub fn store_backend(&self) -> Result<StoreBackend, ConfigError> {
        let url = self.database_url.trim();
        if url == MEMORY_SCHEME {
            Ok(StoreBackend::Memory)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(StoreBackend::Postgres(url.to_string()))
        } else {
            let scheme = url.split("://").next().unwrap_or_default();
            Err(ConfigError::UnsupportedDatabase(scheme.to_string()))
        }
    }

    fn store_backend_label(&self) -> &'static str {
        match self.store_backend() {
            Ok(StoreBackend::Memory) => "memory",
            Ok(StoreBackend::Postgres(_)) => "postgres",
            Err(_) => "unsupported",
        }
    }

    pub fn identity_config(&self) -> IdentityConfig {
        IdentityConfig::new(self.jwt_secret.clone())
            .with_token_ttls(
                Duration::from_secs(self.access_token_ttl_secs),
                Duration::from_secs(self.refresh_token_ttl_secs),
            )
            .with_session_expiration(Duration::from_secs(self.session_expiration_secs))
            .with_password_hash_cost(self.password_hash_cost)
    }

    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            log_level: self.log_level.clone(),
            format: self.log_format,
            include_target: true,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `None` when the sweeper is disabled
    pub fn session_reaper_interval(&self) -> Option<Duration> {
        (self.session_reaper_interval_secs > 0)
            .then(|| Duration::from_secs(self.session_reaper_interval_secs))
    }

    pub fn has_weak_secret(&self) -> bool {
        self.jwt_secret.len() < MIN_RECOMMENDED_SECRET_LEN
    }
}
