use anyhow::{Context, Result};
use auth_identity::{
    postgres, AuthService, InMemorySessionRepository, InMemoryUserRepository,
    PgSessionRepository, PgUserRepository, SessionRepository, TokenIssuer, UserRepository,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::config::{ServerConfig, StoreBackend};

/// Main Authgate server state, shared by every handler
#[derive(Clone)]
pub struct AuthgateServer {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Register/login/refresh/logout operations
    pub auth_service: Arc<AuthService>,
    /// Verifies bearer tokens on protected routes
    pub token_issuer: Arc<TokenIssuer>,
    /// Present only with the Postgres backend
    pub db_pool: Option<PgPool>,
    started_at: Instant,
}

impl AuthgateServer {
    /// Create a server instance on the configured store backend
    pub async fn new(config: ServerConfig) -> Result<Self> {
        config.validate()?;

        match config.store_backend()? {
            StoreBackend::Memory => {
                info!("Using in-memory user and session stores");
                Self::new_in_memory(config)
            }
            StoreBackend::Postgres(url) => {
                let pool = postgres::connect(&url, config.database_max_connections)
                    .await
                    .context("connect to database")?;
                postgres::run_migrations(&pool)
                    .await
                    .context("apply database migrations")?;

                let users = Arc::new(PgUserRepository::new(pool.clone()));
                let sessions = Arc::new(PgSessionRepository::new(pool.clone()));
                let mut server = Self::with_stores(config, users, sessions)?;
                server.db_pool = Some(pool);
                Ok(server)
            }
        }
    }

    /// Server backed by process-local stores; state is lost on restart
    pub fn new_in_memory(config: ServerConfig) -> Result<Self> {
        Self::with_stores(
            config,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemorySessionRepository::new()),
        )
    }

    pub fn with_stores(
        config: ServerConfig,
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Result<Self> {
        let identity = config.identity_config();
        let auth_service = AuthService::from_config(users, sessions, &identity)
            .context("build authentication service")?;
        let token_issuer = auth_service.token_issuer();

        Ok(Self {
            config: Arc::new(config),
            auth_service: Arc::new(auth_service),
            token_issuer,
            db_pool: None,
            started_at: Instant::now(),
        })
    }

    /// Seconds since the server state was built
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
