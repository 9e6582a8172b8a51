//! Postgres-backed credential and session stores
//!
//! Queries are checked at runtime so the crate builds without a live database.
//! The schema lives in `migrations/` and is applied by [`run_migrations`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{NewUser, Session, User, UserCredentials, UserUpdate};
use crate::repository::{expiry_cutoff, SessionRepository, StoreResult, UserRepository};

/// Bound on waiting for a pooled connection
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

const USER_COLUMNS: &str = "id, name, email, created_at, updated_at";
const SESSION_COLUMNS: &str = "id, user_id, token, created_at, updated_at";

/// Create a connection pool
pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

    info!(max_connections, "Database connection pool created");
    Ok(pool)
}

/// Apply pending schema migrations
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Database(e.into()))?;
    info!("Database migrations applied");
    Ok(())
}

/// Check if the pool can still serve a query
pub async fn is_healthy(pool: &PgPool) -> bool {
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => true,
        Err(e) => {
            warn!("Database health check failed: {}", e);
            false
        }
    }
}

/// Unique violations become `on_conflict`; anything else stays a database error
fn map_write_error(error: sqlx::Error, on_conflict: StoreError) -> StoreError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => on_conflict,
        _ => StoreError::Database(error),
    }
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CredentialsRow> for UserCredentials {
    fn from(row: CredentialsRow) -> Self {
        Self {
            user: User {
                id: row.id,
                name: row.name,
                email: row.email,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            password_hash: SecretString::new(row.password_hash),
        }
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, CredentialsRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserCredentials::from))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, name, email, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, StoreError::DuplicateEmail))?;
        Ok(created)
    }

    async fn update(&self, id: Uuid, update: UserUpdate) -> StoreResult<Option<User>> {
        let updated = sqlx::query_as::<_, User>(&format!(
            "UPDATE users \
             SET name = COALESCE($2, name), email = COALESCE($3, email), updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, StoreError::DuplicateEmail))?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, user_id: Uuid, token: &str) -> StoreResult<Session> {
        let session = sqlx::query_as::<_, Session>(&format!(
            "INSERT INTO sessions (id, user_id, token) \
             VALUES ($1, $2, $3) \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, StoreError::DuplicateSession))?;
        Ok(session)
    }

    async fn find_by_token(&self, token: &str) -> StoreResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    async fn delete_by_token(&self, token: &str) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_by_user(&self, user_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, user_id: Uuid, max_age: Duration) -> StoreResult<u64> {
        let Some(cutoff) = expiry_cutoff(max_age) else {
            return Ok(0);
        };
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND updated_at < $2")
            .bind(user_id)
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_expired_all(&self, max_age: Duration) -> StoreResult<u64> {
        let Some(cutoff) = expiry_cutoff(max_age) else {
            return Ok(0);
        };
        let result = sqlx::query("DELETE FROM sessions WHERE updated_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
