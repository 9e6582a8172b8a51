use logger_redacted::{redact_email, redact_for_correlation, redacted_error};
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::IdentityConfig;
use crate::error::{AuthError, PasswordError, Result, StoreError};
use crate::locks::RotationLocks;
use crate::models::{
    normalize_email, LoginRequest, LogoutResponse, NewUser, RefreshRequest, RegisterRequest,
    TokenPair, UserProfile,
};
use crate::password::PasswordHasher;
use crate::repository::{SessionRepository, UserRepository};
use crate::tokens::{token_digest, TokenIssuer, TokenKind};
use crate::validation::RequestValidation;

pub const LOGOUT_MESSAGE: &str = "Logged out successfully";

/// Plaintext behind the decoy hash checked for unknown emails
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Log the full cause server-side and hand back an opaque failure
fn internal(action: &'static str, cause: impl Into<anyhow::Error>) -> AuthError {
    let cause = cause.into();
    redacted_error!("Authentication backend failure during {action}: {cause:#}");
    AuthError::Internal(cause.context(action))
}

/// Register, login, refresh, logout and who-am-i over the two stores.
///
/// Every successful login or refresh leaves exactly one session for the user;
/// rotation for a given user is serialised through [`RotationLocks`].
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    hasher: PasswordHasher,
    tokens: Arc<TokenIssuer>,
    locks: RotationLocks,
    session_expiration: Duration,
    /// Hash at the configured cost, verified when the email is unknown so
    /// both login failures spend the same bcrypt time
    decoy_hash: OnceCell<SecretString>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        hasher: PasswordHasher,
        tokens: Arc<TokenIssuer>,
        session_expiration: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
            tokens,
            locks: RotationLocks::new(),
            session_expiration,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Build the hasher and token issuer from `config`
    pub fn from_config(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        config: &IdentityConfig,
    ) -> std::result::Result<Self, PasswordError> {
        let hasher = PasswordHasher::new(config.password_hash_cost)?;
        let tokens = Arc::new(TokenIssuer::new(config));
        Ok(Self::new(
            users,
            sessions,
            hasher,
            tokens,
            config.session_expiration,
        ))
    }

    pub fn token_issuer(&self) -> Arc<TokenIssuer> {
        Arc::clone(&self.tokens)
    }

    /// Compute the decoy hash up front so the first unknown-email login
    /// costs no more than any other
    pub async fn warm_up(&self) -> Result<()> {
        self.decoy_hash().await.map(|_| ())
    }

    async fn decoy_hash(&self) -> Result<&SecretString> {
        self.decoy_hash
            .get_or_try_init(|| async {
                self.hasher
                    .hash(DECOY_PASSWORD)
                    .await
                    .map(SecretString::new)
                    .map_err(|e| internal("hash decoy password", e))
            })
            .await
    }

    #[instrument(skip_all)]
    pub async fn register(&self, request: RegisterRequest) -> Result<TokenPair> {
        request.validate()?;

        let email = normalize_email(&request.email);
        let masked = redact_email(&email);
        info!(email = %masked, "Registering user");

        let existing = self
            .users
            .find_by_email(&email)
            .await
            .map_err(|e| internal("look up user", e))?;
        if existing.is_some() {
            warn!(email = %masked, "Registration rejected: email already registered");
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self
            .hasher
            .hash(&request.password)
            .await
            .map_err(|e| internal("hash password", e))?;

        let new_user = NewUser {
            name: request.name.trim().to_string(),
            email,
            password_hash,
        };
        let user = match self.users.create(new_user).await {
            Ok(user) => user,
            // Lost the race against a concurrent registration
            Err(StoreError::DuplicateEmail) => {
                warn!(email = %masked, "Registration rejected: email already registered");
                return Err(AuthError::EmailTaken);
            }
            Err(e) => return Err(internal("create user", e)),
        };

        let pair = self.issue_pair(user.id)?;
        self.store_session(user.id, &pair).await?;

        info!(user_id = %user.id, "User registered");
        Ok(pair)
    }

    #[instrument(skip_all)]
    pub async fn login(&self, request: LoginRequest) -> Result<TokenPair> {
        request.validate()?;

        let email = normalize_email(&request.email);
        let masked = redact_email(&email);

        let credentials = self
            .users
            .find_credentials_by_email(&email)
            .await
            .map_err(|e| internal("look up credentials", e))?;

        let Some(credentials) = credentials else {
            let decoy = self.decoy_hash().await?;
            let _ = self.hasher.verify(&request.password, decoy).await;
            warn!(
                email = %masked,
                account = %redact_for_correlation(&email),
                "Login failed"
            );
            return Err(AuthError::InvalidCredentials);
        };
        if !self
            .hasher
            .verify(&request.password, &credentials.password_hash)
            .await
        {
            warn!(
                email = %masked,
                account = %redact_for_correlation(&email),
                "Login failed"
            );
            return Err(AuthError::InvalidCredentials);
        }

        let user_id = credentials.user.id;
        let _rotation = self.locks.lock(user_id).await;

        let reaped = self
            .sessions
            .delete_expired(user_id, self.session_expiration)
            .await
            .map_err(|e| internal("reap expired sessions", e))?;
        let pair = self.rotate(user_id).await?;

        info!(user_id = %user_id, reaped, "User logged in");
        Ok(pair)
    }

    #[instrument(skip_all)]
    pub async fn refresh(&self, request: RefreshRequest) -> Result<TokenPair> {
        request.validate()?;

        let digest = token_digest(&request.refresh_token);
        let presented = self
            .sessions
            .find_by_token(&digest)
            .await
            .map_err(|e| internal("look up session", e))?;
        if presented.is_none() {
            warn!("Refresh rejected: no session for token");
            return Err(AuthError::InvalidRefreshToken);
        }

        let verified = self
            .tokens
            .verify(&request.refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                warn!(reason = %e, "Refresh rejected: token did not verify");
                AuthError::InvalidRefreshToken
            })?;
        let user_id = verified.subject;

        let _rotation = self.locks.lock(user_id).await;

        // Re-read under the lock: a concurrent rotation may have consumed it
        let session = self
            .sessions
            .find_by_token(&digest)
            .await
            .map_err(|e| internal("look up session", e))?;
        match session {
            Some(session) if session.user_id == user_id => {}
            _ => {
                warn!(user_id = %user_id, "Refresh rejected: session already rotated");
                return Err(AuthError::InvalidRefreshToken);
            }
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(|e| internal("look up user", e))?
            .ok_or(AuthError::UserNotFound)?;

        let pair = self.rotate(user.id).await?;

        info!(user_id = %user.id, "Refresh token rotated");
        Ok(pair)
    }

    #[instrument(skip_all)]
    pub async fn logout(&self, request: RefreshRequest) -> Result<LogoutResponse> {
        request.validate()?;

        let digest = token_digest(&request.refresh_token);
        let session = self
            .sessions
            .find_by_token(&digest)
            .await
            .map_err(|e| internal("look up session", e))?;
        let Some(session) = session else {
            warn!("Logout rejected: no session for token");
            return Err(AuthError::NotLoggedIn);
        };

        let removed = self
            .sessions
            .delete_by_token(&digest)
            .await
            .map_err(|e| internal("delete session", e))?;
        if removed == 0 {
            warn!(user_id = %session.user_id, "Logout rejected: session already gone");
            return Err(AuthError::NotLoggedIn);
        }

        info!(user_id = %session.user_id, "User logged out");
        Ok(LogoutResponse {
            message: LOGOUT_MESSAGE.to_string(),
        })
    }

    /// Public profile of an already-authenticated caller
    pub async fn whoami(&self, user_id: Uuid) -> Result<UserProfile> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(|e| internal("look up user", e))?
            .ok_or(AuthError::UserNotFound)?;
        Ok(UserProfile::from(user))
    }

    /// Remove every session whose refresh token has outlived its lifetime
    pub async fn reap_expired_sessions(&self) -> Result<u64> {
        let removed = self
            .sessions
            .delete_expired_all(self.tokens.refresh_ttl())
            .await
            .map_err(|e| internal("reap expired sessions", e))?;
        if removed > 0 {
            info!(removed, "Expired sessions reaped");
        }
        Ok(removed)
    }

    fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair> {
        self.tokens
            .issue_pair(user_id)
            .map_err(|e| internal("issue tokens", e))
    }

    async fn store_session(&self, user_id: Uuid, pair: &TokenPair) -> Result<()> {
        self.sessions
            .create(user_id, &token_digest(&pair.refresh_token))
            .await
            .map_err(|e| internal("create session", e))?;
        Ok(())
    }

    /// Issue a fresh pair and make it the user's only session.
    /// Callers hold the user's rotation lock.
    async fn rotate(&self, user_id: Uuid) -> Result<TokenPair> {
        let pair = self.issue_pair(user_id)?;
        self.sessions
            .delete_by_user(user_id)
            .await
            .map_err(|e| internal("delete sessions", e))?;
        self.store_session(user_id, &pair).await?;
        Ok(pair)
    }
}
