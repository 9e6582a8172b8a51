use secrecy::SecretString;
use std::time::Duration;

/// Default bcrypt cost for stored password hashes
pub const DEFAULT_PASSWORD_HASH_COST: u32 = 12;

pub const DEFAULT_ISSUER: &str = "authgate";

/// Tunables for the authentication core.
///
/// Built once at process start and handed to [`crate::TokenIssuer`],
/// [`crate::PasswordHasher`] and [`crate::AuthService`].
#[derive(Debug)]
pub struct IdentityConfig {
    /// HS256 signing secret shared by access and refresh tokens
    pub jwt_secret: SecretString,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// On login, this user's sessions untouched for longer than this are reaped
    pub session_expiration: Duration,
    pub password_hash_cost: u32,
    /// Value of the `iss` claim; tokens with any other issuer are rejected
    pub issuer: String,
}

impl IdentityConfig {
    /// Production defaults around the given secret
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: SecretString::new(jwt_secret.into()),
            access_token_ttl: Duration::from_secs(60 * 60),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            session_expiration: Duration::from_secs(60 * 60),
            password_hash_cost: DEFAULT_PASSWORD_HASH_COST,
            issuer: DEFAULT_ISSUER.to_string(),
        }
    }

    #[must_use]
    pub fn with_password_hash_cost(mut self, cost: u32) -> Self {
        self.password_hash_cost = cost;
        self
    }

    #[must_use]
    pub fn with_token_ttls(mut self, access: Duration, refresh: Duration) -> Self {
        self.access_token_ttl = access;
        self.refresh_token_ttl = refresh;
        self
    }

    #[must_use]
    pub fn with_session_expiration(mut self, window: Duration) -> Self {
        self.session_expiration = window;
        self
    }
}
