// Signed access and refresh tokens

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::config::IdentityConfig;
use crate::error::TokenError;
use crate::models::TokenPair;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims carried by both token kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user id)
    pub sub: Uuid,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
    /// Unique per token, so two tokens minted in the same second still differ
    pub jti: Uuid,
    pub typ: TokenKind,
    pub iss: String,
}

/// What a successful verification vouches for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: Uuid,
    pub expires_at: DateTime<Utc>,
    pub kind: TokenKind,
}

/// Stateless HS256 issuer and verifier.
///
/// Knows nothing about sessions: a token that verifies here may still have
/// been rotated away, which is the session store's concern.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &IdentityConfig) -> Self {
        let secret = config.jwt_secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: config.issuer.clone(),
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
        }
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn issue_access(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue(user_id, TokenKind::Access, self.access_ttl)
    }

    pub fn issue_refresh(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue(user_id, TokenKind::Refresh, self.refresh_ttl)
    }

    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access(user_id)?,
            refresh_token: self.issue_refresh(user_id)?,
        })
    }

    /// Check signature, expiry (no leeway), issuer and kind
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<VerifiedToken, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })?
            .claims;

        if claims.typ != expected {
            return Err(TokenError::WrongKind {
                expected,
                found: claims.typ,
            });
        }

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(TokenError::Malformed)?;

        Ok(VerifiedToken {
            subject: claims.sub,
            expires_at,
            kind: claims.typ,
        })
    }

    fn issue(&self, user_id: Uuid, kind: TokenKind, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = TokenClaims {
            sub: user_id,
            iat: now,
            exp: now.saturating_add(ttl_secs),
            jti: Uuid::new_v4(),
            typ: kind,
            iss: self.issuer.clone(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

/// Digest persisted in place of a refresh token (SHA-256, base64)
pub fn token_digest(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    general_purpose::STANDARD.encode(digest)
}
