use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::Captures;
use sha2::{Digest, Sha256};

mod patterns {
    // Literal patterns, compiled once; a failure here is a typo caught by the tests below.
    #![allow(clippy::unwrap_used)]

    use lazy_static::lazy_static;
    use regex::Regex;

    lazy_static! {
        pub static ref EMAIL_REGEX: Regex =
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
        pub static ref BEARER_REGEX: Regex =
            Regex::new(r"(?i)\bbearer\s+[A-Za-z0-9._~+/=-]+").unwrap();
        pub static ref JWT_REGEX: Regex =
            Regex::new(r"\beyJ[A-Za-z0-9_-]*\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+").unwrap();
    }
}

use patterns::{BEARER_REGEX, EMAIL_REGEX, JWT_REGEX};

lazy_static! {
    static ref DEFAULT_REDACTOR: PiiRedactor = PiiRedactor::new(RedactionConfig::default());
    static ref CORRELATING_REDACTOR: PiiRedactor = PiiRedactor::new(RedactionConfig {
        hash_for_correlation: true,
        ..RedactionConfig::default()
    });
}

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_bearer_tokens: bool,
    pub redact_jwts: bool,
    /// Replace matches with a short digest instead of a mask, so the same
    /// value can still be correlated across log lines
    pub hash_for_correlation: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_bearer_tokens: true,
            redact_jwts: true,
            hash_for_correlation: false,
        }
    }
}

/// Redactor for log messages
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        // Bearer headers first, so the token inside is not half-matched as a JWT
        if self.config.redact_bearer_tokens {
            result = self.redact_bearer_tokens(&result);
        }

        if self.config.redact_jwts {
            result = self.redact_jwts(&result);
        }

        if self.config.redact_emails {
            result = self.redact_emails(&result);
        }

        result
    }

    fn redact_emails(&self, text: &str) -> String {
        EMAIL_REGEX
            .replace_all(text, |caps: &Captures| {
                let email = caps.get(0).map_or("", |m| m.as_str());
                if self.config.hash_for_correlation {
                    format!("EMAIL[{}]", hash_value(email))
                } else {
                    mask_email(email)
                }
            })
            .to_string()
    }

    fn redact_bearer_tokens(&self, text: &str) -> String {
        BEARER_REGEX
            .replace_all(text, |caps: &Captures| {
                if self.config.hash_for_correlation {
                    let token = caps.get(0).map_or("", |m| m.as_str());
                    format!("Bearer TOKEN[{}]", hash_value(token))
                } else {
                    "Bearer [REDACTED]".to_string()
                }
            })
            .to_string()
    }

    fn redact_jwts(&self, text: &str) -> String {
        JWT_REGEX
            .replace_all(text, |caps: &Captures| {
                if self.config.hash_for_correlation {
                    let token = caps.get(0).map_or("", |m| m.as_str());
                    format!("JWT[{}]", hash_value(token))
                } else {
                    "[JWT]".to_string()
                }
            })
            .to_string()
    }
}

/// Redact `text` with the default configuration
pub fn redact(text: &str) -> String {
    DEFAULT_REDACTOR.redact(text)
}

/// Redact `text`, replacing each match with a stable digest.
///
/// The same address always yields the same `EMAIL[..]` tag, so repeated
/// events for one account can be grouped without logging the address.
pub fn redact_for_correlation(text: &str) -> String {
    CORRELATING_REDACTOR.redact(text)
}

/// Mask a single email address for logging: `john.doe@example.com` becomes `j***@e***`.
///
/// Input that is not shaped like an address is masked completely.
pub fn redact_email(email: &str) -> String {
    mask_email(email.trim())
}

fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            let first_local = local.chars().next().unwrap_or('*');
            let first_domain = domain.chars().next().unwrap_or('*');
            format!("{first_local}***@{first_domain}***")
        }
        _ => "***@***".to_string(),
    }
}

fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    // First 8 bytes are enough for correlation
    general_purpose::STANDARD.encode(digest.get(..8).unwrap_or_default())
}
