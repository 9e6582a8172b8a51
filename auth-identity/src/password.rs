use secrecy::{ExposeSecret, SecretString};

use crate::error::PasswordError;

/// bcrypt only reads this many bytes of input; anything past it is ignored
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Salted bcrypt hashing.
///
/// Both operations are CPU-bound and run on the blocking pool so they never
/// stall the async executor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        if !(4..=31).contains(&cost) {
            return Err(PasswordError::InvalidCost(cost));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Refuses input longer than [`MAX_PASSWORD_BYTES`] instead of truncating it
    pub async fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::TooLong(MAX_PASSWORD_BYTES));
        }
        let cost = self.cost;
        let plaintext = plaintext.to_owned();

        tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
            .await
            .map_err(|e| PasswordError::Hashing(e.to_string()))?
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    /// `false` for any mismatch, including a stored hash that does not parse
    /// and input too long to have been hashed
    pub async fn verify(&self, plaintext: &str, hash: &SecretString) -> bool {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        let plaintext = plaintext.to_owned();
        let hash = hash.expose_secret().clone();

        tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hash).unwrap_or(false))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4).unwrap()
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("P@ss1234").await.unwrap();

        assert_ne!(hash, "P@ss1234");
        assert!(hash.starts_with("$2"));

        let stored = SecretString::new(hash);
        assert!(hasher.verify("P@ss1234", &stored).await);
        assert!(!hasher.verify("P@ss12345", &stored).await);
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let hasher = hasher();
        let first = hasher.hash("P@ss1234").await.unwrap();
        let second = hasher.hash("P@ss1234").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_malformed_hash_is_a_mismatch() {
        let stored = SecretString::new("not-a-bcrypt-hash".to_string());
        assert!(!hasher().verify("P@ss1234", &stored).await);
    }

    #[tokio::test]
    async fn test_input_past_bcrypt_limit_is_refused() {
        let hasher = hasher();
        let at_limit = "a".repeat(MAX_PASSWORD_BYTES);
        let stored = SecretString::new(hasher.hash(&at_limit).await.unwrap());
        assert!(hasher.verify(&at_limit, &stored).await);

        // Same first 72 bytes, different tail
        let longer = format!("{at_limit}WRONG");
        assert!(!hasher.verify(&longer, &stored).await);
        assert!(matches!(
            hasher.hash(&longer).await,
            Err(PasswordError::TooLong(MAX_PASSWORD_BYTES))
        ));
    }

    #[test]
    fn test_cost_bounds() {
        assert!(matches!(
            PasswordHasher::new(3),
            Err(PasswordError::InvalidCost(3))
        ));
        assert!(PasswordHasher::new(32).is_err());
        assert_eq!(PasswordHasher::new(12).unwrap().cost(), 12);
    }
}
