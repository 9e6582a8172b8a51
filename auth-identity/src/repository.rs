use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{NewUser, Session, User, UserCredentials, UserUpdate};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Credential store. Email uniqueness is enforced here, at write time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// The only read path that returns the password hash
    async fn find_credentials_by_email(&self, email: &str)
        -> StoreResult<Option<UserCredentials>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// Fails with [`StoreError::DuplicateEmail`] if the email is already present
    async fn create(&self, user: NewUser) -> StoreResult<User>;
    async fn update(&self, id: Uuid, update: UserUpdate) -> StoreResult<Option<User>>;
    async fn delete(&self, id: Uuid) -> StoreResult<u64>;
}

/// Session store. Deletions report how many rows went away; zero is not an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, token: &str) -> StoreResult<Session>;
    async fn find_by_token(&self, token: &str) -> StoreResult<Option<Session>>;
    async fn delete_by_token(&self, token: &str) -> StoreResult<u64>;
    async fn delete_by_user(&self, user_id: Uuid) -> StoreResult<u64>;
    /// Remove this user's sessions last updated strictly before `now - max_age`
    async fn delete_expired(&self, user_id: Uuid, max_age: Duration) -> StoreResult<u64>;
    /// Same rule across every user, for the background reaper
    async fn delete_expired_all(&self, max_age: Duration) -> StoreResult<u64>;
}

/// `now - max_age`, or `None` when that predates the representable range
pub(crate) fn expiry_cutoff(max_age: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(max_age)
        .ok()
        .and_then(|age| Utc::now().checked_sub_signed(age))
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// In-process credential store for development and tests
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, StoredUser>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|stored| stored.user.email == email)
            .map(|stored| stored.user.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Option<UserCredentials>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|stored| stored.user.email == email)
            .map(|stored| UserCredentials {
                user: stored.user.clone(),
                password_hash: SecretString::new(stored.password_hash.clone()),
            }))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).map(|stored| stored.user.clone()))
    }

    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|stored| stored.user.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            created_at: now,
            updated_at: now,
        };
        users.insert(
            created.id,
            StoredUser {
                user: created.clone(),
                password_hash: user.password_hash,
            },
        );
        Ok(created)
    }

    async fn update(&self, id: Uuid, update: UserUpdate) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;

        if let Some(email) = &update.email {
            let taken = users
                .values()
                .any(|stored| stored.user.id != id && &stored.user.email == email);
            if taken {
                return Err(StoreError::DuplicateEmail);
            }
        }

        let Some(stored) = users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            stored.user.name = name;
        }
        if let Some(email) = update.email {
            stored.user.email = email;
        }
        stored.user.updated_at = Utc::now();
        Ok(Some(stored.user.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<u64> {
        let mut users = self.users.write().await;
        Ok(u64::from(users.remove(&id).is_some()))
    }
}

/// In-process session store, keyed by token
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Sessions currently held for `user_id`
    pub async fn count_for_user(&self, user_id: Uuid) -> usize {
        let sessions = self.sessions.read().await;
        sessions.values().filter(|s| s.user_id == user_id).count()
    }

    async fn retain(&self, keep: impl Fn(&Session) -> bool + Send) -> u64 {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| keep(session));
        (before - sessions.len()) as u64
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, user_id: Uuid, token: &str) -> StoreResult<Session> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            token: token.to_string(),
            created_at: now,
            updated_at: now,
        };
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(token) {
            return Err(StoreError::DuplicateSession);
        }
        sessions.insert(session.token.clone(), session.clone());
        Ok(session)
    }

    async fn find_by_token(&self, token: &str) -> StoreResult<Option<Session>> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn delete_by_token(&self, token: &str) -> StoreResult<u64> {
        let mut sessions = self.sessions.write().await;
        Ok(u64::from(sessions.remove(token).is_some()))
    }

    async fn delete_by_user(&self, user_id: Uuid) -> StoreResult<u64> {
        Ok(self.retain(|session| session.user_id != user_id).await)
    }

    async fn delete_expired(&self, user_id: Uuid, max_age: Duration) -> StoreResult<u64> {
        let Some(cutoff) = expiry_cutoff(max_age) else {
            return Ok(0);
        };
        Ok(self
            .retain(|session| session.user_id != user_id || session.updated_at >= cutoff)
            .await)
    }

    async fn delete_expired_all(&self, max_age: Duration) -> StoreResult<u64> {
        let Some(cutoff) = expiry_cutoff(max_age) else {
            return Ok(0);
        };
        Ok(self.retain(|session| session.updated_at >= cutoff).await)
    }
}
