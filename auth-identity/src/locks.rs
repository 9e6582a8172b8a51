use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per-user async mutexes serialising session rotation.
///
/// Login and refresh both delete-then-create; holding the user's lock across
/// that pair keeps two rotations for the same user from interleaving.
#[derive(Debug, Default)]
pub struct RotationLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

/// Held for the duration of one rotation. Dropping it releases the user's lock
/// and forgets the entry when nobody else is waiting on it.
pub struct RotationGuard<'a> {
    owner: &'a RotationLocks,
    user_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl RotationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, user_id: Uuid) -> RotationGuard<'_> {
        let mutex = self
            .locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        // Built before waiting so a cancelled waiter still cleans up its entry
        let mut pending = RotationGuard {
            owner: self,
            user_id,
            guard: None,
        };
        pending.guard = Some(mutex.lock_owned().await);
        pending
    }

    /// Users with a lock entry currently alive
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for RotationGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map still references the mutex once every holder and waiter is gone
        self.owner
            .locks
            .remove_if(&self.user_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
