//! Periodic removal of sessions whose refresh token can no longer be used

use auth_identity::AuthService;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use logger_redacted::redacted_warn;
use tracing::{debug, info};

/// Start the sweeper; `None` interval leaves it off
pub fn spawn_session_reaper(
    service: Arc<AuthService>,
    every: Option<Duration>,
) -> Option<JoinHandle<()>> {
    let every = every?;
    info!(interval_secs = every.as_secs(), "Session reaper started");

    Some(tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match service.reap_expired_sessions().await {
                Ok(removed) => debug!(removed, "Session sweep finished"),
                Err(e) => redacted_warn!("Session sweep failed: {e}"),
            }
        }
    }))
}
