//! Session sweeper.
//!
//! Periodically closes sessions that outlived their TTL and drops
//! submission rate-limit buckets that have refilled.

use crate::api::RateLimitState;
use crate::session::SessionRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Shortest accepted sweep interval.
const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Background task that keeps the session registry bounded.
pub struct SessionSweeper {
    sessions: Arc<RwLock<SessionRegistry>>,
    rate_limit: RateLimitState,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(
        sessions: Arc<RwLock<SessionRegistry>>,
        rate_limit: RateLimitState,
        interval: Duration,
    ) -> Self {
        Self {
            sessions,
            rate_limit,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    /// Run a single sweep, returning how many sessions were closed.
    pub async fn sweep_once(&self) -> usize {
        let removed = self.sessions.write().await.prune_expired();
        self.rate_limit.retain_recent();
        removed
    }

    /// Run the sweeper until the task is aborted.
    pub async fn run(&self) {
        info!(interval = ?self.interval, "Starting session sweeper");

        loop {
            tokio::time::sleep(self.interval).await;

            let removed = self.sweep_once().await;
            if removed == 0 {
                debug!("No expired sessions this cycle");
            } else {
                info!(removed, "Expired sessions closed");
            }
        }
    }
}

/// Spawn the session sweeper as a background task.
pub fn spawn_sweeper(
    sessions: Arc<RwLock<SessionRegistry>>,
    rate_limit: RateLimitState,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    let sweeper = SessionSweeper::new(sessions, rate_limit, interval);

    tokio::spawn(async move {
        sweeper.run().await;
    })
}
