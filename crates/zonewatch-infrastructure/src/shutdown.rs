//! Graceful shutdown
//!
//! A root [`CancellationToken`] every long-running task listens to, and a
//! [`TaskTracker`] that lets shutdown wait for those tasks to finish.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

/// Coordinates cancellation and draining of service tasks
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    tracker: TaskTracker,
    grace: Duration,
}

impl ShutdownCoordinator {
    /// Coordinator waiting at most `grace` for tasks on shutdown
    pub fn new(grace: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            tracker: TaskTracker::new(),
            grace,
        }
    }

    /// Root token
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Tracker for spawned tasks
    pub fn tracker(&self) -> TaskTracker {
        self.tracker.clone()
    }

    /// Grace period
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Whether shutdown has begun
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel everything and wait for tracked tasks.
    ///
    /// Returns false if tasks were still running when the grace period ran out.
    pub async fn shutdown(&self) -> bool {
        self.token.cancel();
        self.tracker.close();
        let pending = self.tracker.len();
        info!(pending, "Waiting for tasks to finish");
        if tokio::time::timeout(self.grace, self.tracker.wait())
            .await
            .is_ok()
        {
            info!("All tasks finished");
            true
        } else {
            warn!(
                remaining = self.tracker.len(),
                grace_secs = self.grace.as_secs(),
                "Tasks still running after grace period"
            );
            false
        }
    }
}

/// Await a task spawned outside the tracker, logging a panic or abort.
///
/// Returns false when the task did not finish normally.
pub async fn join_task(name: &str, handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            error!(task = name, error = %e, "Background task failed");
            false
        }
    }
}
