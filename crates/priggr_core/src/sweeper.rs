//! Periodic removal of pastes whose deadline has passed.

use crate::db::Database;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Counts from a single sweep cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Ids the expiry index reported as past their deadline.
    pub expired: usize,
    /// Rows this cycle actually removed.
    pub deleted: usize,
    /// Index reads or deletes that failed.
    pub failed: usize,
}

/// Background task that deletes expired pastes on a fixed period.
#[derive(Clone)]
pub struct ExpirationSweeper {
    db: Arc<Database>,
    interval: Duration,
}

impl ExpirationSweeper {
    pub fn new(db: Arc<Database>, interval: Duration) -> Self {
        Self { db, interval }
    }

    /// Delete every paste whose deadline is at or before `now`.
    ///
    /// Each id is deleted in its own transaction; a failure is logged and
    /// counted, and the cycle moves on to the next id.
    pub fn sweep_once(&self, now: DateTime<Utc>) -> SweepReport {
        let pastes = &self.db.pastes;
        let report = run_cycle(pastes.list_expired(now), |id| pastes.delete(id));
        if report.expired > 0 || report.failed > 0 {
            tracing::info!(
                "Expiration sweep: {} expired, {} deleted, {} failed",
                report.expired,
                report.deleted,
                report.failed
            );
        }
        report
    }

    /// Start the periodic sweep on the current tokio runtime.
    ///
    /// The first cycle runs one full interval after spawning.
    pub fn spawn(self) -> SweeperHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let task = tokio::spawn(self.run(shutdown_rx));
        SweeperHandle { shutdown_tx, task }
    }

    async fn run(self, mut shutdown_rx: mpsc::Receiver<()>) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::debug!("Expiration sweeper started (every {:?})", self.interval);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::debug!("Expiration sweeper received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    let sweeper = self.clone();
                    let cycle = tokio::task::spawn_blocking(move || sweeper.sweep_once(Utc::now()));
                    if let Err(err) = cycle.await {
                        tracing::error!("Expiration sweep cycle panicked: {}", err);
                    }
                }
            }
        }
    }
}

/// Owner of a running sweeper task.
pub struct SweeperHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the sweeper to stop and wait for it to exit.
    ///
    /// A cycle already in progress is allowed to finish first.
    pub async fn shutdown(self) {
        // A send error means the task is already gone; joining still applies.
        let _ = self.shutdown_tx.send(()).await;
        if let Err(err) = self.task.await {
            tracing::warn!("Expiration sweeper exited abnormally: {}", err);
        }
    }
}

fn run_cycle<I, D>(ids: I, mut delete: D) -> SweepReport
where
    I: IntoIterator<Item = Result<String, AppError>>,
    D: FnMut(&str) -> Result<bool, AppError>,
{
    let mut report = SweepReport::default();
    for id in ids {
        let id = match id {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!("Failed to read expiry index: {}", err);
                report.failed += 1;
                continue;
            }
        };
        report.expired += 1;
        match delete(&id) {
            Ok(true) => report.deleted += 1,
            // Already consumed by a concurrent fetch.
            Ok(false) => {}
            Err(err) => {
                tracing::warn!("Failed to delete expired paste {}: {}", id, err);
                report.failed += 1;
            }
        }
    }
    report
}
