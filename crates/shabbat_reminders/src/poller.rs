//! Polling Scheduler
//!
//! One background task that runs a reminder sweep per tick. The sweep runs
//! inside the loop body, so ticks never overlap; ticks missed while a sweep
//! was running are skipped rather than replayed.

use chrono::Utc;
use shabbat_common::logging::log_error;
use shabbat_common::services::BoxFuture;
use shabbat_common::ShabbatError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::engine::{ReminderService, SweepSummary};

/// Work done on every tick.
pub trait SweepTask: Send + Sync + 'static {
    fn run_sweep(&self) -> BoxFuture<'_, SweepSummary, ShabbatError>;
}

impl SweepTask for ReminderService {
    fn run_sweep(&self) -> BoxFuture<'_, SweepSummary, ShabbatError> {
        Box::pin(self.sweep(Utc::now()))
    }
}

/// Stop handle for a running poller. Dropping it also stops the poller.
#[derive(Debug)]
pub struct PollingHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollingHandle {
    /// Halts future ticks. A sweep already running is left to finish.
    pub fn stop(&self) {
        // send fails only when the task is already gone
        let _ = self.stop_tx.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the poller and waits for the in-flight sweep, if any.
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.task.await {
            log_error(e, "Reminder poller task ended abnormally");
        }
    }
}

/// Spawns the poller on the current runtime. The first sweep runs immediately.
pub fn start_reminder_polling<T: SweepTask>(task: Arc<T>, interval: Duration) -> PollingHandle {
    let (stop_tx, mut stop_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Reminder poller started, interval {:?}", interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match task.run_sweep().await {
                        Ok(summary) => debug!("Sweep finished: {:?}", summary),
                        Err(e) => log_error(e, "Reminder sweep failed"),
                    }
                }
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Reminder poller stopped");
    });

    PollingHandle {
        stop_tx,
        task: handle,
    }
}
