//! Periodic dashboard refresh bound to an owner's lifetime

use super::DashboardOrchestrator;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Owns the refresh task. Dropping it stops the task.
pub struct RefreshHandle {
    orchestrator: DashboardOrchestrator,
    visible: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl DashboardOrchestrator {
    /// Refresh immediately, then every `period` while visible.
    pub fn start(&self, period: Duration) -> RefreshHandle {
        let (visible, visibility) = watch::channel(true);
        info!(role = %self.role(), period_secs = period.as_secs(), "Starting dashboard refresh");
        let task = tokio::spawn(run(self.clone(), period, visibility));
        RefreshHandle {
            orchestrator: self.clone(),
            visible,
            task,
        }
    }
}

impl RefreshHandle {
    /// Suspend ticking while hidden; becoming visible refreshes at once.
    pub fn set_visible(&self, visible: bool) {
        self.visible.send_if_modified(|current| {
            let changed = *current != visible;
            *current = visible;
            changed
        });
    }

    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop ticking and drop results still in flight.
    pub fn stop(&self) {
        if !self.task.is_finished() {
            info!(role = %self.orchestrator.role(), "Stopping dashboard refresh");
        }
        self.orchestrator.invalidate();
        self.task.abort();
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(orchestrator: DashboardOrchestrator, period: Duration, mut visible: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        if *visible.borrow_and_update() {
            tokio::select! {
                _ = ticker.tick() => orchestrator.refresh_all().await,
                changed = visible.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        } else {
            debug!("Dashboard hidden, refresh suspended");
            if visible.changed().await.is_err() {
                break;
            }
            if *visible.borrow() {
                debug!("Dashboard visible again, refreshing");
                ticker.reset_immediately();
            }
        }
    }
}
