use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::reconcile::{ReconcileError, ReconciliationEngine, RunSummary};

pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Wall clock in the server's local time zone.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Runs a reconciliation pass on every tick. A pass is awaited before the
/// next tick is taken, so passes never overlap.
pub struct Scheduler {
    engine: ReconciliationEngine,
    interval: Duration,
    timeout: Duration,
    clock: Clock,
}

impl Scheduler {
    pub fn new(
        engine: ReconciliationEngine,
        interval: Duration,
        timeout: Duration,
        clock: Clock,
    ) -> Self {
        Self {
            engine,
            interval,
            timeout,
            clock,
        }
    }

    pub async fn tick(&self) -> Result<RunSummary, ReconcileError> {
        self.engine.run_bounded((self.clock)(), self.timeout).await
    }

    pub async fn run(self) {
        info!(
            interval = ?self.interval,
            timeout = ?self.timeout,
            "reconciliation scheduler started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            // Next tick re-evaluates everything, no retry here.
            if let Err(e) = self.tick().await {
                error!(error = %e, "reconciliation pass failed");
            }
        }
    }
}
