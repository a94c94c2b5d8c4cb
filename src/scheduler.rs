//! Periodic background refresh of the rate cache.

use crate::service::CurrencyService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Shortest period between passes. `tokio::time::interval` panics on zero.
const MIN_PERIOD: Duration = Duration::from_secs(1);

pub struct RefreshScheduler {
    service: Arc<CurrencyService>,
    period: Duration,
    run_on_startup: bool,
}

impl RefreshScheduler {
    pub fn new(service: Arc<CurrencyService>, period: Duration) -> Self {
        if period < MIN_PERIOD {
            warn!(period_ms = period.as_millis() as u64, "Refresh period too short, using 1s");
        }
        Self {
            service,
            period: period.max(MIN_PERIOD),
            run_on_startup: true,
        }
    }

    /// Whether the first pass runs right away or one period after start.
    pub fn run_on_startup(mut self, enabled: bool) -> Self {
        self.run_on_startup = enabled;
        self
    }

    /// Spawns the refresh loop on the current tokio runtime.
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let start = if self.run_on_startup {
            Instant::now()
        } else {
            Instant::now() + self.period
        };

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(start, self.period);
            // A slow pass pushes the schedule back instead of bursting
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period_secs = self.period.as_secs(), "Refresh scheduler started");

            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = shutdown_rx.changed() => break,
                }

                debug!("Scheduled refresh triggered");
                match self.service.refresh_exchange_rates().await {
                    Ok(report) if report.is_complete() => {
                        debug!(refreshed = report.refreshed.len(), "Scheduled refresh complete");
                    }
                    Ok(report) => {
                        error!(
                            refreshed = report.refreshed.len(),
                            failed = report.failures.len(),
                            "Scheduled refresh finished with failures"
                        );
                    }
                    Err(e) => error!(error = %e, "Scheduled refresh could not list currencies"),
                }

                if *shutdown_rx.borrow() {
                    break;
                }
            }
            info!("Refresh scheduler stopped");
        });

        SchedulerHandle { shutdown_tx, task }
    }
}

pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stops the loop and waits for it. A pass in progress runs to completion first.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "Refresh scheduler task failed");
        }
    }
}
