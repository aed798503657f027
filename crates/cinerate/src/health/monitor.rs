//! Periodic health checks on a user-selected interval.

use log::{debug, info, warn};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::HealthInterval;
use crate::models::{CheckStatus, HealthReport, OverallHealth};

use super::aggregator::HealthAggregator;

/// Runs [`HealthAggregator::check_once`] on a timer and publishes the latest
/// report. The first check runs immediately.
pub struct HealthMonitor {
    interval_tx: watch::Sender<HealthInterval>,
    report_rx: watch::Receiver<Option<HealthReport>>,
    trigger_tx: broadcast::Sender<()>,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl HealthMonitor {
    /// Spawns the check loop on the current runtime.
    pub fn start(aggregator: HealthAggregator, interval: HealthInterval) -> Self {
        let (interval_tx, interval_rx) = watch::channel(interval);
        let (report_tx, report_rx) = watch::channel(None);
        let (trigger_tx, trigger_rx) = broadcast::channel(16);
        let token = CancellationToken::new();

        let task = tokio::spawn(run_loop(
            aggregator,
            interval_rx,
            report_tx,
            trigger_rx,
            token.clone(),
        ));
        info!("Health monitor started ({:?})", interval);

        Self {
            interval_tx,
            report_rx,
            trigger_tx,
            token,
            task,
        }
    }

    pub fn latest(&self) -> Option<HealthReport> {
        self.report_rx.borrow().clone()
    }

    /// A receiver notified whenever a new report is published.
    pub fn subscribe(&self) -> watch::Receiver<Option<HealthReport>> {
        self.report_rx.clone()
    }

    pub fn interval(&self) -> HealthInterval {
        *self.interval_tx.borrow()
    }

    /// Switches to a new interval; the ticker restarts from now.
    pub fn set_interval(&self, interval: HealthInterval) {
        self.interval_tx.send_if_modified(|current| {
            if *current == interval {
                return false;
            }
            *current = interval;
            true
        });
    }

    /// Requests an immediate check.
    pub fn trigger(&self) {
        let _ = self.trigger_tx.send(());
    }

    /// Signals the loop to stop. A check already running completes.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Stops the loop and waits for it to exit.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            if e.is_panic() {
                std::panic::resume_unwind(e.into_panic());
            }
        }
    }
}

fn ticker(interval: HealthInterval) -> Interval {
    let mut ticker = tokio::time::interval(interval.as_duration());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn run_loop(
    aggregator: HealthAggregator,
    mut interval_rx: watch::Receiver<HealthInterval>,
    report_tx: watch::Sender<Option<HealthReport>>,
    mut trigger_rx: broadcast::Receiver<()>,
    token: CancellationToken,
) {
    let mut interval_timer = ticker(*interval_rx.borrow_and_update());

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            changed = interval_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let interval = *interval_rx.borrow_and_update();
                info!("Health check interval set to {:?}", interval);
                interval_timer = ticker(interval);
                interval_timer.tick().await; // skip immediate first tick
                continue;
            }
            Ok(()) = trigger_rx.recv() => {
                info!("Manual health check triggered");
            }
            _ = interval_timer.tick() => {}
        }

        let span = tracing::info_span!("health_check");
        let report = aggregator.check_once().instrument(span).await;
        match report.overall {
            OverallHealth::Healthy => debug!("Health: healthy"),
            overall => warn!(
                "Health: {:?} ({} checks not ok)",
                overall,
                report
                    .checks
                    .iter()
                    .filter(|c| c.status != CheckStatus::Ok)
                    .count()
            ),
        }
        report_tx.send_replace(Some(report));
    }

    info!("Health monitor stopped");
}
