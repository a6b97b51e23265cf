//! Poll loop driving a [`DeviceMonitor`] on a fixed interval
//!
//! Each cycle publishes a [`MonitorSnapshot`] on a `watch` channel so readers
//! (the web API, tests) always see the latest result without locking the
//! monitor.

use crate::fetcher::DeviceFetcher;
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::monitor::{DeviceMonitor, PollStats};
use crate::status::EffectiveStatus;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior, interval};

/// Version string baked in by the build script
pub const APP_VERSION: &str = env!("APP_VERSION");

/// Latest poll result plus loop bookkeeping
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub timestamp: String,
    pub version: &'static str,
    pub status: EffectiveStatus,
    pub stats: PollStats,
    pub poll_duration_ms: u64,
    pub overrun_count: u64,
    pub poll_interval_secs: u64,
}

pub type SnapshotSender = watch::Sender<Option<Arc<MonitorSnapshot>>>;
pub type SnapshotReceiver = watch::Receiver<Option<Arc<MonitorSnapshot>>>;

/// Empty snapshot channel; `None` until the first poll completes
pub fn snapshot_channel() -> (SnapshotSender, SnapshotReceiver) {
    watch::channel(None)
}

/// Owns a monitor and polls it until shut down
pub struct PollLoop<F: DeviceFetcher> {
    monitor: DeviceMonitor<F>,
    poll_interval: Duration,
    snapshot_tx: SnapshotSender,
    overrun_count: u64,
    logger: StructuredLogger,
}

impl<F: DeviceFetcher> PollLoop<F> {
    pub fn new(monitor: DeviceMonitor<F>, poll_interval: Duration) -> Self {
        let (snapshot_tx, _) = snapshot_channel();
        let logger = get_logger_with_context(
            LogContext::new("runtime").with_device(monitor.fetcher().endpoint().to_string()),
        );
        Self {
            monitor,
            poll_interval,
            snapshot_tx,
            overrun_count: 0,
            logger,
        }
    }

    /// New receiver for published snapshots
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.snapshot_tx.subscribe()
    }

    pub fn monitor(&self) -> &DeviceMonitor<F> {
        &self.monitor
    }

    pub fn overrun_count(&self) -> u64 {
        self.overrun_count
    }

    /// Poll once and publish the result
    pub async fn run_once(&mut self) -> Arc<MonitorSnapshot> {
        let started = Instant::now();
        let status = self.monitor.poll().await;
        self.publish(status, started.elapsed())
    }

    /// Poll on every tick until `shutdown` resolves.
    ///
    /// The first poll happens immediately. A shutdown arriving mid-poll
    /// abandons the in-flight request; the monitor keeps its previous state.
    pub async fn run<S>(&mut self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        self.logger.info(&format!(
            "Starting poll loop every {}s",
            self.poll_interval.as_secs()
        ));

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut shutdown => break,
            }

            let started = Instant::now();
            let status = tokio::select! {
                status = self.monitor.poll() => status,
                _ = &mut shutdown => {
                    self.logger.info("Shutdown requested during poll; abandoning request");
                    break;
                }
            };
            self.publish(status, started.elapsed());
        }

        self.logger.info(&format!(
            "Poll loop stopped after {} polls",
            self.monitor.stats().total_polls
        ));
    }

    fn publish(&mut self, status: EffectiveStatus, elapsed: Duration) -> Arc<MonitorSnapshot> {
        if elapsed > self.poll_interval {
            self.overrun_count = self.overrun_count.saturating_add(1);
            self.logger.warn(&format!(
                "Poll took {} ms, longer than the {}s interval",
                elapsed.as_millis(),
                self.poll_interval.as_secs()
            ));
        }

        let snapshot = Arc::new(MonitorSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: APP_VERSION,
            status,
            stats: self.monitor.stats().clone(),
            poll_duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            overrun_count: self.overrun_count,
            poll_interval_secs: self.poll_interval.as_secs(),
        });
        self.snapshot_tx.send_replace(Some(Arc::clone(&snapshot)));
        snapshot
    }
}
