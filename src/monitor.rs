//! Per-device poll context
//!
//! A [`DeviceMonitor`] bundles everything one device needs across polls: the
//! fetcher, the last-known-good cache and the daily energy accumulator. Hosts
//! create one per device and call [`DeviceMonitor::poll`] on their own
//! schedule, never concurrently for the same monitor.

use crate::accumulator::DailyEnergyAccumulator;
use crate::cache::StatusCache;
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::{DeviceFetcher, HttpFetcher};
use crate::logging::{LogContext, get_logger_with_context};
use crate::status::{DeviceStatus, EffectiveStatus, StatusSource};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Counters over the monitor's lifetime
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollStats {
    pub total_polls: u64,
    pub failed_polls: u64,
    pub consecutive_failures: u64,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Poll context for one device
pub struct DeviceMonitor<F: DeviceFetcher> {
    fetcher: F,
    cache: StatusCache,
    accumulator: DailyEnergyAccumulator,
    timezone: Tz,
    stats: PollStats,
    logger: crate::logging::StructuredLogger,
}

impl DeviceMonitor<HttpFetcher> {
    /// Monitor for the device described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.device.base_url, config.device.timeout())?;
        Ok(Self::new(fetcher, config.timezone()?))
    }
}

impl<F: DeviceFetcher> DeviceMonitor<F> {
    /// `timezone` decides where calendar days start for the energy total
    pub fn new(fetcher: F, timezone: Tz) -> Self {
        let logger = get_logger_with_context(
            LogContext::new("monitor").with_device(fetcher.endpoint().to_string()),
        );
        Self {
            fetcher,
            cache: StatusCache::new(),
            accumulator: DailyEnergyAccumulator::new(),
            timezone,
            stats: PollStats::default(),
            logger,
        }
    }

    /// Run one poll cycle against the wall clock
    pub async fn poll(&mut self) -> EffectiveStatus {
        self.poll_at(Utc::now()).await
    }

    /// Run one poll cycle as of `now`.
    ///
    /// Always yields a well-formed status. Every live record is fed to the
    /// accumulator, including "No Data" ones; failed polls report the
    /// current total without touching it.
    pub async fn poll_at(&mut self, now: DateTime<Utc>) -> EffectiveStatus {
        let local = now.with_timezone(&self.timezone);
        let outcome = self.cache.poll(&self.fetcher, &local).await;

        self.stats.total_polls = self.stats.total_polls.saturating_add(1);
        match &outcome.failure {
            None => {
                self.stats.consecutive_failures = 0;
                self.stats.last_success_at = Some(now);
                self.stats.last_error = None;
            }
            Some(failure) => {
                self.stats.failed_polls = self.stats.failed_polls.saturating_add(1);
                self.stats.consecutive_failures = self.stats.consecutive_failures.saturating_add(1);
                self.stats.last_error = Some(failure.to_string());
            }
        }

        let status = outcome.status;
        let energy_today_total_kwh = if outcome.source == StatusSource::Live {
            self.accumulator
                .observe(status.energy_today_kwh, &status.inverter_status, &local)
        } else {
            self.accumulator.total_for(&local)
        };

        self.logger.debug(&format!(
            "Poll #{}: {} W, {:.3} kWh today ({:.3} kWh reported), status {}, source {:?}",
            self.stats.total_polls,
            status.current_power_w,
            energy_today_total_kwh,
            status.energy_today_kwh,
            status.inverter_status,
            outcome.source
        ));

        EffectiveStatus {
            device: status,
            energy_today_total_kwh,
            source: outcome.source,
            last_success_at: self.stats.last_success_at,
        }
    }

    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    pub fn last_known_good(&self) -> Option<&DeviceStatus> {
        self.cache.last_known_good()
    }

    pub fn accumulator(&self) -> &DailyEnergyAccumulator {
        &self.accumulator
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}
