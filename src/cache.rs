//! Last-known-good cache and the offline fallback policy
//!
//! Fetch and parse failures stop here. A failed cycle reports the last good
//! record degraded to offline (no power, identity and energy kept), or a
//! placeholder if the device has never answered.

use crate::fetcher::{DeviceFetcher, TransportError};
use crate::logging::get_logger;
use crate::protocol::{self, ParseError};
use crate::status::{DeviceStatus, StatusSource};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;
use thiserror::Error;

/// Format the device uses for its clock field
pub const DEVICE_TIME_FORMAT: &str = "%H:%M %d/%m/%Y";

/// Why a poll cycle did not produce a live record
#[derive(Debug, Clone, Error)]
pub enum PollFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unparseable response: {0}")]
    Parse(#[from] ParseError),
}

/// Record chosen for one poll, with how it was obtained
#[derive(Debug, Clone)]
pub struct CacheOutcome {
    pub status: DeviceStatus,
    pub source: StatusSource,
    pub failure: Option<PollFailure>,
}

/// Holder of the last successfully parsed record
pub struct StatusCache {
    last_known_good: Option<DeviceStatus>,
    logger: crate::logging::StructuredLogger,
}

impl StatusCache {
    pub fn new() -> Self {
        Self {
            last_known_good: None,
            logger: get_logger("cache"),
        }
    }

    /// Fetch, parse and apply the fallback policy.
    ///
    /// Nothing is stored until the fetch has completed, so dropping the
    /// returned future mid-request leaves the cache as it was.
    pub async fn poll<F, Tz>(&mut self, fetcher: &F, now: &DateTime<Tz>) -> CacheOutcome
    where
        F: DeviceFetcher + ?Sized,
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let fetched = fetcher.fetch().await;
        let fetched_at = now.with_timezone(&Utc);
        let result = fetched
            .map_err(PollFailure::from)
            .and_then(|raw| protocol::parse(&raw, fetched_at).map_err(PollFailure::from));
        self.record(result, now)
    }

    /// Apply the policy to an already completed fetch+parse.
    pub fn record<Tz>(
        &mut self,
        result: std::result::Result<DeviceStatus, PollFailure>,
        now: &DateTime<Tz>,
    ) -> CacheOutcome
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        match result {
            Ok(status) => {
                self.last_known_good = Some(status.clone());
                CacheOutcome {
                    status,
                    source: StatusSource::Live,
                    failure: None,
                }
            }
            Err(failure) => {
                self.logger
                    .warn(&format!("Device poll failed, reporting offline: {}", failure));
                match &self.last_known_good {
                    Some(good) => CacheOutcome {
                        status: good.to_offline(),
                        source: StatusSource::Cached,
                        failure: Some(failure),
                    },
                    None => CacheOutcome {
                        status: DeviceStatus::unknown(
                            now.format(DEVICE_TIME_FORMAT).to_string(),
                            now.with_timezone(&Utc),
                        ),
                        source: StatusSource::Default,
                        failure: Some(failure),
                    },
                }
            }
        }
    }

    pub fn last_known_good(&self) -> Option<&DeviceStatus> {
        self.last_known_good.as_ref()
    }
}

impl Default for StatusCache {
    fn default() -> Self {
        Self::new()
    }
}
