//! Status records produced by a poll
//!
//! [`DeviceStatus`] is what one device response says. [`EffectiveStatus`] is
//! what the monitor hands to the host every poll, whether or not the device
//! answered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Sentinel used for identity fields that are not known.
pub const UNKNOWN: &str = "unknown";

/// Derived inverter state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InverterStatus {
    /// Device reported `OK` for the inverter
    Online,
    /// No successful fetch and parse this cycle
    Offline,
    /// Device answered but reported no inverters
    NoData,
    /// Any other text the device reported, kept verbatim (fault strings)
    Reported(String),
}

impl InverterStatus {
    /// Map the raw status text of the inverter block.
    ///
    /// Only the exact text `OK` means online; empty text carries no
    /// information and is treated like a missing inverter block.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "OK" => InverterStatus::Online,
            "" => InverterStatus::NoData,
            other => InverterStatus::Reported(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InverterStatus::Online => "Online",
            InverterStatus::Offline => "Offline",
            InverterStatus::NoData => "No Data",
            InverterStatus::Reported(text) => text,
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, InverterStatus::Online)
    }
}

impl fmt::Display for InverterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for InverterStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InverterStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(match text.as_str() {
            "Online" => InverterStatus::Online,
            "Offline" => InverterStatus::Offline,
            "No Data" => InverterStatus::NoData,
            _ => InverterStatus::Reported(text),
        })
    }
}

/// One parsed device response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub wifi_enabled: String,
    pub display_mode: String,
    pub serial_number: String,
    pub registry_key: String,
    pub hardware_version: String,
    pub software_version: String,
    /// Device-local clock text, e.g. `12:00 01/01/2024`
    pub device_time: String,
    /// `0` when the device's cloud link is healthy
    pub cloud_status: String,
    pub inverter_count: i64,
    pub inverter_serial: String,
    pub current_power_w: u64,
    /// Device-reported cumulative energy for the day
    pub energy_today_kwh: f64,
    pub inverter_status: InverterStatus,
    pub fetched_at: DateTime<Utc>,
}

impl DeviceStatus {
    /// Placeholder record used before the device has ever answered.
    pub fn unknown(device_time: String, fetched_at: DateTime<Utc>) -> Self {
        Self {
            wifi_enabled: UNKNOWN.to_string(),
            display_mode: UNKNOWN.to_string(),
            serial_number: UNKNOWN.to_string(),
            registry_key: UNKNOWN.to_string(),
            hardware_version: UNKNOWN.to_string(),
            software_version: UNKNOWN.to_string(),
            device_time,
            cloud_status: UNKNOWN.to_string(),
            inverter_count: 0,
            inverter_serial: UNKNOWN.to_string(),
            current_power_w: 0,
            energy_today_kwh: 0.0,
            inverter_status: InverterStatus::Offline,
            fetched_at,
        }
    }

    /// Copy of this record as it should be reported while the device is unreachable.
    pub fn to_offline(&self) -> Self {
        Self {
            current_power_w: 0,
            inverter_status: InverterStatus::Offline,
            ..self.clone()
        }
    }

    pub fn has_inverter_data(&self) -> bool {
        self.inverter_count > 0
    }

    pub fn cloud_ok(&self) -> bool {
        self.cloud_status == "0"
    }
}

/// Where an [`EffectiveStatus`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSource {
    /// Parsed from this cycle's response
    Live,
    /// Last-known-good record degraded to offline
    Cached,
    /// Synthesized; the device has never answered
    Default,
}

/// The record returned to the host for every poll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveStatus {
    #[serde(flatten)]
    pub device: DeviceStatus,

    /// Corrected, monotonic energy for the current day
    pub energy_today_total_kwh: f64,

    pub source: StatusSource,

    /// When the device last answered with a parseable payload
    pub last_success_at: Option<DateTime<Utc>>,
}

impl EffectiveStatus {
    pub fn is_live(&self) -> bool {
        self.source == StatusSource::Live
    }
}
