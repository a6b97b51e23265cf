//! Parser for the plaintext `home.cgi` status page
//!
//! The device answers with one field per line, in a fixed order:
//!
//! ```text
//! 0  wifi_enabled
//! 1  display_mode
//! 2  serial_number
//! 3  registry_key
//! 4  hardware_version
//! 5  software_version
//! 6  time
//! 7  cloud_status
//! 8  inverter_count
//! 9  inverter_serial     \
//! 10 current_power (W)    | only when inverter_count > 0
//! 11 energy_today (kWh)   |
//! 12 inverter_status     /
//! ```
//!
//! Only the first inverter block is read.

use crate::status::{DeviceStatus, InverterStatus, UNKNOWN};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Number of header fields every response carries
pub const MIN_FIELDS: usize = 9;

const INVERTER_OFFSET: usize = 9;
const INVERTER_FIELDS: usize = 4;

/// Why a response was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("too few fields: expected at least {expected}, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("malformed integer in {field}: {value:?}")]
    MalformedInteger { field: &'static str, value: String },

    #[error("malformed float in {field}: {value:?}")]
    MalformedFloat { field: &'static str, value: String },
}

/// The positional fields of one response, split but not yet interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatusLine<'a> {
    fields: Vec<&'a str>,
}

impl<'a> RawStatusLine<'a> {
    /// Split a payload into lines, dropping surrounding whitespace of the
    /// whole body and trailing whitespace (including `\r`) of every line.
    pub fn split(raw: &'a str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = raw.trim().split('\n').map(str::trim_end).collect();
        if fields.len() < MIN_FIELDS {
            return Err(ParseError::TooFewFields {
                expected: MIN_FIELDS,
                found: fields.len(),
            });
        }
        Ok(Self { fields })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, index: usize) -> Option<&'a str> {
        self.fields.get(index).copied()
    }

    /// Parsed `inverter_count`
    pub fn inverter_count(&self) -> Result<i64, ParseError> {
        parse_integer("inverter_count", self.fields[MIN_FIELDS - 1])
    }
}

/// Turn one raw payload into a [`DeviceStatus`].
///
/// Pure: the only outside input is `fetched_at`, which the caller stamps.
pub fn parse(raw: &str, fetched_at: DateTime<Utc>) -> Result<DeviceStatus, ParseError> {
    let line = RawStatusLine::split(raw)?;
    let inverter_count = line.inverter_count()?;

    let header = |index: usize| line.fields[index].to_string();

    let mut status = DeviceStatus {
        wifi_enabled: header(0),
        display_mode: header(1),
        serial_number: header(2),
        registry_key: header(3),
        hardware_version: header(4),
        software_version: header(5),
        device_time: header(6),
        cloud_status: header(7),
        inverter_count,
        inverter_serial: UNKNOWN.to_string(),
        current_power_w: 0,
        energy_today_kwh: 0.0,
        inverter_status: InverterStatus::NoData,
        fetched_at,
    };

    if inverter_count > 0 {
        let required = INVERTER_OFFSET + INVERTER_FIELDS;
        if line.len() < required {
            return Err(ParseError::TooFewFields {
                expected: required,
                found: line.len(),
            });
        }
        let block = &line.fields[INVERTER_OFFSET..required];
        status.inverter_serial = block[0].to_string();
        status.current_power_w = parse_power("current_power", block[1])?;
        status.energy_today_kwh = parse_energy("energy_today", block[2])?;
        status.inverter_status = InverterStatus::from_raw(block[3].trim());
    }

    Ok(status)
}

fn parse_integer(field: &'static str, value: &str) -> Result<i64, ParseError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ParseError::MalformedInteger {
            field,
            value: value.to_string(),
        })
}

fn parse_power(field: &'static str, value: &str) -> Result<u64, ParseError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ParseError::MalformedInteger {
            field,
            value: value.to_string(),
        })
}

fn parse_energy(field: &'static str, value: &str) -> Result<f64, ParseError> {
    let malformed = || ParseError::MalformedFloat {
        field,
        value: value.to_string(),
    };
    let energy = value.trim().parse::<f64>().map_err(|_| malformed())?;
    // f64::from_str accepts "inf" and "NaN"; neither is a meter reading
    if !energy.is_finite() || energy < 0.0 {
        return Err(malformed());
    }
    Ok(energy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONLINE: &str = "1\n1\nSN123\nREGKEY\nHW1.0\nSW2.0\n12:00 01/01/2024\n0\n1\nINV1\n350\n2.5\nOK";

    #[test]
    fn parses_online_payload() {
        let now = Utc::now();
        let status = parse(ONLINE, now).unwrap();
        assert_eq!(status.serial_number, "SN123");
        assert_eq!(status.registry_key, "REGKEY");
        assert_eq!(status.hardware_version, "HW1.0");
        assert_eq!(status.software_version, "SW2.0");
        assert_eq!(status.device_time, "12:00 01/01/2024");
        assert_eq!(status.inverter_serial, "INV1");
        assert_eq!(status.current_power_w, 350);
        assert!((status.energy_today_kwh - 2.5).abs() < 1e-9);
        assert_eq!(status.inverter_status, InverterStatus::Online);
        assert_eq!(status.fetched_at, now);
    }

    #[test]
    fn crlf_and_trailing_blank_lines_are_tolerated() {
        let raw = format!("{}\r\n\r\n", ONLINE.replace('\n', "\r\n"));
        let status = parse(&raw, Utc::now()).unwrap();
        assert_eq!(status.inverter_status, InverterStatus::Online);
        assert_eq!(status.current_power_w, 350);
    }

    #[test]
    fn split_counts_fields() {
        let line = RawStatusLine::split(ONLINE).unwrap();
        assert_eq!(line.len(), 13);
        assert_eq!(line.field(2), Some("SN123"));
        assert_eq!(line.field(13), None);
        assert_eq!(line.inverter_count().unwrap(), 1);
    }

    #[test]
    fn truncated_inverter_block_is_too_few_fields() {
        let raw = "1\n1\nSN\nKEY\nHW\nSW\n12:00\n0\n1\nINV1\n350";
        assert_eq!(
            parse(raw, Utc::now()).unwrap_err(),
            ParseError::TooFewFields {
                expected: 13,
                found: 11
            }
        );
    }

    #[test]
    fn non_finite_energy_is_rejected() {
        let raw = ONLINE.replace("\n2.5\n", "\nNaN\n");
        assert!(matches!(
            parse(&raw, Utc::now()),
            Err(ParseError::MalformedFloat {
                field: "energy_today",
                ..
            })
        ));
    }
}
