//! One-off connection check used before committing to a device URL

use crate::fetcher::DeviceFetcher;
use crate::protocol;
use crate::status::DeviceStatus;
use chrono::Utc;
use std::fmt;

/// Result of probing a device once
#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    /// Device answered with a parseable status page
    Ready(DeviceStatus),
    /// Device answered, but not with something we understand
    InvalidData(String),
    /// Device could not be reached. Setup may still go ahead, the device
    /// is often asleep at night.
    Unreachable(String),
}

impl ProbeOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Fetch once and classify the answer
pub async fn probe<F: DeviceFetcher + ?Sized>(fetcher: &F) -> ProbeOutcome {
    match fetcher.fetch().await {
        Err(e) => ProbeOutcome::Unreachable(e.to_string()),
        Ok(raw) => match protocol::parse(&raw, Utc::now()) {
            Ok(status) => ProbeOutcome::Ready(status),
            Err(e) => ProbeOutcome::InvalidData(e.to_string()),
        },
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable(warning) => write!(f, "Device unreachable: {}", warning),
            Self::InvalidData(reason) => write!(f, "Invalid data from device: {}", reason),
            Self::Ready(s) => {
                writeln!(f, "Serial number:    {}", s.serial_number)?;
                writeln!(f, "Registry key:     {}", s.registry_key)?;
                writeln!(f, "Hardware version: {}", s.hardware_version)?;
                writeln!(f, "Software version: {}", s.software_version)?;
                writeln!(f, "Device time:      {}", s.device_time)?;
                writeln!(
                    f,
                    "Cloud status:     {} ({})",
                    s.cloud_status,
                    if s.cloud_ok() { "OK" } else { "error" }
                )?;
                writeln!(f, "Inverters:        {}", s.inverter_count)?;
                if s.has_inverter_data() {
                    writeln!(f, "Inverter serial:  {}", s.inverter_serial)?;
                    writeln!(f, "Current power:    {} W", s.current_power_w)?;
                    writeln!(f, "Energy today:     {:.2} kWh", s.energy_today_kwh)?;
                }
                write!(f, "Inverter status:  {}", s.inverter_status)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::TransportError;

    struct Canned(std::result::Result<&'static str, &'static str>);

    #[async_trait::async_trait]
    impl DeviceFetcher for Canned {
        async fn fetch(&self) -> std::result::Result<String, TransportError> {
            self.0
                .map(str::to_string)
                .map_err(|m| TransportError::new("http://probe/home.cgi", m))
        }

        fn endpoint(&self) -> &str {
            "http://probe/home.cgi"
        }
    }

    #[tokio::test]
    async fn classifies_each_outcome() {
        let ready = probe(&Canned(Ok(
            "1\n1\nSN1\nKEY\nM11\n16B21-663R+16B21-658R\n14:33 22/05/2024\n0\n1\nINV1\n1520\n3.27\nOK",
        )))
        .await;
        assert!(ready.is_ready());
        let report = ready.to_string();
        assert!(report.contains("SN1"));
        assert!(report.contains("1520 W"));
        assert!(report.contains("3.27 kWh"));

        let invalid = probe(&Canned(Ok("<html>login</html>"))).await;
        assert!(matches!(invalid, ProbeOutcome::InvalidData(_)));

        let unreachable = probe(&Canned(Err("connection refused"))).await;
        match unreachable {
            ProbeOutcome::Unreachable(w) => assert!(w.contains("connection refused")),
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}
