#![no_main]
use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use zevermon::accumulator::DailyEnergyAccumulator;
use zevermon::protocol::parse;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let Some(now) = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single() else {
        return;
    };

    // Parsing arbitrary bytes must never panic, and whatever parses must keep
    // the accumulator total finite and non-negative
    if let Ok(status) = parse(&raw, now) {
        assert!(status.energy_today_kwh.is_finite());
        let mut acc = DailyEnergyAccumulator::new();
        let total = acc.observe(status.energy_today_kwh, &status.inverter_status, &now);
        assert!(total.is_finite() && total >= 0.0);
    }
});
