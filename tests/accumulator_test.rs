use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Europe::Amsterdam;
use zevermon::accumulator::{DailyEnergyAccumulator, RESET_THRESHOLD_KWH, Transition};
use zevermon::status::InverterStatus;

const EPS: f64 = 1e-9;

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour, minute, 0).unwrap()
}

fn feed(acc: &mut DailyEnergyAccumulator, readings: &[(f64, DateTime<Utc>)]) -> Vec<f64> {
    readings
        .iter()
        .map(|(reading, now)| acc.observe(*reading, &InverterStatus::Online, now))
        .collect()
}

#[test]
fn rising_readings_track_the_counter() {
    let mut acc = DailyEnergyAccumulator::new();
    let totals = feed(
        &mut acc,
        &[(0.0, at(3, 6, 0)), (0.4, at(3, 7, 0)), (1.9, at(3, 9, 0)), (5.25, at(3, 13, 0))],
    );
    let expected = [0.0, 0.4, 1.9, 5.25];
    for (total, want) in totals.iter().zip(expected) {
        assert!((total - want).abs() < EPS, "{} != {}", total, want);
    }
    assert_eq!(acc.last_transition(), Some(Transition::Accumulated));
}

#[test]
fn large_drop_is_a_reset() {
    let mut acc = DailyEnergyAccumulator::new();
    feed(&mut acc, &[(10.0, at(3, 12, 0))]);
    let total = acc.observe(0.2, &InverterStatus::Online, &at(3, 12, 1));
    assert!((total - 0.2).abs() < EPS);
    assert_eq!(acc.last_transition(), Some(Transition::ResetDetected));

    let state = acc.state().unwrap();
    assert!((state.previous_reading - 0.2).abs() < EPS);
    assert!((state.accumulated_kwh - 0.2).abs() < EPS);
}

#[test]
fn small_drop_is_noise() {
    let mut acc = DailyEnergyAccumulator::new();
    feed(&mut acc, &[(10.0, at(3, 12, 0))]);
    let total = acc.observe(9.8, &InverterStatus::Online, &at(3, 12, 1));
    assert!((total - 10.0).abs() < EPS);
    assert_eq!(acc.last_transition(), Some(Transition::Unchanged));
    assert!((acc.state().unwrap().previous_reading - 9.8).abs() < EPS);
    assert!(RESET_THRESHOLD_KWH > 0.2);
}

#[test]
fn equal_reading_keeps_total() {
    let mut acc = DailyEnergyAccumulator::new();
    feed(&mut acc, &[(3.0, at(3, 12, 0))]);
    let total = acc.observe(3.0, &InverterStatus::Online, &at(3, 12, 5));
    assert!((total - 3.0).abs() < EPS);
    assert_eq!(acc.last_transition(), Some(Transition::Unchanged));
}

#[test]
fn new_day_restarts_even_when_reading_rose() {
    let mut acc = DailyEnergyAccumulator::new();
    feed(&mut acc, &[(12.0, at(3, 20, 0))]);

    let total = acc.observe(0.1, &InverterStatus::Online, &at(4, 6, 0));
    assert!((total - 0.1).abs() < EPS);
    assert_eq!(acc.last_transition(), Some(Transition::NewDay));

    // date change wins over the "rise" branch too
    let mut acc = DailyEnergyAccumulator::new();
    feed(&mut acc, &[(1.0, at(3, 23, 50))]);
    let total = acc.observe(1.5, &InverterStatus::Online, &at(4, 0, 5));
    assert!((total - 1.5).abs() < EPS);
    assert_eq!(acc.last_transition(), Some(Transition::NewDay));
    assert_eq!(
        acc.state().unwrap().anchor_date,
        chrono::NaiveDate::from_ymd_opt(2024, 6, 4).unwrap()
    );
}

#[test]
fn day_boundary_follows_the_given_timezone() {
    let mut acc = DailyEnergyAccumulator::new();
    // 21:30 UTC is 23:30 in Amsterdam (CEST), 22:30 UTC is already the next day there
    let evening = at(3, 21, 30).with_timezone(&Amsterdam);
    let after_midnight = at(3, 22, 30).with_timezone(&Amsterdam);

    acc.observe(8.0, &InverterStatus::Online, &evening);
    let total = acc.observe(8.2, &InverterStatus::Online, &after_midnight);
    assert!((total - 8.2).abs() < EPS);
    assert_eq!(acc.last_transition(), Some(Transition::NewDay));

    // the same instants seen in UTC stay on one day
    let mut utc_acc = DailyEnergyAccumulator::new();
    utc_acc.observe(8.0, &InverterStatus::Online, &at(3, 21, 30));
    let total = utc_acc.observe(8.2, &InverterStatus::Online, &at(3, 22, 30));
    assert!((total - 8.2).abs() < EPS);
    assert_eq!(utc_acc.last_transition(), Some(Transition::Accumulated));
}

#[test]
fn reset_then_recovery_adds_on_top() {
    let mut acc = DailyEnergyAccumulator::new();
    let totals = feed(
        &mut acc,
        &[
            (4.0, at(5, 10, 0)),
            (4.5, at(5, 11, 0)),
            (0.0, at(5, 11, 5)),
            (0.3, at(5, 11, 30)),
        ],
    );
    assert!((totals[1] - 4.5).abs() < EPS);
    assert!((totals[2] - 0.0).abs() < EPS);
    assert!((totals[3] - 0.3).abs() < EPS);
}
