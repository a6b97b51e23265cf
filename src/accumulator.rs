//! Daily energy accumulation
//!
//! The inverter's "energy today" counter is not trustworthy on its own: it
//! drops to zero at midnight, drops when the inverter reboots mid-day, and
//! occasionally dips by a few Wh between polls. [`DailyEnergyAccumulator`]
//! folds successive readings into a running total for the current calendar
//! day that only moves backwards when a new day starts or a reset is detected.
//!
//! Transition order per observation:
//! - first reading -> start tracking at the reading
//! - calendar date changed -> restart at the reading (always wins)
//! - drop larger than [`RESET_THRESHOLD_KWH`] -> device reset, restart at the reading
//! - rise -> add the delta
//! - equal or small dip -> keep the total

use crate::logging::get_logger;
use crate::status::InverterStatus;
use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// Drops above this many kWh are treated as a counter reset, below as noise.
///
/// Empirical value; validate against real device traces before changing.
pub const RESET_THRESHOLD_KWH: f64 = 0.5;

/// Tracked values for one inverter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorState {
    /// Last raw energy_today seen
    pub previous_reading: f64,
    /// Corrected running total for `anchor_date`
    pub accumulated_kwh: f64,
    /// Calendar day the total belongs to
    pub anchor_date: NaiveDate,
}

/// What the last observation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started,
    NewDay,
    ResetDetected,
    Accumulated,
    Unchanged,
}

/// Per-inverter state machine turning raw readings into a daily total
pub struct DailyEnergyAccumulator {
    state: Option<AccumulatorState>,
    last_transition: Option<Transition>,
    logger: crate::logging::StructuredLogger,
}

impl DailyEnergyAccumulator {
    pub fn new() -> Self {
        Self {
            state: None,
            last_transition: None,
            logger: get_logger("accumulator"),
        }
    }

    /// Feed one raw reading taken at `now` and return the corrected total.
    ///
    /// The calendar day is taken in `now`'s own timezone. `status` is only
    /// used for logging. Non-finite readings leave the state untouched.
    pub fn observe<Tz: TimeZone>(
        &mut self,
        reading: f64,
        status: &InverterStatus,
        now: &DateTime<Tz>,
    ) -> f64 {
        let today = now.date_naive();

        if !reading.is_finite() {
            self.logger.warn(&format!(
                "Ignoring non-finite energy reading {} (status {})",
                reading, status
            ));
            return self.total_for(now);
        }

        let (state, transition) = match self.state.take() {
            None => (
                AccumulatorState {
                    previous_reading: reading,
                    accumulated_kwh: reading,
                    anchor_date: today,
                },
                Transition::Started,
            ),
            Some(state) => Self::step(state, reading, today),
        };

        match transition {
            Transition::Started => self.logger.info(&format!(
                "Tracking daily energy from {:.3} kWh on {}",
                reading, today
            )),
            Transition::NewDay => self.logger.info(&format!(
                "New day {}; daily energy restarts at {:.3} kWh",
                today, reading
            )),
            Transition::ResetDetected => self.logger.info(&format!(
                "Energy counter reset detected (status {}); restarting at {:.3} kWh",
                status, reading
            )),
            Transition::Accumulated | Transition::Unchanged => self.logger.trace(&format!(
                "Daily energy {:.3} kWh after reading {:.3} kWh",
                state.accumulated_kwh, reading
            )),
        }

        let total = state.accumulated_kwh;
        self.state = Some(state);
        self.last_transition = Some(transition);
        total
    }

    fn step(state: AccumulatorState, reading: f64, today: NaiveDate) -> (AccumulatorState, Transition) {
        let restart = AccumulatorState {
            previous_reading: reading,
            accumulated_kwh: reading,
            anchor_date: today,
        };

        if today != state.anchor_date {
            return (restart, Transition::NewDay);
        }

        if reading < state.previous_reading
            && state.previous_reading - reading > RESET_THRESHOLD_KWH
        {
            return (restart, Transition::ResetDetected);
        }

        if reading > state.previous_reading {
            let accumulated_kwh = state.accumulated_kwh + (reading - state.previous_reading);
            return (
                AccumulatorState {
                    previous_reading: reading,
                    accumulated_kwh,
                    ..state
                },
                Transition::Accumulated,
            );
        }

        (
            AccumulatorState {
                previous_reading: reading,
                ..state
            },
            Transition::Unchanged,
        )
    }

    /// Total for the day of `now` without advancing the state.
    ///
    /// Zero once `now` is past the tracked day, since nothing has been
    /// observed for the new day yet.
    pub fn total_for<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> f64 {
        match &self.state {
            Some(state) if state.anchor_date == now.date_naive() => state.accumulated_kwh,
            _ => 0.0,
        }
    }

    pub fn state(&self) -> Option<&AccumulatorState> {
        self.state.as_ref()
    }

    pub fn last_transition(&self) -> Option<Transition> {
        self.last_transition
    }
}

impl Default for DailyEnergyAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
