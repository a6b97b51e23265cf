//! # zevermon - Zeversolar inverter monitor
//!
//! Polls the `home.cgi` status page of a Zeversolar monitoring device, keeps
//! reporting sensibly while the device is unreachable, and corrects the
//! device's "energy today" counter into a daily total that survives midnight
//! rollovers and inverter resets.
//!
//! ## Architecture
//!
//! - `protocol`: newline-separated status page parser
//! - `fetcher`: HTTP transport to the device
//! - `cache`: last-known-good record and offline fallback
//! - `accumulator`: daily energy state machine
//! - `monitor`: per-device poll cycle tying the above together
//! - `runtime`: interval-driven poll loop publishing snapshots
//! - `probe`: one-shot connection check
//! - `web`: read-only status API (feature `web`)
//! - `config`, `logging`, `error`, `cli`: ambient plumbing

pub mod accumulator;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod monitor;
pub mod probe;
pub mod protocol;
pub mod runtime;
pub mod status;
#[cfg(feature = "web")]
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, ZeverError};
pub use monitor::DeviceMonitor;
pub use status::{DeviceStatus, EffectiveStatus, InverterStatus, StatusSource};
