//! Command line arguments

use crate::config::Config;
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version = crate::runtime::APP_VERSION, about, propagate_version = true)]
pub struct Args {
    /// YAML configuration file; the default locations are searched when omitted.
    #[clap(long, short = 'c', env = "ZEVERMON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Device base URL, e.g. `http://192.168.1.20`.
    #[clap(long, env = "ZEVERMON_URL")]
    pub url: Option<String>,

    /// Seconds between polls.
    #[clap(long)]
    pub interval: Option<u64>,

    /// IANA timezone that decides where a day starts.
    #[clap(long, env = "ZEVERMON_TIMEZONE")]
    pub timezone: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Poll the device until interrupted (default).
    Run,

    /// Fetch once, print what the device reports, and exit.
    Probe,
}

impl Args {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }

    /// Load the configuration and layer the command line on top.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::load()?,
        };
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.device.base_url = url.clone();
        }
        if let Some(interval) = self.interval {
            config.poll_interval_secs = interval;
        }
        if let Some(timezone) = &self.timezone {
            config.timezone = timezone.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_config_values() {
        let args = Args::parse_from([
            "zevermon",
            "--url",
            "http://10.0.0.9",
            "--interval",
            "30",
            "probe",
        ]);
        assert_eq!(args.command(), Command::Probe);

        let mut config = Config::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.device.base_url, "http://10.0.0.9");
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.timezone, "UTC");
    }

    #[test]
    fn run_is_the_default_command() {
        let args = Args::parse_from(["zevermon"]);
        assert_eq!(args.command(), Command::Run);
        assert!(args.url.is_none());
    }
}
