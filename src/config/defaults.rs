use super::*;

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_output: true,
            json_format: false,
            file: None,
            backup_count: 5,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 8089,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            poll_interval_secs: 60,
            timezone: "UTC".to_string(),
            logging: LoggingConfig::default(),
            web: WebConfig::default(),
        }
    }
}
