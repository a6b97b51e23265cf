//! Structured logging and tracing for zevermon
//!
//! Sets up a `tracing` subscriber with console output and optional
//! daily-rotated log files, and hands out per-component loggers that tag
//! every message with where it came from.

use crate::config::LoggingConfig;
use crate::error::{Result, ZeverError};
use once_cell::sync::OnceCell;
use std::sync::Once;
use tracing::{Level, debug, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// Keep the non-blocking worker guard alive for the entire process lifetime
static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();
static INIT_ONCE: Once = Once::new();
static INIT_ERROR: OnceCell<String> = OnceCell::new();

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize logging system based on configuration.
///
/// Only the first call has an effect; later calls report the outcome of the
/// first one.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    INIT_ONCE.call_once(|| {
        if let Err(e) = try_init(config) {
            let _ = INIT_ERROR.set(e.to_string());
        }
    });

    if let Some(err) = INIT_ERROR.get() {
        return Err(ZeverError::config(err.clone()));
    }
    Ok(())
}

fn try_init(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.console_output || should_use_console_only() {
        layers.push(format_layer(std::io::stdout, config.json_format));
    }

    let file_dir = config.file.as_deref().filter(|_| !should_use_console_only());
    if let Some(dir) = file_dir {
        let file_appender = rolling::Builder::new()
            .rotation(rolling::Rotation::DAILY)
            .filename_prefix("zevermon")
            .filename_suffix("log")
            .max_log_files(config.backup_count.max(1) as usize)
            .build(dir)
            .map_err(|e| ZeverError::io(format!("Failed to create log file appender: {}", e)))?;
        let (non_blocking_appender, guard) = non_blocking(file_appender);
        let _ = LOG_GUARD.set(guard);
        layers.push(format_layer(non_blocking_appender, config.json_format));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(build_env_filter(level))
        .try_init()
        .map_err(|e| ZeverError::config(format!("Failed to install subscriber: {}", e)))?;

    info!(
        "Logging initialized - level: {:?}, console: {}, file: {}",
        level,
        config.console_output,
        file_dir.unwrap_or("-")
    );
    Ok(())
}

fn format_layer<W>(writer: W, json: bool) -> BoxedLayer
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("zevermon={},reqwest=warn,hyper=warn", level).into())
}

fn should_use_console_only() -> bool {
    cfg!(test) || std::env::var_os("ZEVERMON_DISABLE_FILE_LOG").is_some()
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_uppercase().as_str() {
        "TRACE" => Ok(Level::TRACE),
        "DEBUG" => Ok(Level::DEBUG),
        "INFO" => Ok(Level::INFO),
        "WARN" | "WARNING" => Ok(Level::WARN),
        "ERROR" => Ok(Level::ERROR),
        _ => Err(ZeverError::config(format!(
            "Invalid log level: {}",
            level_str
        ))),
    }
}

/// Context information for log messages
#[derive(Debug, Clone)]
pub struct LogContext {
    /// Component name (e.g., "fetcher", "cache", "runtime")
    pub component: String,

    /// Device the messages relate to, for multi-device hosts
    pub device: Option<String>,
}

impl LogContext {
    /// Create a new log context
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            device: None,
        }
    }

    /// Set device
    pub fn with_device(mut self, device: String) -> Self {
        self.device = Some(device);
        self
    }
}

/// Structured logger with context
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    pub(crate) context: LogContext,
}

impl StructuredLogger {
    /// Create a new structured logger with context
    pub fn new(context: LogContext) -> Self {
        Self { context }
    }

    /// Log an info message with context
    pub fn info(&self, message: &str) {
        let fields = self.format_fields();
        info!(%fields, "{}", message);
    }

    /// Log a warning message with context
    pub fn warn(&self, message: &str) {
        let fields = self.format_fields();
        warn!(%fields, "{}", message);
    }

    /// Log a debug message with context
    pub fn debug(&self, message: &str) {
        let fields = self.format_fields();
        debug!(%fields, "{}", message);
    }

    /// Log a trace message with context
    pub fn trace(&self, message: &str) {
        let fields = self.format_fields();
        trace!(%fields, "{}", message);
    }

    fn format_fields(&self) -> String {
        let mut fields = vec![format!("component={}", self.context.component)];
        if let Some(ref device) = self.context.device {
            fields.push(format!("device={}", device));
        }
        fields.join(",")
    }
}

/// Create a logger for a specific component
pub fn get_logger(component: &str) -> StructuredLogger {
    StructuredLogger::new(LogContext::new(component))
}

/// Create a logger with full context
pub fn get_logger_with_context(context: LogContext) -> StructuredLogger {
    StructuredLogger::new(context)
}
