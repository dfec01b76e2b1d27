//! Structured logging setup built on the tracing crate.

use std::io::IsTerminal;

use tracing::Level;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Logging configuration options
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to output
    pub level: Level,
    /// Enable colored output
    pub color: bool,
    /// Show timestamps
    pub show_timestamps: bool,
    /// Show target/module name
    pub show_target: bool,
    /// Enable JSON format for machine parsing
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            color: true,
            show_timestamps: false,
            show_target: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Create config from CLI arguments
    pub fn from_args(quiet: bool, verbose: bool, json: bool) -> Self {
        let level = if verbose {
            Level::DEBUG
        } else if quiet {
            Level::ERROR
        } else {
            Level::INFO
        };

        Self {
            level,
            color: !quiet && !json && std::io::stdout().is_terminal(),
            show_timestamps: verbose || json,
            show_target: verbose,
            json_format: json,
        }
    }
}

/// Initialize the logging system. Logs go to stderr so `--json` command
/// output on stdout stays machine-parsable.
pub fn init_logging(config: LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tasksync={}", config.level)));

    let registry = Registry::default().with(env_filter);

    if config.json_format {
        let json_layer = fmt::layer().json().with_writer(std::io::stderr);
        registry.with(json_layer).init();
    } else if config.show_timestamps {
        let fmt_layer = fmt::layer()
            .with_target(config.show_target)
            .with_ansi(config.color)
            .with_timer(fmt::time::ChronoUtc::rfc_3339())
            .with_writer(std::io::stderr);
        registry.with(fmt_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_target(config.show_target)
            .with_ansi(config.color)
            .without_time()
            .with_writer(std::io::stderr);
        registry.with(fmt_layer).init();
    }
}
