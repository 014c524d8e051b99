//! Diagnostic logging setup.
//!
//! Logs go to stderr so stdout carries only the report. Verbosity comes from
//! `-v` flags; `RUST_LOG` and `UPGRADE_GATE_LOG_FORMAT` override it.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log format: compact, full or json.
pub const LOG_FORMAT_ENV: &str = "UPGRADE_GATE_LOG_FORMAT";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Full,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "full" => Some(Self::Full),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "warn" or "upgrade_gate=debug"
    pub level: String,
    pub format: LogFormat,
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// 0 = warn, 1 = info, 2 = debug, 3+ = trace.
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut config = Self::default();

        match verbosity {
            0 => {}
            1 => config.level = "info".to_string(),
            2 => {
                config.level = "debug".to_string();
                config.source_location = true;
            }
            _ => {
                config.level = "trace".to_string();
                config.format = LogFormat::Full;
                config.source_location = true;
            }
        }

        config
    }

    /// Apply `UPGRADE_GATE_LOG_FORMAT`. `RUST_LOG` is read when the filter is built.
    pub fn merge_with_env(mut self) -> Self {
        if let Ok(format) = std::env::var(LOG_FORMAT_ENV) {
            match LogFormat::parse(&format) {
                Some(parsed) => self.format = parsed,
                None => eprintln!("Ignoring invalid {}: {}", LOG_FORMAT_ENV, format),
            }
        }
        self
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let ansi = atty::is(atty::Stream::Stderr);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.source_location)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let installed = match config.format {
        LogFormat::Compact => builder.with_ansi(ansi).compact().try_init(),
        LogFormat::Full => builder.with_ansi(ansi).try_init(),
        LogFormat::Json => builder.with_ansi(false).json().try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_from_verbosity() {
        assert_eq!(LoggingConfig::from_verbosity(0).level, "warn");
        assert_eq!(LoggingConfig::from_verbosity(1).level, "info");

        let debug = LoggingConfig::from_verbosity(2);
        assert_eq!(debug.level, "debug");
        assert!(debug.source_location);

        let trace = LoggingConfig::from_verbosity(5);
        assert_eq!(trace.level, "trace");
        assert_eq!(trace.format, LogFormat::Full);
    }

    #[test]
    #[serial]
    fn test_format_from_env() {
        std::env::set_var(LOG_FORMAT_ENV, "JSON");
        assert_eq!(
            LoggingConfig::default().merge_with_env().format,
            LogFormat::Json
        );

        std::env::set_var(LOG_FORMAT_ENV, "fancy");
        assert_eq!(
            LoggingConfig::default().merge_with_env().format,
            LogFormat::Compact
        );
        std::env::remove_var(LOG_FORMAT_ENV);
    }
}
