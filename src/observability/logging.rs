//! Log output settings.

use std::env;

use crate::config::LoggingSettings;

/// Filter used when neither `RUST_LOG` nor the config file sets one.
pub const DEFAULT_FILTER: &str = "info";

/// Filter used with `--verbose`.
pub const VERBOSE_FILTER: &str = "info,contacts=debug,tower_http=debug";

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parses a format name. Unknown names yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directive.
    pub filter: String,
}

impl LoggingConfig {
    /// Resolves logging settings.
    ///
    /// The filter comes from `RUST_LOG`, then the config file, then the
    /// verbosity flag.
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        Self::resolve(settings, verbose, env::var("RUST_LOG").ok())
    }

    fn resolve(settings: &LoggingSettings, verbose: bool, rust_log: Option<String>) -> Self {
        let format = settings
            .format
            .as_deref()
            .and_then(LogFormat::parse)
            .unwrap_or_default();

        let filter = rust_log
            .filter(|value| !value.trim().is_empty())
            .or_else(|| settings.filter.clone())
            .unwrap_or_else(|| {
                if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER }.to_string()
            });

        Self { format, filter }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: DEFAULT_FILTER.to_string(),
        }
    }
}
