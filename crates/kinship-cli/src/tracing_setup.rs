//! Log subscriber setup
//!
//! One `tracing-subscriber` registry with an `EnvFilter` and a single fmt
//! layer, rendered either for humans or as JSON lines.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG`, `--verbose` nor the config file set one
pub const DEFAULT_FILTER: &str = "kinship_core=info,kinship_cli=info";

/// Filter selected by `--verbose`
pub const VERBOSE_FILTER: &str = "kinship_core=debug,kinship_cli=debug";

/// Rendering of log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}', expected 'pretty' or 'json'")),
        }
    }
}

/// Resolved logging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub format: LogFormat,
    /// Filter directives applied when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: DEFAULT_FILTER.to_string(),
        }
    }
}

impl TracingConfig {
    /// Combines the configured filter with the verbosity flag; `--verbose`
    /// wins over the config file.
    pub fn resolve(format: LogFormat, configured_filter: Option<&str>, verbose: bool) -> Self {
        let filter = if verbose {
            VERBOSE_FILTER.to_string()
        } else {
            configured_filter.unwrap_or(DEFAULT_FILTER).to_string()
        };
        Self { format, filter }
    }

    /// `RUST_LOG` if set and valid, the resolved filter otherwise.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.filter))
    }
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_tracing(config: &TracingConfig) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(config.env_filter());
    match config.format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }

    info!(format = ?config.format, filter = %config.filter, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_overrides_configured_filter() {
        let config = TracingConfig::resolve(LogFormat::Json, Some("kinship_core=warn"), true);
        assert_eq!(config.filter, VERBOSE_FILTER);
        assert_eq!(config.format, LogFormat::Json);

        let config = TracingConfig::resolve(LogFormat::Pretty, Some("kinship_core=warn"), false);
        assert_eq!(config.filter, "kinship_core=warn");

        let config = TracingConfig::resolve(LogFormat::Pretty, None, false);
        assert_eq!(config, TracingConfig::default());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("yaml".parse::<LogFormat>().is_err());
    }
}
