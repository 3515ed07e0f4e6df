use crate::tracing_setup::LogFormat;
use kinship_core::{KinshipError, KinshipResult, LoaderOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "KINSHIP_CONFIG_PATH";

/// Configuration file used when neither `--config` nor the environment name one
pub const DEFAULT_CONFIG_PATH: &str = "kinship.toml";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    #[serde(default = "default_env_type")]
    pub env_type: String,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            env_type: default_env_type(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// `EnvFilter` directives; `RUST_LOG` still takes precedence
    pub filter: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Where `complete` writes its JSON run report when `--report` is absent
    pub write_report_path: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct KinshipConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub loader: LoaderOptions,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// The named file did not exist; built-in defaults are in use
    Defaults(PathBuf),
}

impl KinshipConfig {
    /// Path from the command line, then `KINSHIP_CONFIG_PATH`, then `kinship.toml`.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit.map(Path::to_path_buf).unwrap_or_else(|| {
            std::env::var(CONFIG_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
        })
    }

    /// Loads the configuration file.
    ///
    /// A missing file yields the defaults; an unreadable or invalid file is an
    /// error. Runs before logging is installed, so the caller reports the
    /// returned [`ConfigSource`].
    pub fn load(explicit: Option<&Path>) -> KinshipResult<(Self, ConfigSource)> {
        let path = Self::resolve_path(explicit);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let config = Self::from_toml_str(&contents).map_err(|e| {
                    KinshipError::configuration(&path.display().to_string(), e.to_string())
                })?;
                Ok((config, ConfigSource::File(path)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Ok((Self::default(), ConfigSource::Defaults(path)))
            }
            Err(e) => Err(KinshipError::io(&path, e)),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Applies `KINSHIP_*` environment overrides; unparsable values are
    /// logged and ignored.
    pub fn apply_profile(mut self) -> Self {
        info!(env_type = %self.environment.env_type, "Applying configuration profile");

        if let Ok(format) = std::env::var("KINSHIP_LOG_FORMAT") {
            match format.parse::<LogFormat>() {
                Ok(format) => self.logging.format = format,
                Err(e) => warn!(error = %e, "Ignoring KINSHIP_LOG_FORMAT"),
            }
        }
        if let Ok(limit) = std::env::var("KINSHIP_MAX_MALFORMED_REPORTS") {
            match limit.parse::<usize>() {
                Ok(limit) => self.loader.max_malformed_reports = limit,
                Err(e) => warn!(
                    error = %e,
                    value = %limit,
                    "Ignoring KINSHIP_MAX_MALFORMED_REPORTS"
                ),
            }
        }

        self
    }
}

fn default_env_type() -> String {
    "default".to_string()
}
