//! Error handling for the kinship closure engine
//!
//! Only unrecoverable conditions are errors here. Malformed input lines and
//! unrecognised gender codes are data-quality signals and are reported
//! through `tracing` and [`crate::loader::LoadStats`] instead.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for kinship engine operations
#[derive(Error, Debug)]
pub enum KinshipError {
    /// Reading the input or writing an output failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fact store misuse, e.g. inserting an auxiliary predicate
    #[error("Fact store error: {message}")]
    FactStore {
        message: String,
        operation: Option<String>,
    },

    /// Closure pipeline misconfiguration or ordering violation
    #[error("Pipeline error: {message}")]
    Pipeline {
        message: String,
        stage: Option<String>,
    },

    /// Invalid configuration values
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        setting: Option<String>,
    },

    /// Report serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KinshipError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            KinshipError::Io { .. } => "io",
            KinshipError::FactStore { .. } => "fact_store",
            KinshipError::Pipeline { .. } => "pipeline",
            KinshipError::Configuration { .. } => "configuration",
            KinshipError::Serialization(_) => "serialization",
        }
    }

    /// Create an I/O error bound to the file it happened on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a fact store operation error
    pub fn fact_store(operation: &str, message: impl Into<String>) -> Self {
        Self::FactStore {
            message: message.into(),
            operation: Some(operation.to_string()),
        }
    }

    /// Create a pipeline error attributed to a stage
    pub fn pipeline_stage(stage: &str, message: impl Into<String>) -> Self {
        Self::Pipeline {
            message: message.into(),
            stage: Some(stage.to_string()),
        }
    }

    /// Create a pipeline error not tied to one stage
    pub fn pipeline(message: impl Into<String>) -> Self {
        Self::Pipeline {
            message: message.into(),
            stage: None,
        }
    }

    /// Create a configuration error for a setting
    pub fn configuration(setting: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            setting: Some(setting.to_string()),
        }
    }
}

/// Result type alias for engine operations
pub type KinshipResult<T> = Result<T, KinshipError>;

/// Extension trait for attaching a path to raw I/O results
pub trait IoResultExt<T> {
    /// Wrap an I/O error with the path it occurred on
    fn with_path(self, path: impl AsRef<Path>) -> KinshipResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl AsRef<Path>) -> KinshipResult<T> {
        self.map_err(|source| KinshipError::io(path, source))
    }
}
