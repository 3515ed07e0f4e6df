//! Command-line front end for the kinship closure engine.

/// Clap command definitions and command execution
pub mod cli;
/// TOML configuration with environment overrides
pub mod config;
/// Log subscriber setup
pub mod tracing_setup;

pub use cli::{Cli, Command};
pub use config::{ConfigSource, KinshipConfig};
pub use tracing_setup::{LogFormat, TracingConfig, init_tracing};
