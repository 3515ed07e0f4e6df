//! Command-line surface of the `kinship` binary

use crate::config::{ConfigSource, KinshipConfig};
use crate::tracing_setup::LogFormat;
use anyhow::Context;
use clap::{Parser, Subcommand};
use kinship_core::cardinality::CardinalityPolicy;
use kinship_core::closure::ClosurePipeline;
use kinship_core::{
    ClosureStage, FactLoader, KinshipEngine, Predicate, RunReport, loader, writer,
};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Kinship knowledge-base completer
#[derive(Parser, Debug)]
#[command(name = "kinship")]
#[command(about = "Closes kinship facts under family rules and derives exact cardinalities")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to $KINSHIP_CONFIG_PATH, then kinship.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log line format
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load, close and write completed facts plus cardinality assertions
    Complete {
        /// Fact dump, plain or gzip-compressed
        input: PathBuf,
        /// Completed facts output
        output: PathBuf,
        /// Cardinality assertions output
        cardinalities: PathBuf,
        /// Also write a JSON run report here
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Copy only the relational facts of a dump, without closing them
    Filter {
        /// Fact dump, plain or gzip-compressed
        input: PathBuf,
        /// Filtered facts output
        output: PathBuf,
    },

    /// Show the vocabulary, closure stages and cardinality policy
    Explain,
}

impl Cli {
    /// Log format after applying `--log-format` over the configuration.
    pub fn log_format(&self, config: &KinshipConfig) -> LogFormat {
        self.log_format.unwrap_or(config.logging.format)
    }

    /// Execute the parsed command against a loaded configuration
    pub fn execute(&self, config: &KinshipConfig, source: &ConfigSource) -> anyhow::Result<()> {
        match source {
            ConfigSource::File(path) => info!(path = %path.display(), "Loaded configuration"),
            ConfigSource::Defaults(path) => warn!(
                path = %path.display(),
                "Configuration file not found. Using default configuration."
            ),
        }

        match &self.command {
            Command::Complete {
                input,
                output,
                cardinalities,
                report,
            } => {
                let report_path = report
                    .as_deref()
                    .or(config.output.write_report_path.as_deref());
                let report = complete(config, input, output, cardinalities, report_path)?;
                print!("{}", format_summary(&report, output, cardinalities));
                Ok(())
            }
            Command::Filter { input, output } => filter(config, input, output),
            Command::Explain => {
                print!("{}", explain());
                Ok(())
            }
        }
    }
}

/// Full batch run; writes the report when a path is given.
pub fn complete(
    config: &KinshipConfig,
    input: &Path,
    output: &Path,
    cardinalities: &Path,
    report_path: Option<&Path>,
) -> anyhow::Result<RunReport> {
    let mut engine = KinshipEngine::new(config.loader.clone());
    let report = engine
        .run(input, output, cardinalities)
        .with_context(|| format!("Failed to complete facts from {}", input.display()))?;

    if let Some(path) = report_path {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write run report to {}", path.display()))?;
        info!(path = %path.display(), "Run report written");
    }
    Ok(report)
}

fn filter(config: &KinshipConfig, input: &Path, output: &Path) -> anyhow::Result<()> {
    let reader = loader::open_input(input).context("Failed to open input")?;
    let out = writer::create_output(output).context("Failed to create output")?;
    let stats = FactLoader::new(config.loader.clone())
        .filter(reader, input, out, output)
        .with_context(|| format!("Failed to filter {}", input.display()))?;

    println!(
        "Kept {} relational facts out of {} lines ({} malformed) in {}",
        stats.kept,
        stats.lines,
        stats.malformed,
        output.display()
    );
    Ok(())
}

/// Per-predicate summary printed after `complete`.
pub fn format_summary(report: &RunReport, output: &Path, cardinalities: &Path) -> String {
    let mut summary = String::new();
    let total: usize = report.fact_counts.values().sum();
    let _ = writeln!(summary, "Wrote {total} facts to {}", output.display());
    for (predicate, count) in &report.fact_counts {
        let _ = writeln!(
            summary,
            "  {:<6} {:<14} {count}",
            predicate.code(),
            predicate.role()
        );
    }
    let _ = writeln!(
        summary,
        "Wrote {} cardinality assertions for {} people to {}",
        report.cardinalities,
        report.people,
        cardinalities.display()
    );
    if report.load.malformed > 0 {
        let _ = writeln!(summary, "Skipped {} malformed lines", report.load.malformed);
    }
    summary
}

/// Text printed by `kinship explain`.
pub fn explain() -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Kinship knowledge-base completer");
    let _ = writeln!(text);
    let _ = writeln!(text, "Vocabulary:");
    for predicate in Predicate::ALL {
        let kind = if !predicate.is_relational() {
            "auxiliary"
        } else if predicate.is_symmetric() {
            "symmetric"
        } else {
            "stored"
        };
        let _ = writeln!(
            text,
            "  {:<6} {:<14} {kind}",
            predicate.code(),
            predicate.role()
        );
    }

    let _ = writeln!(text);
    let _ = writeln!(text, "Closure stages:");
    let pipeline = ClosurePipeline::standard();
    for (i, stage) in pipeline.stages().enumerate() {
        let _ = writeln!(text, "  {}. {:<22} {}", i + 1, stage.id(), stage.describe());
    }

    let _ = writeln!(text);
    let _ = writeln!(text, "Cardinality policy:");
    for (predicate, strategy) in CardinalityPolicy::standard().entries() {
        let _ = writeln!(
            text,
            "  {:<6} {:<14} {}",
            predicate.code(),
            predicate.role(),
            strategy.describe()
        );
    }
    text
}
