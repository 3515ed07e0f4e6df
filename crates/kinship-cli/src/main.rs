use anyhow::Context;
use clap::Parser;
use kinship_cli::{Cli, KinshipConfig, TracingConfig, init_tracing};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, source) =
        KinshipConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let config = config.apply_profile();

    let tracing = TracingConfig::resolve(
        cli.log_format(&config),
        config.logging.filter.as_deref(),
        cli.verbose,
    );
    init_tracing(&tracing)?;

    cli.execute(&config, &source)
}
