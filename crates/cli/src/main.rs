//! newscorr CLI
//!
//! Provides commands for:
//! - `run`: full sentiment/returns study
//! - `indicators`: price indicators, metrics and charts only
//! - `sentiment`: daily headline sentiment only
//! - `config`: print the effective configuration

mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over --log-level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => commands::run(config, args),
        Commands::Indicators(args) => commands::indicators(config, args),
        Commands::Sentiment(args) => commands::sentiment(config, args),
        Commands::Config => commands::print_config(&config),
    }
}
