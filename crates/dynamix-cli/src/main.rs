//! dynamix CLI: offline processing, analysis and preset management.

mod commands;
mod wav;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dynamix_config::{EngineConfig, user_config_file};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dynamix")]
#[command(author, version, about = "Dynamics processing and spectral analysis", long_about = None)]
struct Cli {
    /// Log filter (overrides RUST_LOG and the config file), e.g. "debug"
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    /// Engine config file (defaults to the user config file if present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file through a compressor
    Process(commands::process::ProcessArgs),

    /// Analyze a WAV file and suggest settings
    Analyze(commands::analyze::AnalyzeArgs),

    /// List parameters of a flavor
    Params(commands::params::ParamsArgs),

    /// List and manage presets
    Presets(commands::presets::PresetsArgs),

    /// List registered processors
    Flavors(commands::flavors::FlavorsArgs),
}

fn init_tracing(cli_filter: Option<&str>, config: &EngineConfig) {
    let filter = match cli_filter {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::load_or_default(user_config_file())?,
    };
    init_tracing(cli.log_level.as_deref(), &config);
    tracing::debug!(?config, "engine config");

    match cli.command {
        Commands::Process(args) => commands::process::run(args, &config),
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Params(args) => commands::params::run(args, &config),
        Commands::Presets(args) => commands::presets::run(args, &config),
        Commands::Flavors(args) => commands::flavors::run(args),
    }
}
