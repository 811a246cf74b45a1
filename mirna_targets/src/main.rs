use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::config::{default_config_path, load_config};
use crate::helper_functions::project_root;

mod analysis;
mod cli;
mod commands;
mod config;
mod data_handling;
mod error;
mod helper_functions;
mod models;
mod prediction_tools;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| default_config_path(&project_root()));

    info!("Starting mirna_targets");

    match cli.command {
        Commands::Search(args) => commands::search(&load_config(&config_path)?, args),
        Commands::Custom(args) => commands::custom(&load_config(&config_path)?, args),
        Commands::Compare(args) => commands::compare(&load_config(&config_path)?, args),
        Commands::Remake(args) => commands::remake(args),
        Commands::Collapse(args) => commands::collapse(args),
        Commands::Top(args) => commands::top(args),
        Commands::StripPrefix(args) => commands::strip_prefix(args),
        Commands::AddPrefix(args) => commands::add_prefix(args),
        Commands::InitConfig(args) => commands::init_config(&config_path, args),
    }
}
