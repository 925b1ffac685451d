// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Install { recipe } => commands::cmd_install(&recipe),
        Commands::Resolve { recipe } => commands::cmd_resolve(&recipe),
        Commands::Fingerprint { recipe } => commands::cmd_fingerprint(&recipe),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "cmmi", &mut std::io::stdout());
            Ok(())
        }
    }
}
