// src/cli.rs
//! CLI definitions for cmmi
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cmmi")]
#[command(author = "cmmi Contributors")]
#[command(version)]
#[command(about = "Build and install configure/make/make-install source packages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a part and install it into its prefix
    Install {
        #[command(flatten)]
        recipe: RecipeArgs,
    },

    /// Print the effective configuration of a part as JSON
    Resolve {
        #[command(flatten)]
        recipe: RecipeArgs,
    },

    /// Print the shared-build fingerprint of a part
    Fingerprint {
        #[command(flatten)]
        recipe: RecipeArgs,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments describing one recipe
#[derive(Args, Debug, Clone)]
pub struct RecipeArgs {
    /// Part name (names the default prefix and the temporary directory)
    pub name: String,

    /// Recipe option as key=value (repeatable, `\n` separates list entries)
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// TOML file holding a flat table of options
    #[arg(short = 'f', long, value_name = "PATH")]
    pub options_file: Option<PathBuf>,

    /// Host configuration file (TOML)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Platform to resolve options for (default: this host)
    #[arg(long)]
    pub platform: Option<String>,

    /// Kernel release used for darwin flavors (default: this host)
    #[arg(long)]
    pub kernel_release: Option<String>,

    /// Only use archives already in the download cache
    #[arg(long)]
    pub offline: bool,
}
