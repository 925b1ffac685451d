// src/commands.rs
//! Command handlers for the cmmi CLI

use crate::cli::RecipeArgs;
use anyhow::{Context, Result};
use cmmi::{BuildConfiguration, Collaborators, Fingerprint, HostConfig, Options, Platform, Recipe};
use serde::Serialize;
use tracing::{debug, info};

/// Everything a recipe needs, gathered from the command line
struct RecipeInput {
    name: String,
    options: Options,
    platform: Platform,
    host: HostConfig,
}

fn load_input(args: &RecipeArgs) -> Result<RecipeInput> {
    let mut host = match &args.config {
        Some(path) => HostConfig::from_file(path)
            .with_context(|| format!("Failed to load host config {}", path.display()))?,
        None => HostConfig::default(),
    };
    if args.offline {
        host.offline = true;
    }

    let mut options = match &args.options_file {
        Some(path) => Options::from_toml_file(path)
            .with_context(|| format!("Failed to load options {}", path.display()))?,
        None => Options::new(),
    };
    for pair in &args.options {
        let (key, value) = Options::parse_pair(pair)?;
        options.set(key, value);
    }

    let mut platform = match &args.platform {
        Some(id) => Platform::new(id.as_str()),
        None => Platform::detect(),
    };
    if let Some(release) = &args.kernel_release {
        platform = platform.with_kernel_release(release.as_str());
    }

    debug!("Resolving {} for {}", args.name, platform);
    Ok(RecipeInput {
        name: args.name.clone(),
        options,
        platform,
        host,
    })
}

/// Build and install a part
pub fn cmd_install(args: &RecipeArgs) -> Result<()> {
    let input = load_input(args)?;
    let collaborators = Collaborators::system(&input.host)?;
    let mut recipe = Recipe::new(
        input.name,
        input.options,
        &input.platform,
        input.host,
        collaborators,
    )?;

    let report = recipe.install()?;
    if report.reused {
        info!("Shared build already complete");
        println!("Reused {}", report.prefix.display());
    } else {
        println!("Installed {}", report.prefix.display());
    }
    Ok(())
}

#[derive(Serialize)]
struct ResolveOutput<'a> {
    configuration: &'a BuildConfiguration,
    fingerprint: Fingerprint,
    options: &'a Options,
}

/// Print the effective configuration and the written-back options
pub fn cmd_resolve(args: &RecipeArgs) -> Result<()> {
    let RecipeInput {
        name,
        mut options,
        platform,
        host,
    } = load_input(args)?;
    let configuration = BuildConfiguration::resolve(&name, &mut options, &platform, &host)?;

    let output = ResolveOutput {
        fingerprint: Fingerprint::compute(&configuration),
        configuration: &configuration,
        options: &options,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Print the fingerprint a shared build would use
pub fn cmd_fingerprint(args: &RecipeArgs) -> Result<()> {
    let RecipeInput {
        name,
        mut options,
        platform,
        host,
    } = load_input(args)?;
    let configuration = BuildConfiguration::resolve(&name, &mut options, &platform, &host)?;
    println!("{}", Fingerprint::compute(&configuration));
    Ok(())
}
