// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Arguments shared by every recipe subcommand
fn recipe_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("name").required(true).help("Part name"))
        .arg(
            Arg::new("option")
                .short('o')
                .long("option")
                .value_name("KEY=VALUE")
                .action(ArgAction::Append)
                .help("Recipe option as key=value"),
        )
        .arg(
            Arg::new("options_file")
                .short('f')
                .long("options-file")
                .value_name("PATH")
                .help("TOML file holding a flat table of options"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Host configuration file (TOML)"),
        )
        .arg(
            Arg::new("platform")
                .long("platform")
                .help("Platform to resolve options for"),
        )
        .arg(
            Arg::new("kernel_release")
                .long("kernel-release")
                .help("Kernel release used for darwin flavors"),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .action(ArgAction::SetTrue)
                .help("Only use archives already in the download cache"),
        )
}

fn build_cli() -> Command {
    Command::new("cmmi")
        .version(env!("CARGO_PKG_VERSION"))
        .author("cmmi Contributors")
        .about("Build and install configure/make/make-install source packages")
        .subcommand_required(true)
        .subcommand(recipe_args(
            Command::new("install").about("Build a part and install it into its prefix"),
        ))
        .subcommand(recipe_args(
            Command::new("resolve").about("Print the effective configuration of a part as JSON"),
        ))
        .subcommand(recipe_args(
            Command::new("fingerprint").about("Print the shared-build fingerprint of a part"),
        ))
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(Arg::new("shell").required(true).help("Shell to generate completions for")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("cmmi.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
