// src/recipe/mod.rs

//! The configure/make/make-install recipe
//!
//! A recipe takes a source archive and a flat option mapping and installs
//! the package into a prefix:
//! - Resolve options for the platform into a [`BuildConfiguration`]
//! - Download, unpack and patch the sources
//! - Run autogen, configure, make and make install
//! - Remove the working directories
//!
//! # Example Options
//!
//! ```toml
//! url = "http://zlib.net/zlib-1.3.1.tar.gz"
//! md5 = "9855b6d802d7fe5b7bd5b196a2271655"
//! configure-options = "--shared"
//! configure-options-darwin = "--archs='-arch x86_64'"
//! make-targets = ["all", "check"]
//! shared = true
//! ```
//!
//! # Shared Builds
//!
//! With `shared` set, the prefix becomes `<shared-root>/<fingerprint>` and
//! recipes with the same fingerprint reuse one build. See [`shared`].

mod collaborators;
mod configuration;
mod dirs;
mod env;
mod fingerprint;
mod installer;
mod phase;
pub mod resolve;
mod runner;
pub mod shared;

pub use collaborators::{
    Collaborators, Downloader, HookRunner, Invocation, PatchApplier, PatchRequest,
    ProcessExecutor, RunStatus, Unpacker,
};
pub use configuration::{backup_path, BuildConfiguration, SkipFlags};
pub use dirs::{single_inner_dir, BuildDirectories};
pub use env::BuildEnv;
pub use fingerprint::Fingerprint;
pub use installer::Installer;
pub use phase::{HookPoint, Phase};
pub use resolve::{KeySuffix, MergeStrategy, ResolutionRule};
pub use runner::PhaseRunner;
pub use shared::{CompletionMarker, SharedBuildLock, COMPLETE_MARKER};

use crate::config::HostConfig;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::platform::Platform;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// What an install did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Files registered with the host; this recipe never registers any
    pub managed_paths: Vec<PathBuf>,
    /// Prefix the package lives in
    pub prefix: PathBuf,
    /// Phases run, in order; empty when an existing shared build was reused
    pub phases: Vec<Phase>,
    /// An existing shared build was reused
    pub reused: bool,
}

/// A configure/make/make-install recipe for one part
pub struct Recipe {
    name: String,
    options: Options,
    config: BuildConfiguration,
    host: HostConfig,
    fingerprint: Option<Fingerprint>,
    collaborators: Collaborators,
}

impl Recipe {
    /// Resolve the options of part `name` and prepare the recipe
    pub fn new(
        name: impl Into<String>,
        mut options: Options,
        platform: &Platform,
        host: HostConfig,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let name = name.into();
        let config = BuildConfiguration::resolve(&name, &mut options, platform, &host)?;

        let fingerprint = if config.shared {
            fs::create_dir_all(host.shared_root())?;
            Some(Fingerprint::compute(&config))
        } else {
            None
        };

        Ok(Self {
            name,
            options,
            config,
            host,
            fingerprint,
            collaborators,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Options, including the values written back by resolution
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn configuration(&self) -> &BuildConfiguration {
        &self.config
    }

    /// Fingerprint of the configuration, in shared mode
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        self.fingerprint.as_ref()
    }

    pub fn prefix(&self) -> &Path {
        &self.config.prefix
    }

    /// Temporary directory the build runs in and is left in on failure
    pub fn tmp_dir(&self) -> PathBuf {
        BuildDirectories::tmp_dir_for(&self.host.work_dir, &self.name)
    }

    /// Build and install the part
    ///
    /// Any failure is logged and returned as [`Error::RecipeFailed`] with the
    /// original error as its source. The temporary directory is kept then.
    pub fn install(&mut self) -> Result<InstallReport> {
        info!("Installing {} into {}", self.name, self.config.prefix.display());

        let _lock = match &self.fingerprint {
            Some(fingerprint) => {
                let lock = SharedBuildLock::acquire(&self.host.shared_root(), fingerprint)
                    .map_err(|e| self.fail(e))?;
                Some(lock)
            }
            None => None,
        };

        if self.fingerprint.is_some() {
            let marker = CompletionMarker::read(&self.config.prefix).map_err(|e| self.fail(e))?;
            if marker.is_some() {
                info!(
                    "Reusing shared build of {} at {}",
                    self.name,
                    self.config.prefix.display()
                );
                return Ok(self.report(Vec::new(), true));
            }
        }

        let dirs = BuildDirectories::new(&self.name, &self.config, &self.host);
        let mut runner = PhaseRunner::new(&self.config, &mut self.options, &self.collaborators, dirs);
        let result = runner.run();
        let phases = runner.history().to_vec();

        if let Err(e) = result {
            return Err(self.fail(e));
        }

        if let Some(fingerprint) = &self.fingerprint {
            CompletionMarker::new(fingerprint.clone(), &self.config.url)
                .write(&self.config.prefix)
                .map_err(|e| self.fail(e))?;
        }

        info!("Installed {}", self.name);
        Ok(self.report(phases, false))
    }

    fn report(&self, phases: Vec<Phase>, reused: bool) -> InstallReport {
        InstallReport {
            managed_paths: Vec::new(),
            prefix: self.config.prefix.clone(),
            phases,
            reused,
        }
    }

    /// Log a failure and wrap it for the host
    fn fail(&self, source: Error) -> Error {
        let tmp_dir = self.tmp_dir();
        error!(
            "Compilation error. The package is left as is at {} where you can inspect what went wrong",
            tmp_dir.display()
        );
        error!("Message was:\n\t{}", source);

        Error::RecipeFailed {
            message: source.to_string(),
            tmp_dir,
            source: Box::new(source),
        }
    }
}

impl std::fmt::Debug for Recipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recipe")
            .field("name", &self.name)
            .field("prefix", &self.config.prefix)
            .field("shared", &self.config.shared)
            .finish_non_exhaustive()
    }
}
