// src/recipe/installer.rs

//! Install phase with backup and rollback
//!
//! The prefix is copied to `<prefix>.old` before anything touches it. If
//! recreating the prefix, the pending-install hook, or any install target
//! fails, the half-installed prefix is removed and the backup moved back, so
//! a failed install leaves the prefix exactly as it was.
//!
//! The install targets go through the same make logic as the build, so
//! `nomake` skips them too. The prefix is still backed up and recreated.

use super::collaborators::{HookRunner, ProcessExecutor};
use super::configuration::BuildConfiguration;
use super::env::BuildEnv;
use super::phase::HookPoint;
use super::runner::run_make_targets;
use crate::error::{Error, Result};
use crate::filesystem::{copy_tree, remove_tree};
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

pub struct Installer<'a> {
    config: &'a BuildConfiguration,
    executor: &'a dyn ProcessExecutor,
    hooks: &'a dyn HookRunner,
    env: &'a BuildEnv,
    /// Directory `make install` runs in
    install_dir: &'a Path,
    pending_hook: Option<&'a str>,
}

impl<'a> Installer<'a> {
    pub fn new(
        config: &'a BuildConfiguration,
        executor: &'a dyn ProcessExecutor,
        hooks: &'a dyn HookRunner,
        env: &'a BuildEnv,
        install_dir: &'a Path,
    ) -> Self {
        Self {
            config,
            executor,
            hooks,
            env,
            install_dir,
            pending_hook: None,
        }
    }

    /// Hook to run once the prefix is recreated, before make install
    pub fn with_pending_hook(mut self, hook: Option<&'a str>) -> Self {
        self.pending_hook = hook;
        self
    }

    /// Run the install targets into the prefix, rolling back on failure
    pub fn install(&self) -> Result<()> {
        let prefix = &self.config.prefix;
        let backup = self.config.backup_prefix();

        if backup.exists() {
            warn!("Removing stale backup {}", backup.display());
            remove_tree(&backup)?;
        }

        let backed_up = prefix.exists();
        if backed_up {
            info!("Backing up {} to {}", prefix.display(), backup.display());
            if let Err(e) = copy_tree(prefix, &backup) {
                if let Err(cleanup) = remove_tree(&backup) {
                    warn!("Could not remove partial backup {}: {}", backup.display(), cleanup);
                }
                return Err(e);
            }
        }

        match self.install_into_prefix() {
            Ok(()) => {
                if backed_up {
                    remove_tree(&backup)?;
                }
                info!("Installed into {}", prefix.display());
                Ok(())
            }
            Err(e) => {
                error!("Install into {} failed: {}", prefix.display(), e);
                self.rollback(backed_up);
                Err(Error::InstallFailed {
                    source: Box::new(e),
                })
            }
        }
    }

    fn install_into_prefix(&self) -> Result<()> {
        let prefix = &self.config.prefix;

        if !self.config.install_in_place {
            remove_tree(prefix)?;
        }
        fs::create_dir_all(prefix)?;

        if let Some(hook) = self.pending_hook {
            info!("Running hook {}", HookPoint::PendingMakeInstall);
            self.hooks.invoke(
                HookPoint::PendingMakeInstall,
                hook,
                self.install_dir,
                self.env,
            )?;
        }

        if self.config.skip.nomake {
            info!("Skipping make install targets");
            return Ok(());
        }

        run_make_targets(
            self.executor,
            self.config,
            self.env,
            self.install_dir,
            &self.config.install_targets,
        )
    }

    /// Put the backup back in place of the prefix
    ///
    /// Rollback problems are logged; the install error is what gets reported.
    fn rollback(&self, backed_up: bool) {
        let prefix = &self.config.prefix;
        let backup = self.config.backup_prefix();

        if let Err(e) = remove_tree(prefix) {
            error!("Could not remove failed prefix {}: {}", prefix.display(), e);
        }
        if !backed_up {
            return;
        }
        match fs::rename(&backup, prefix) {
            Ok(()) => info!("Restored {} from backup", prefix.display()),
            Err(e) => error!(
                "Could not restore {} from {}: {}",
                prefix.display(),
                backup.display(),
                e
            ),
        }
    }
}
