// src/recipe/runner.rs

//! Phase runner: drives one recipe from download to cleanup
//!
//! Phases run strictly in order:
//! download, unpack, environment, configure selection, patch, autogen,
//! configure, make, make install, clean. Hooks run at the fixed points
//! named by [`HookPoint`]. The first failing phase stops the run and leaves
//! the temporary directory in place for inspection.

use super::collaborators::{Collaborators, Invocation, PatchRequest, ProcessExecutor};
use super::configuration::BuildConfiguration;
use super::dirs::BuildDirectories;
use super::env::BuildEnv;
use super::installer::Installer;
use super::phase::{HookPoint, Phase};
use crate::error::{Error, Result};
use crate::options::Options;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runs the phases of a single recipe install
pub struct PhaseRunner<'a> {
    config: &'a BuildConfiguration,
    options: &'a mut Options,
    collaborators: &'a Collaborators,
    dirs: BuildDirectories,
    env: BuildEnv,
    phase: Phase,
    history: Vec<Phase>,
}

impl<'a> PhaseRunner<'a> {
    pub fn new(
        config: &'a BuildConfiguration,
        options: &'a mut Options,
        collaborators: &'a Collaborators,
        dirs: BuildDirectories,
    ) -> Self {
        Self {
            config,
            options,
            collaborators,
            dirs,
            env: BuildEnv::new(),
            phase: Phase::Started,
            history: vec![Phase::Started],
        }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Every phase reached so far, in order
    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    pub fn directories(&self) -> &BuildDirectories {
        &self.dirs
    }

    pub fn environment(&self) -> &BuildEnv {
        &self.env
    }

    /// Run all phases; on error the runner ends in [`Phase::Failed`]
    pub fn run(&mut self) -> Result<()> {
        let result = self.run_phases();
        if result.is_err() {
            self.phase = Phase::Failed;
            self.history.push(Phase::Failed);
        }
        result
    }

    fn run_phases(&mut self) -> Result<()> {
        self.dirs.create()?;

        let archive = self.download()?;
        self.advance(Phase::Downloaded);

        self.call_hook(HookPoint::PreUnpack)?;
        self.unpack(&archive)?;
        self.advance(Phase::Unpacked);

        self.env = BuildEnv::from_process(self.options, self.config);
        self.advance(Phase::EnvPrepared);
        self.call_hook(HookPoint::PostUnpack)?;

        let configure = self.choose_configure()?;
        self.advance(Phase::ConfigureChosen);

        self.patch()?;
        self.advance(Phase::Patched);

        self.call_hook(HookPoint::PreConfigure)?;
        self.autogen()?;
        self.advance(Phase::Autogenned);

        self.configure(&configure)?;
        self.advance(Phase::Configured);

        self.call_hook(HookPoint::PreMake)?;
        self.make()?;
        self.advance(Phase::Made);
        self.call_hook(HookPoint::PostBuild)?;

        self.make_install()?;
        self.advance(Phase::Installed);
        self.call_hook(HookPoint::PostMake)?;

        self.dirs.remove_working()?;
        self.advance(Phase::Cleaned);
        Ok(())
    }

    fn advance(&mut self, next: Phase) {
        debug_assert_eq!(self.phase.next(), Some(next));
        debug!("Phase {} -> {}", self.phase, next);
        self.phase = next;
        self.history.push(next);
    }

    fn call_hook(&self, hook: HookPoint) -> Result<()> {
        let Some(value) = self.options.get_trimmed(hook.option_key()) else {
            return Ok(());
        };
        info!("Running hook {}", hook);
        self.collaborators
            .hooks
            .invoke(hook, value, &self.dirs.build, &self.env)
    }

    fn download(&self) -> Result<PathBuf> {
        info!("Downloading {}", self.config.url);
        self.collaborators
            .downloader
            .fetch(&self.config.url, self.config.checksum.as_deref())
    }

    fn unpack(&mut self, archive: &Path) -> Result<()> {
        info!(
            "Unpacking {} into {}",
            archive.display(),
            self.dirs.tmp.display()
        );
        self.collaborators.unpacker.unpack(archive, &self.dirs.tmp)?;
        self.dirs
            .locate_compile_dir(self.config.inner_dir.as_deref())?;
        Ok(())
    }

    /// Settle the build directory and find the configure script
    fn choose_configure(&mut self) -> Result<PathBuf> {
        let configure = self.dirs.compile.join(&self.config.configure);

        if let Some(build_dir) = &self.config.build_dir {
            self.dirs.use_build_dir(build_dir)?;
        }
        self.options.set(
            "compile-directory",
            self.dirs.compile.to_string_lossy(),
        );

        if !self.config.skip.noconfigure && !configure.exists() {
            return Err(Error::MissingConfigureScript { path: configure });
        }
        Ok(configure)
    }

    fn patch(&self) -> Result<()> {
        if !self.config.patches.is_empty() {
            info!("Applying {} patch(es)", self.config.patches.len());
        }
        self.collaborators.patcher.apply(&PatchRequest {
            command: &self.config.patch_command,
            options: &self.config.patch_options,
            patches: &self.config.patches,
            target: &self.dirs.build,
            env: &self.env,
        })
    }

    fn autogen(&self) -> Result<()> {
        let Some(autogen) = &self.config.autogen else {
            return Ok(());
        };
        let script = self.dirs.build.join(autogen);
        let command = script.to_string_lossy();
        info!("Auto generating configure files with {}", command);
        run_checked(
            self.collaborators.executor.as_ref(),
            &Invocation::new(&command, &self.dirs.build, &self.env),
        )
    }

    fn configure(&self, script: &Path) -> Result<()> {
        if self.config.skip.noconfigure {
            info!("Skipping configure");
            return Ok(());
        }

        let mut command = format!(
            "{} {}{}",
            script.display(),
            self.config.prefix_option,
            self.config.prefix.display()
        );
        if !self.config.configure_options.is_empty() {
            command.push(' ');
            command.push_str(&self.config.configure_options);
        }

        info!("Configuring: {}", command);
        run_checked(
            self.collaborators.executor.as_ref(),
            &Invocation::new(&command, &self.dirs.build, &self.env),
        )
    }

    fn make(&self) -> Result<()> {
        if self.config.skip.nomake {
            info!("Skipping make");
            return Ok(());
        }

        let dir = subdir_or(&self.dirs.build, self.config.makedir.as_deref());
        run_make_targets(
            self.collaborators.executor.as_ref(),
            self.config,
            &self.env,
            &dir,
            &self.config.make_targets,
        )
    }

    fn make_install(&self) -> Result<()> {
        if self.config.skip.noinstall {
            info!("Skipping make install");
            return Ok(());
        }

        let dir = match self.config.makeinstalldir.as_deref() {
            Some(sub) if self.dirs.build.join(sub).is_dir() => self.dirs.build.join(sub),
            _ => subdir_or(&self.dirs.build, self.config.makedir.as_deref()),
        };

        Installer::new(
            self.config,
            self.collaborators.executor.as_ref(),
            self.collaborators.hooks.as_ref(),
            &self.env,
            &dir,
        )
        .with_pending_hook(self.options.get_trimmed(HookPoint::PendingMakeInstall.option_key()))
        .install()
    }
}

/// `base/sub` when `sub` is set and exists, else `base`
fn subdir_or(base: &Path, sub: Option<&str>) -> PathBuf {
    match sub {
        Some(sub) if base.join(sub).is_dir() => base.join(sub),
        _ => base.to_path_buf(),
    }
}

/// Run one command and turn a non-zero exit into [`Error::CommandFailed`]
pub(super) fn run_checked(executor: &dyn ProcessExecutor, invocation: &Invocation<'_>) -> Result<()> {
    let status = executor.run(invocation)?;
    if !status.success() {
        return Err(Error::CommandFailed {
            command: invocation.command.to_string(),
            code: status.code,
        });
    }
    Ok(())
}

/// Run `<make-binary> <make-options> <target>` for each target in `cwd`
///
/// Stops at the first target that exits non-zero.
pub(super) fn run_make_targets(
    executor: &dyn ProcessExecutor,
    config: &BuildConfiguration,
    env: &BuildEnv,
    cwd: &Path,
    targets: &[String],
) -> Result<()> {
    for target in targets {
        let command = format!("{} {} {}", config.make_binary, config.make_options, target);
        info!("Running: {} (in {})", command.trim_end(), cwd.display());

        let status = executor.run(&Invocation::new(&command, cwd, env))?;
        if !status.success() {
            return Err(Error::MakeTargetFailed {
                targets: targets.to_vec(),
                target: target.clone(),
                code: status.code,
            });
        }
    }
    Ok(())
}
