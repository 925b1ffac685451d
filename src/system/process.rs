// src/system/process.rs

//! Shell command execution with an explicit working directory and
//! environment overlay
//!
//! Commands run through `sh -c` so option values like
//! `make-options = "-j4 V=1"` keep their shell meaning. Output goes straight
//! to the terminal, the way a build would normally be watched.

use crate::error::{Error, Result};
use crate::recipe::{Invocation, ProcessExecutor, RunStatus};
use std::process::Command;
use tracing::{debug, info};

/// Default shell used to run command lines
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Executor running command lines through a POSIX shell
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
        }
    }
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessExecutor for ShellExecutor {
    fn run(&self, invocation: &Invocation<'_>) -> Result<RunStatus> {
        info!("Running: {}", invocation.command.trim_end());
        debug!("  cwd: {}", invocation.cwd.display());

        let status = Command::new(&self.shell)
            .arg("-c")
            .arg(invocation.command)
            .current_dir(invocation.cwd)
            .envs(invocation.env.vars())
            .status()
            .map_err(|e| {
                Error::IoError(format!(
                    "Failed to run '{}' in {}: {}",
                    invocation.command,
                    invocation.cwd.display(),
                    e
                ))
            })?;

        debug!("  exit: {:?}", status.code());
        Ok(RunStatus {
            code: status.code(),
        })
    }
}
