// src/system/hooks.rs

//! Hook execution
//!
//! A hook option holds a shell command line. It runs in the build directory
//! with the recipe's environment overlay; a non-zero exit fails the phase.

use crate::error::{Error, Result};
use crate::recipe::{BuildEnv, HookPoint, HookRunner, Invocation, ProcessExecutor};
use std::path::Path;
use std::sync::Arc;

/// Runs hooks as shell commands through a process executor
pub struct ShellHookRunner {
    executor: Arc<dyn ProcessExecutor>,
}

impl ShellHookRunner {
    pub fn new(executor: Arc<dyn ProcessExecutor>) -> Self {
        Self { executor }
    }
}

impl HookRunner for ShellHookRunner {
    fn invoke(&self, hook: HookPoint, value: &str, cwd: &Path, env: &BuildEnv) -> Result<()> {
        let status = self.executor.run(&Invocation::new(value, cwd, env))?;
        if !status.success() {
            return Err(Error::HookFailed {
                hook: hook.to_string(),
                message: format!("'{}' exited with {:?}", value, status.code),
            });
        }
        Ok(())
    }
}
