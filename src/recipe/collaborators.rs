// src/recipe/collaborators.rs

//! External collaborators of a recipe
//!
//! The phase runner never downloads, extracts, patches or spawns anything
//! itself. Each of those jobs goes through one of these traits, so hosts can
//! plug in their own implementations and tests can record what happened.
//! The default implementations live in [`crate::system`].

use super::env::BuildEnv;
use super::phase::HookPoint;
use crate::error::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Fetches a source archive and returns its local path
pub trait Downloader: Send + Sync {
    /// Download `url`, verifying `checksum` when one is given
    fn fetch(&self, url: &str, checksum: Option<&str>) -> Result<PathBuf>;
}

/// Extracts an archive into a directory
pub trait Unpacker: Send + Sync {
    fn unpack(&self, archive: &Path, destination: &Path) -> Result<()>;
}

/// Everything needed to apply a recipe's patches
#[derive(Debug, Clone, Copy)]
pub struct PatchRequest<'a> {
    pub command: &'a str,
    pub options: &'a str,
    pub patches: &'a [PathBuf],
    /// Directory the patches are applied in
    pub target: &'a Path,
    pub env: &'a BuildEnv,
}

/// Applies patches to unpacked sources
pub trait PatchApplier: Send + Sync {
    /// Apply every patch in order; an empty patch list is a no-op
    fn apply(&self, request: &PatchRequest<'_>) -> Result<()>;
}

/// Runs the value of a hook option
pub trait HookRunner: Send + Sync {
    fn invoke(&self, hook: HookPoint, value: &str, cwd: &Path, env: &BuildEnv) -> Result<()>;
}

/// A command line to run, with its scoped context
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// Shell command line
    pub command: &'a str,
    pub cwd: &'a Path,
    pub env: &'a BuildEnv,
}

impl<'a> Invocation<'a> {
    pub fn new(command: &'a str, cwd: &'a Path, env: &'a BuildEnv) -> Self {
        Self { command, cwd, env }
    }
}

/// How a process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
}

impl RunStatus {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs command lines
pub trait ProcessExecutor: Send + Sync {
    /// Run to completion; a non-zero exit is a status, not an error
    fn run(&self, invocation: &Invocation<'_>) -> Result<RunStatus>;
}

/// The set of collaborators a recipe runs with
pub struct Collaborators {
    pub downloader: Box<dyn Downloader>,
    pub unpacker: Box<dyn Unpacker>,
    pub patcher: Box<dyn PatchApplier>,
    pub hooks: Box<dyn HookRunner>,
    pub executor: Arc<dyn ProcessExecutor>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
