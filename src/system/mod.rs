// src/system/mod.rs

//! Default collaborators for running recipes on the local machine
//!
//! - [`HttpDownloader`]: HTTP(S) downloads with a cache, local paths
//! - [`ArchiveUnpacker`]: `.tar`, `.tar.gz`, `.tar.xz` and directories
//! - [`CommandPatchApplier`]: runs the patch binary per patch file
//! - [`ShellHookRunner`]: hooks as shell commands
//! - [`ShellExecutor`]: `sh -c` with explicit cwd and environment

mod fetch;
mod hooks;
mod patch;
mod process;
mod unpack;

pub use fetch::{local_path, verify_checksum, HttpDownloader};
pub use hooks::ShellHookRunner;
pub use patch::CommandPatchApplier;
pub use process::{ShellExecutor, DEFAULT_SHELL};
pub use unpack::{ArchiveUnpacker, CompressionFormat};

use crate::config::HostConfig;
use crate::error::Result;
use crate::recipe::{Collaborators, ProcessExecutor};
use std::sync::Arc;

impl Collaborators {
    /// Collaborators for a real build on this machine
    pub fn system(host: &HostConfig) -> Result<Self> {
        let executor: Arc<dyn ProcessExecutor> = Arc::new(ShellExecutor::new());
        Ok(Self {
            downloader: Box::new(HttpDownloader::new(&host.download_cache, host.offline)?),
            unpacker: Box::new(ArchiveUnpacker::new()),
            patcher: Box::new(CommandPatchApplier::new()),
            hooks: Box::new(ShellHookRunner::new(Arc::clone(&executor))),
            executor,
        })
    }
}
