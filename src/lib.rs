// src/lib.rs

//! cmmi: configure/make/make-install build recipe
//!
//! Builds a source tarball into an isolated prefix from a flat option
//! mapping, the way a package-build orchestrator drives one part.
//!
//! # Architecture
//!
//! - Option resolution: generic and platform-suffixed options folded into
//!   one immutable `BuildConfiguration` through a typed rule table
//! - Phase runner: download, unpack, patch, autogen, configure, make and
//!   make install in strict order, with hooks at fixed points
//! - Installer: backup and rollback around the prefix
//! - Shared builds: prefixes keyed by a configuration fingerprint, guarded
//!   by a file lock and a completion marker
//! - Collaborators: downloading, unpacking, patching, hooks and processes
//!   sit behind traits; `system` holds the default implementations

pub mod config;
mod error;
pub mod filesystem;
pub mod hash;
pub mod options;
pub mod platform;
pub mod recipe;
pub mod system;

pub use config::HostConfig;
pub use error::{Error, Result};
pub use hash::{HashAlgorithm, Hasher};
pub use options::Options;
pub use platform::Platform;
pub use recipe::{
    BuildConfiguration, BuildDirectories, BuildEnv, Collaborators, Downloader, Fingerprint,
    HookPoint, HookRunner, InstallReport, Invocation, PatchApplier, PatchRequest, Phase,
    ProcessExecutor, Recipe, RunStatus, Unpacker,
};
