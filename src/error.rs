// src/error.rs

//! Error types for the cmmi recipe
//!
//! Phase-level failures carry their own variants. The top-level install
//! entry point wraps whatever went wrong into [`Error::RecipeFailed`], which
//! keeps the original cause as its source and points at the temporary
//! directory left behind for inspection.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The configure script could not be found and configure was not skipped
    #[error("Invalid package contents, there is no configure script at {}", .path.display())]
    MissingConfigureScript { path: PathBuf },

    /// A make (or make install) target returned non-zero
    #[error("Make failed for targets: {targets:?} (target '{target}' exited with {code:?})")]
    MakeTargetFailed {
        targets: Vec<String>,
        target: String,
        code: Option<i32>,
    },

    /// The install phase failed; the prefix has already been rolled back
    #[error("Install failed:\n\t{source}")]
    InstallFailed {
        #[source]
        source: Box<Error>,
    },

    /// Umbrella error handed to the host orchestrator
    #[error("Recipe failed, cant install: {message} (build left at {})", .tmp_dir.display())]
    RecipeFailed {
        message: String,
        tmp_dir: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// A subprocess returned non-zero
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// A configured hook failed
    #[error("Hook '{hook}' failed: {message}")]
    HookFailed { hook: String, message: String },

    #[error("Download error: {0}")]
    DownloadError(String),

    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Unpack error: {0}")]
    UnpackError(String),

    #[error("Patch error: {0}")]
    PatchError(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Missing required option '{0}'")]
    MissingOption(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Walk the source chain down to the innermost recipe error
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::RecipeFailed { source, .. } | Self::InstallFailed { source } => {
                source.root_cause()
            }
            other => other,
        }
    }
}
