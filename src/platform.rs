// src/platform.rs

//! Platform identification for option resolution
//!
//! Platform-suffixed options (`configure-options-linux`, `make-binary-freebsd`)
//! are keyed by a lowercase `uname`-style identifier. On darwin the kernel
//! release additionally selects a named OS flavor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kernel releases that map to a named darwin flavor
const DARWIN_FLAVORS: &[(&str, &str)] = &[("9.8.0", "leopard"), ("10.0.0", "snowleopard")];

/// The platform a recipe is resolved for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Lowercase system name, e.g. `linux`, `darwin`, `freebsd`, `cygwin`
    pub id: String,
    /// Kernel release (`uname -r`), when known
    pub kernel_release: Option<String>,
}

impl Platform {
    /// Create a platform with an explicit identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into().to_lowercase(),
            kernel_release: None,
        }
    }

    /// Attach a kernel release
    pub fn with_kernel_release(mut self, release: impl Into<String>) -> Self {
        self.kernel_release = Some(release.into());
        self
    }

    /// Detect the platform of the running host
    pub fn detect() -> Self {
        let id = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        Self {
            id: id.to_string(),
            kernel_release: kernel_release(),
        }
    }

    pub fn is_linux(&self) -> bool {
        self.id == "linux"
    }

    pub fn is_cygwin(&self) -> bool {
        self.id.starts_with("cygwin")
    }

    pub fn is_darwin(&self) -> bool {
        self.id.contains("darwin")
    }

    /// Named darwin flavor for the running kernel, if any
    pub fn osx_flavor(&self) -> Option<&'static str> {
        if !self.is_darwin() {
            return None;
        }
        let release = self.kernel_release.as_deref()?;
        DARWIN_FLAVORS
            .iter()
            .find(|(kv, _)| *kv == release)
            .map(|(_, flavor)| *flavor)
    }

    /// Build the platform-suffixed form of an option key
    pub fn suffixed(&self, key: &str) -> String {
        format!("{}-{}", key, self.id)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kernel_release {
            Some(release) => write!(f, "{} ({})", self.id, release),
            None => write!(f, "{}", self.id),
        }
    }
}

#[cfg(unix)]
fn kernel_release() -> Option<String> {
    nix::sys::utsname::uname()
        .ok()
        .map(|uts| uts.release().to_string_lossy().into_owned())
}

#[cfg(not(unix))]
fn kernel_release() -> Option<String> {
    None
}
