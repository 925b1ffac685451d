// src/config.rs

//! Host configuration for running recipes
//!
//! This is the "global build context" a recipe runs in: where working
//! directories go, where downloads are cached, where shared builds live,
//! and which other parts the host declares.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration supplied by the host orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HostConfig {
    /// Directory holding temporary extraction directories
    pub work_dir: PathBuf,
    /// Directory holding default install prefixes (`<parts_dir>/<name>`)
    pub parts_dir: PathBuf,
    /// Directory for downloaded source archives
    pub download_cache: PathBuf,
    /// Root of fingerprint-keyed shared builds (default `<download_cache>/cmmi`)
    pub shared_root: Option<PathBuf>,
    /// Never hit the network; only serve archives already in the cache
    pub offline: bool,
    /// Names of the other parts declared in the build (e.g. `gmake`)
    pub parts: Vec<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        let base = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("cmmi");

        Self {
            work_dir: base.join("work"),
            parts_dir: base.join("parts"),
            download_cache: base.join("downloads"),
            shared_root: None,
            offline: false,
            parts: Vec::new(),
        }
    }
}

impl HostConfig {
    /// Create a configuration rooted at a single base directory
    ///
    /// Handy for tests and for hosts that keep everything under one tree.
    pub fn rooted_at(base: &Path) -> Self {
        Self {
            work_dir: base.join("work"),
            parts_dir: base.join("parts"),
            download_cache: base.join("downloads"),
            shared_root: None,
            offline: false,
            parts: Vec::new(),
        }
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            Error::ConfigError(format!("Invalid host config {}: {}", path.display(), e))
        })
    }

    /// Root directory of shared builds
    pub fn shared_root(&self) -> PathBuf {
        self.shared_root
            .clone()
            .unwrap_or_else(|| self.download_cache.join("cmmi"))
    }

    /// Whether the host declares a part with this name
    pub fn has_part(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p == name)
    }

    /// Set the declared parts
    pub fn with_parts(mut self, parts: &[&str]) -> Self {
        self.parts = parts.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Enable or disable offline mode
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }
}
