// src/recipe/configuration.rs

//! The effective build configuration of a recipe
//!
//! Produced once by the option resolver and never mutated afterwards.

use crate::platform::Platform;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Phases the options ask to skip
///
/// Each flag is set when either the generic or the platform-suffixed option
/// is present, whatever its value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipFlags {
    pub noconfigure: bool,
    pub nomake: bool,
    pub noinstall: bool,
}

/// Effective configuration after option resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfiguration {
    /// Source archive URL or local path
    pub url: String,
    /// Expected checksum of the source archive (`md5` option)
    pub checksum: Option<String>,
    pub platform: Platform,
    /// Configure script name, relative to the compile directory
    pub configure: String,
    /// Install prefix (shared prefix in shared mode)
    pub prefix: PathBuf,
    pub prefix_separator: String,
    /// Option the prefix path is appended to, e.g. `--prefix=`
    pub prefix_option: String,
    /// Fully merged configure options
    pub configure_options: String,
    /// Generic configure options plus `extra_options`, before platform merges
    pub extra_options: String,
    /// Autogen script, relative to the build directory
    pub autogen: Option<String>,
    pub make_binary: String,
    pub make_options: String,
    /// Never empty; `[""]` runs the default target
    pub make_targets: Vec<String>,
    pub install_targets: Vec<String>,
    pub makedir: Option<String>,
    pub makeinstalldir: Option<String>,
    /// `KEY=VALUE` pairs from the `environment` option
    pub environment: BTreeMap<String, String>,
    pub shared: bool,
    pub install_in_place: bool,
    pub patch_command: String,
    pub patch_options: String,
    pub patches: Vec<PathBuf>,
    /// Out-of-tree build directory
    pub build_dir: Option<PathBuf>,
    /// Subdirectory of the extraction root to search for sources
    pub inner_dir: Option<PathBuf>,
    pub skip: SkipFlags,
}

impl BuildConfiguration {
    /// Backup location used while installing over an existing prefix
    pub fn backup_prefix(&self) -> PathBuf {
        backup_path(&self.prefix)
    }
}

/// `<prefix>.old`
pub fn backup_path(prefix: &Path) -> PathBuf {
    let mut name = prefix.as_os_str().to_os_string();
    name.push(".old");
    PathBuf::from(name)
}
