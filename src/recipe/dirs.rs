// src/recipe/dirs.rs

//! Working directories of a recipe install

use super::configuration::BuildConfiguration;
use crate::config::HostConfig;
use crate::error::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directories a recipe works in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDirectories {
    /// Extraction directory, removed on success
    pub tmp: PathBuf,
    /// Where the sources live after unpacking
    pub compile: PathBuf,
    /// Where configure and make run (custom or the compile directory)
    pub build: PathBuf,
    /// Install prefix
    pub prefix: PathBuf,
}

impl BuildDirectories {
    /// Temporary directory for recipe `name`
    pub fn tmp_dir_for(work_dir: &Path, name: &str) -> PathBuf {
        work_dir.join(format!("__cmmi__{}__tmp", name))
    }

    /// Lay out the directories of a recipe before anything is unpacked
    pub fn new(name: &str, config: &BuildConfiguration, host: &HostConfig) -> Self {
        let tmp = Self::tmp_dir_for(&host.work_dir, name);
        Self {
            compile: tmp.clone(),
            build: tmp.clone(),
            tmp,
            prefix: config.prefix.clone(),
        }
    }

    /// Create a fresh temporary directory and the prefix
    pub fn create(&self) -> Result<()> {
        if self.tmp.exists() {
            warn!("Removing stale build directory {}", self.tmp.display());
            fs::remove_dir_all(&self.tmp)?;
        }
        fs::create_dir_all(&self.tmp)?;
        fs::create_dir_all(&self.prefix)?;
        Ok(())
    }

    /// Resolve a path option relative to the temporary directory
    pub fn under_tmp(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.tmp.join(path)
        }
    }

    /// Find the compile directory once sources are extracted
    ///
    /// With an inner directory, the search starts there instead of at the
    /// extraction root.
    pub fn locate_compile_dir(&mut self, inner_dir: Option<&Path>) -> Result<&Path> {
        let root = match inner_dir {
            Some(inner) => self.under_tmp(inner),
            None => self.tmp.clone(),
        };
        self.compile = single_inner_dir(&root)?;
        self.build = self.compile.clone();
        debug!("Compile directory: {}", self.compile.display());
        Ok(&self.compile)
    }

    /// Switch to a custom build directory, creating it
    pub fn use_build_dir(&mut self, build_dir: &Path) -> Result<&Path> {
        self.build = self.under_tmp(build_dir);
        fs::create_dir_all(&self.build)?;
        debug!("Build directory: {}", self.build.display());
        Ok(&self.build)
    }

    /// Remove the build and temporary directories
    pub fn remove_working(&self) -> Result<()> {
        for dir in [&self.build, &self.tmp] {
            if dir.exists() {
                fs::remove_dir_all(dir)?;
            }
        }
        Ok(())
    }
}

/// The single directory inside `root`, or `root` itself
///
/// Archives usually carry one top-level directory; when `root` holds
/// exactly one entry and it is a directory, that is where the sources are.
pub fn single_inner_dir(root: &Path) -> io::Result<PathBuf> {
    let entries: Vec<_> = fs::read_dir(root)?.filter_map(|e| e.ok()).collect();

    if entries.len() == 1 && entries[0].file_type().map(|t| t.is_dir()).unwrap_or(false) {
        return Ok(entries[0].path());
    }
    Ok(root.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_single_inner_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("pkg-1.0")).unwrap();
        assert_eq!(single_inner_dir(root).unwrap(), root.join("pkg-1.0"));

        fs::write(root.join("README"), "x").unwrap();
        assert_eq!(single_inner_dir(root).unwrap(), root.to_path_buf());
    }

    #[test]
    fn test_single_file_is_not_a_compile_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("configure"), "#!/bin/sh\n").unwrap();
        assert_eq!(
            single_inner_dir(temp_dir.path()).unwrap(),
            temp_dir.path().to_path_buf()
        );
    }

    #[test]
    fn test_under_tmp() {
        let dirs = BuildDirectories {
            tmp: PathBuf::from("/w/__cmmi__x__tmp"),
            compile: PathBuf::from("/w/__cmmi__x__tmp"),
            build: PathBuf::from("/w/__cmmi__x__tmp"),
            prefix: PathBuf::from("/p"),
        };
        assert_eq!(
            dirs.under_tmp(Path::new("obj")),
            PathBuf::from("/w/__cmmi__x__tmp/obj")
        );
        assert_eq!(dirs.under_tmp(Path::new("/abs")), PathBuf::from("/abs"));
    }

    #[test]
    fn test_create_replaces_stale_tmp() {
        let temp_dir = TempDir::new().unwrap();
        let tmp = BuildDirectories::tmp_dir_for(temp_dir.path(), "zlib");
        fs::create_dir_all(&tmp).unwrap();
        fs::write(tmp.join("leftover"), "x").unwrap();

        let dirs = BuildDirectories {
            compile: tmp.clone(),
            build: tmp.clone(),
            tmp: tmp.clone(),
            prefix: temp_dir.path().join("prefix"),
        };
        dirs.create().unwrap();

        assert!(tmp.is_dir());
        assert!(!tmp.join("leftover").exists());
        assert!(dirs.prefix.is_dir());
    }
}
