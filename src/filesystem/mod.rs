// src/filesystem/mod.rs

//! Filesystem helpers shared by the installer and the unpacker
//!
//! - `copy_tree`: recursive copy keeping file and directory permissions and
//!   symlinks, used to back up a prefix and to stage directory sources
//! - `remove_tree`: `remove_dir_all` that tolerates a missing path

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Recursively copy `src` to `dst`
///
/// `dst` is created if needed. Files and directories keep their permission
/// bits, symlinks are recreated rather than followed.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;

    // Directory modes are applied once the walk is done, deepest first, so a
    // read-only directory can still be filled.
    let mut dir_modes = Vec::new();

    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(|e| {
            Error::IoError(format!("Failed to walk {}: {}", src.display(), e))
        })?;
        let path = entry.path();

        let relative = match path.strip_prefix(src) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
            let permissions = entry
                .metadata()
                .map_err(|e| {
                    Error::IoError(format!("Failed to stat {}: {}", path.display(), e))
                })?
                .permissions();
            dir_modes.push((target, permissions));
        } else if file_type.is_symlink() {
            copy_symlink(path, &target)?;
        } else {
            fs::copy(path, &target)?;
        }
    }

    for (dir, permissions) in dir_modes.into_iter().rev() {
        fs::set_permissions(&dir, permissions)?;
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    let pointee = fs::read_link(link)?;
    std::os::unix::fs::symlink(pointee, target)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    fs::copy(link, target)?;
    Ok(())
}

/// Remove a directory tree if it exists
pub fn remove_tree(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path)?,
        Ok(_) => fs::remove_file(path)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
