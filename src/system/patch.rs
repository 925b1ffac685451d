// src/system/patch.rs

//! Patch application
//!
//! Each patch file is fed on stdin to `<patch-binary> <patch-options>`,
//! run in the build directory.

use crate::error::{Error, Result};
use crate::recipe::{PatchApplier, PatchRequest};
use std::fs::File;
use std::process::{Command, Stdio};
use tracing::info;

use super::process::DEFAULT_SHELL;

/// Applies patches by running the configured patch command
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandPatchApplier;

impl CommandPatchApplier {
    pub fn new() -> Self {
        Self
    }
}

impl PatchApplier for CommandPatchApplier {
    fn apply(&self, request: &PatchRequest<'_>) -> Result<()> {
        let command = format!("{} {}", request.command, request.options);

        for patch in request.patches {
            info!("Applying patch {}", patch.display());
            let input = File::open(patch).map_err(|e| {
                Error::PatchError(format!("Cannot open patch {}: {}", patch.display(), e))
            })?;

            let output = Command::new(DEFAULT_SHELL)
                .arg("-c")
                .arg(&command)
                .current_dir(request.target)
                .envs(request.env.vars())
                .stdin(Stdio::from(input))
                .output()
                .map_err(|e| Error::PatchError(format!("Failed to run '{}': {}", command, e)))?;

            if !output.status.success() {
                return Err(Error::PatchError(format!(
                    "Failed to apply {}: {}{}",
                    patch.display(),
                    String::from_utf8_lossy(&output.stdout),
                    String::from_utf8_lossy(&output.stderr)
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::BuildEnv;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_patch_fed_on_stdin() {
        let temp_dir = TempDir::new().unwrap();
        let patch = temp_dir.path().join("fix.patch");
        fs::write(&patch, "patched\n").unwrap();
        let target = temp_dir.path().join("src");
        fs::create_dir_all(&target).unwrap();

        // `cat -` stands in for patch: it copies stdin to the named file
        let patches = vec![patch];
        let env = BuildEnv::new();
        CommandPatchApplier::new()
            .apply(&PatchRequest {
                command: "cat",
                options: "- > applied.txt",
                patches: &patches,
                target: &target,
                env: &env,
            })
            .unwrap();

        assert_eq!(
            fs::read_to_string(target.join("applied.txt")).unwrap(),
            "patched\n"
        );
    }

    #[test]
    fn test_missing_patch_file() {
        let temp_dir = TempDir::new().unwrap();
        let patches = vec![PathBuf::from("/nonexistent/fix.patch")];
        let env = BuildEnv::new();
        let err = CommandPatchApplier::new()
            .apply(&PatchRequest {
                command: "patch",
                options: "-p0",
                patches: &patches,
                target: temp_dir.path(),
                env: &env,
            })
            .unwrap_err();
        assert!(matches!(err, Error::PatchError(_)));
    }

    #[test]
    fn test_no_patches_is_noop() {
        let env = BuildEnv::new();
        CommandPatchApplier::new()
            .apply(&PatchRequest {
                command: "false",
                options: "",
                patches: &[],
                target: std::path::Path::new("/nonexistent"),
                env: &env,
            })
            .unwrap();
    }
}
