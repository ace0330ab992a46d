//! External patch application.
//!
//! Residual fixups that cannot be derived mechanically are supplied as a
//! unified diff and applied once to the destination tree with a standard
//! `patch` utility.

use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};

use relink_io::IoError;

use crate::error::EditError;
use crate::types::PatchConfig;

/// Runs the patch utility against a directory.
#[derive(Debug, Clone)]
pub struct PatchApplier {
    program: String,
    strip: u32,
}

impl PatchApplier {
    /// Create an applier from patch settings.
    #[must_use]
    pub fn new(config: &PatchConfig) -> Self {
        Self {
            program: config.program.clone(),
            strip: config.strip,
        }
    }

    /// Apply `patch_file` with `target_dir` as working directory.
    ///
    /// # Errors
    /// `Io` when the patch file cannot be opened, `PatchLaunch` when the
    /// utility cannot be started, `Patch` with the utility's output when it
    /// exits unsuccessfully.
    pub fn apply(&self, patch_file: &Path, target_dir: &Path) -> Result<(), EditError> {
        let input = File::open(patch_file)
            .map_err(|_| IoError::NotFound(patch_file.display().to_string()))?;

        let output = Command::new(&self.program)
            .arg(format!("-p{}", self.strip))
            .current_dir(target_dir)
            .stdin(Stdio::from(input))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| EditError::PatchLaunch {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let diagnostic = [stderr.trim(), stdout.trim()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            return Err(EditError::Patch {
                patch: patch_file.display().to_string(),
                code: output.status.code().unwrap_or(-1),
                diagnostic,
            });
        }

        tracing::info!(patch = %patch_file.display(), target = %target_dir.display(), "patch applied");
        tracing::debug!("{}", stdout.trim_end());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn applier(program: &str) -> PatchApplier {
        PatchApplier::new(&PatchConfig {
            file: None,
            program: program.to_string(),
            strip: 1,
        })
    }

    #[test]
    fn test_missing_patch_file() {
        let dir = TempDir::new().unwrap();
        let result = applier("patch").apply(&dir.path().join("none.patch"), dir.path());
        assert!(matches!(result, Err(EditError::Io(IoError::NotFound(_)))));
    }

    #[test]
    fn test_missing_program() {
        let dir = TempDir::new().unwrap();
        let patch = dir.path().join("fix.patch");
        std::fs::write(&patch, "").unwrap();
        let result = applier("relink-no-such-patch-tool").apply(&patch, dir.path());
        assert!(matches!(result, Err(EditError::PatchLaunch { .. })));
    }

    #[test]
    fn test_clean_patch_applies_in_target_dir() {
        if Command::new("patch").arg("--version").output().is_err() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("dest");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("RP9_A.FOR"), "      X = 1\n").unwrap();
        let patch = dir.path().join("fix.patch");
        std::fs::write(
            &patch,
            "--- a/RP9_A.FOR\n+++ b/RP9_A.FOR\n@@ -1 +1 @@\n-      X = 1\n+      X = 2\n",
        )
        .unwrap();

        applier("patch").apply(&patch, &target).unwrap();
        assert_eq!(
            std::fs::read_to_string(target.join("RP9_A.FOR")).unwrap(),
            "      X = 2\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tool_is_fatal() {
        let dir = TempDir::new().unwrap();
        let patch = dir.path().join("fix.patch");
        std::fs::write(&patch, "").unwrap();
        let result = applier("false").apply(&patch, dir.path());
        assert!(matches!(result, Err(EditError::Patch { code: 1, .. })));
    }
}
