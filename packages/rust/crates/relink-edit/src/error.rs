//! Error types for the rewrite pipeline.
//!
//! Library crates use `thiserror` for explicit error enums.

use relink_io::IoError;
use thiserror::Error;

/// Error types for pipeline operations.
///
/// Each variant represents a specific failure mode; a failure inside a stage
/// is wrapped in [`EditError::Stage`] so callers can report which stage
/// aborted the run.
#[derive(Error, Debug)]
pub enum EditError {
    /// File I/O error (reading or writing a snapshot).
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// Unusable source, work or destination directory, detected before any
    /// stage runs.
    #[error("Setup error: {0}")]
    Setup(String),

    /// A stage failed; earlier snapshots remain on disk.
    #[error("stage '{stage}' failed: {source}")]
    Stage {
        /// Name of the failing stage.
        stage: &'static str,
        /// Underlying failure.
        #[source]
        source: Box<EditError>,
    },

    /// Symbol matcher could not be compiled.
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// The patch utility could not be started.
    #[error("failed to launch '{program}': {source}")]
    PatchLaunch {
        /// Program that was invoked.
        program: String,
        /// Spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The patch did not apply cleanly.
    #[error("patch {patch} failed (exit {code}): {diagnostic}")]
    Patch {
        /// Patch file that was applied.
        patch: String,
        /// Exit code of the patch utility (-1 when killed by a signal).
        code: i32,
        /// Output of the patch utility.
        diagnostic: String,
    },
}

impl EditError {
    /// Wrap an error as the failure of `stage`.
    #[must_use]
    pub fn in_stage(stage: &'static str, source: EditError) -> Self {
        Self::Stage {
            stage,
            source: Box::new(source),
        }
    }

    /// Name of the stage that failed, if this is a stage failure.
    #[must_use]
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            Self::Stage { stage, .. } => Some(stage),
            _ => None,
        }
    }
}
