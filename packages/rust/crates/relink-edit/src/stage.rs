//! Stage trait and snapshot sequencer.
//!
//! Snapshots are numbered directories `<work>/step_<n>`. The sequencer
//! reads snapshot *n*, runs a stage, fully writes snapshot *n+1* and only
//! then deletes snapshot *n*. A failing stage leaves snapshot *n* intact and
//! snapshot *n+1* absent.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use relink_io::{copy_files_into, ensure_dir, list_files, read_text_safe, remove_dir, write_text};

use crate::diff::{changed_line_count, generate_unified_diff};
use crate::error::EditError;
use crate::types::{RelinkConfig, SourceUnit};

/// One transformation from a snapshot's units to the next snapshot's units.
pub trait Stage {
    /// Side information produced alongside the units.
    type Report;

    /// Stage name used in logs, timings and errors.
    fn name(&self) -> &'static str;

    /// Build the next snapshot's units. Must not depend on anything but
    /// `units` and the stage's own configuration.
    ///
    /// # Errors
    /// Any error aborts the run.
    fn apply(&self, units: &[SourceUnit]) -> Result<StageOutput<Self::Report>, EditError>;
}

/// Units and report returned by a [`Stage`].
#[derive(Debug, Clone)]
pub struct StageOutput<R> {
    /// Units of the next snapshot.
    pub units: Vec<SourceUnit>,
    /// Stage-specific report.
    pub report: R,
}

/// Timing and change counts for one pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTiming {
    /// Step name.
    pub name: &'static str,
    /// Wall-clock duration.
    pub elapsed: Duration,
    /// Units in the produced snapshot.
    pub files: usize,
    /// Units whose content changed.
    pub changed: usize,
}

/// Name of a source file once copied into the first snapshot.
///
/// The run prefix is prepended; files listed in `declaration_units` switch
/// to the declaration-only extension.
#[must_use]
pub fn materialized_name(file_name: &str, config: &RelinkConfig) -> String {
    let is_declaration_unit = config
        .declaration_units
        .iter()
        .any(|ending| file_name.ends_with(ending.as_str()));
    let renamed = match Path::new(file_name).file_stem().and_then(|s| s.to_str()) {
        Some(stem) if is_declaration_unit => format!("{stem}.{}", config.declaration_extension),
        _ => file_name.to_string(),
    };
    format!("{}{renamed}", config.prefix)
}

/// Owner of the snapshot directories of one run.
#[derive(Debug)]
pub struct StageSequencer {
    work_dir: PathBuf,
    step: usize,
    max_file_size: u64,
    timings: Vec<StageTiming>,
}

impl StageSequencer {
    /// Materialize snapshot 0 from `src_dir` into `<work_dir>/step_0`.
    ///
    /// # Errors
    /// `EditError::Setup` when `src_dir` is unusable; I/O errors otherwise.
    pub fn materialize(
        src_dir: &Path,
        work_dir: &Path,
        config: &RelinkConfig,
    ) -> Result<Self, EditError> {
        let start = Instant::now();
        if !src_dir.is_dir() {
            return Err(EditError::Setup(format!(
                "source directory {} does not exist or is not a directory",
                src_dir.display()
            )));
        }
        ensure_dir(work_dir).map_err(|e| {
            EditError::Setup(format!("work directory {}: {e}", work_dir.display()))
        })?;

        let mut sequencer = Self {
            work_dir: work_dir.to_path_buf(),
            step: 0,
            max_file_size: config.max_file_size,
            timings: Vec::new(),
        };

        let target = sequencer.current_dir();
        remove_dir(&target)?;
        ensure_dir(&target)?;

        let extensions: Vec<&str> = config.source_extensions.iter().map(String::as_str).collect();
        let mut files = 0;
        for path in list_files(src_dir, &extensions)? {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                tracing::warn!(path = %path.display(), "skipping non UTF-8 file name");
                continue;
            };
            let dest = target.join(materialized_name(file_name, config));
            relink_io::copy_file(&path, &dest)?;
            files += 1;
        }

        sequencer.record("materialize", start.elapsed(), files, files);
        Ok(sequencer)
    }

    /// Directory of snapshot `step`.
    #[must_use]
    pub fn snapshot_dir(&self, step: usize) -> PathBuf {
        self.work_dir.join(format!("step_{step}"))
    }

    /// Directory of the current snapshot.
    #[must_use]
    pub fn current_dir(&self) -> PathBuf {
        self.snapshot_dir(self.step)
    }

    /// Number of the current snapshot.
    #[must_use]
    pub fn current_step(&self) -> usize {
        self.step
    }

    /// Timings recorded so far.
    #[must_use]
    pub fn timings(&self) -> &[StageTiming] {
        &self.timings
    }

    /// Record a step that does not produce a snapshot (e.g. symbol listing).
    pub fn record(&mut self, name: &'static str, elapsed: Duration, files: usize, changed: usize) {
        tracing::info!(
            stage = name,
            step = self.step,
            files,
            changed,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "stage complete"
        );
        self.timings.push(StageTiming {
            name,
            elapsed,
            files,
            changed,
        });
    }

    /// Read every unit of the current snapshot, sorted by name.
    ///
    /// # Errors
    /// Propagates read failures.
    pub fn load_current(&self) -> Result<Vec<SourceUnit>, EditError> {
        let dir = self.current_dir();
        let mut units = Vec::new();
        for path in list_files(&dir, &[])? {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let decoded = read_text_safe(&path, self.max_file_size)?;
            units.push(
                SourceUnit::from_text(name, &decoded.text, &dir).with_encoding(decoded.encoding),
            );
        }
        Ok(units)
    }

    /// Run `stage` on the current snapshot and make its output the current
    /// snapshot.
    ///
    /// # Errors
    /// `EditError::Stage` naming the stage; the current snapshot is kept and
    /// the partially written next snapshot is removed.
    pub fn advance<S: Stage>(&mut self, stage: &S) -> Result<S::Report, EditError> {
        let name = stage.name();
        let start = Instant::now();
        let next_dir = self.snapshot_dir(self.step + 1);

        let result = self.load_current().and_then(|units| {
            remove_dir(&next_dir)?;
            ensure_dir(&next_dir)?;
            let output = stage.apply(&units)?;
            for unit in &output.units {
                write_text(next_dir.join(&unit.name), &unit.to_text(), unit.encoding)?;
            }
            Ok((units, output))
        });

        let (before, output) = match result {
            Ok(done) => done,
            Err(err) => {
                if let Err(cleanup) = remove_dir(&next_dir) {
                    tracing::warn!(dir = %next_dir.display(), error = %cleanup, "failed to remove partial snapshot");
                }
                tracing::error!(stage = name, step = self.step + 1, error = %err, "stage failed");
                return Err(EditError::in_stage(name, err));
            }
        };

        remove_dir(self.current_dir()).map_err(|e| EditError::in_stage(name, e.into()))?;
        self.step += 1;

        let changed = count_changed(name, &before, &output.units);
        self.record(name, start.elapsed(), output.units.len(), changed);
        Ok(output.report)
    }

    /// Copy the current snapshot into `dest_dir` and delete it. Returns the
    /// saved file paths.
    ///
    /// # Errors
    /// Propagates copy and removal failures.
    pub fn save(&mut self, dest_dir: &Path) -> Result<Vec<PathBuf>, EditError> {
        let start = Instant::now();
        let current = self.current_dir();
        let saved = copy_files_into(&current, dest_dir)?;
        remove_dir(&current)?;
        self.record("save", start.elapsed(), saved.len(), 0);
        Ok(saved)
    }

    /// Consume the sequencer, returning every recorded timing.
    #[must_use]
    pub fn into_timings(self) -> Vec<StageTiming> {
        self.timings
    }
}

fn count_changed(stage: &str, before: &[SourceUnit], after: &[SourceUnit]) -> usize {
    after
        .iter()
        .filter(|unit| {
            let previous = before
                .iter()
                .find(|b| b.name == unit.name)
                .map(SourceUnit::to_text)
                .unwrap_or_default();
            let current = unit.to_text();
            if changed_line_count(&previous, &current) == 0 {
                return false;
            }
            if tracing::enabled!(tracing::Level::TRACE) {
                tracing::trace!(
                    stage,
                    unit = %unit.name,
                    "diff:\n{}",
                    generate_unified_diff(&unit.name, &previous, &current)
                );
            }
            true
        })
        .count()
}
