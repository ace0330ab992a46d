//! End-to-end driver.
//!
//! Owns the stage order and the lifecycle of every snapshot:
//! materialize → normalize → privatize → list symbols → rename → save, then
//! (unless partial) patch and glue generation.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use relink_io::{TextEncoding, ensure_dir, write_text};

use crate::error::EditError;
use crate::glue::GlueGenerator;
use crate::normalize::NormalizeStage;
use crate::patch::PatchApplier;
use crate::privatize::PrivatizeStage;
use crate::rename::{RenameStage, RenameStats, Renamer};
use crate::stage::{StageSequencer, StageTiming};
use crate::symbols::extract_symbols;
use crate::types::RelinkConfig;

/// Directories and switches of one run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Directory holding the legacy sources.
    pub src_dir: PathBuf,
    /// Directory receiving the `step_<n>` snapshots.
    pub work_dir: PathBuf,
    /// Directory receiving the rewritten sources.
    pub dest_dir: PathBuf,
    /// Directory receiving the generated glue source.
    pub glue_dir: PathBuf,
    /// Generate an OpenMP thread index query instead of the serial stub.
    pub parallel: bool,
    /// Stop after saving the mechanical rewrites (no patch, no glue).
    pub partial: bool,
}

impl PipelineOptions {
    /// Serial, complete run writing the glue into the current directory.
    pub fn new(
        src_dir: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
        dest_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            src_dir: src_dir.into(),
            work_dir: work_dir.into(),
            dest_dir: dest_dir.into(),
            glue_dir: PathBuf::from("."),
            parallel: false,
            partial: false,
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Per-step timings, in execution order.
    pub timings: Vec<StageTiming>,
    /// Privatized COMMON blocks, sorted.
    pub blocks: Vec<String>,
    /// Number of distinct renamed symbols.
    pub symbols: usize,
    /// Rename counters.
    pub renamed: RenameStats,
    /// Files written to the destination directory.
    pub outputs: Vec<PathBuf>,
    /// Whether a patch was applied.
    pub patched: bool,
    /// Generated glue source, unless the run was partial.
    pub glue_file: Option<PathBuf>,
}

impl RunReport {
    /// Sum of all step durations.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.timings.iter().map(|t| t.elapsed).sum()
    }
}

/// The rewrite pipeline for one configuration.
#[derive(Debug, Clone, Default)]
pub struct RelinkPipeline {
    config: RelinkConfig,
}

impl RelinkPipeline {
    /// Create a pipeline.
    #[must_use]
    pub fn new(config: RelinkConfig) -> Self {
        Self { config }
    }

    /// Run configuration.
    #[must_use]
    pub fn config(&self) -> &RelinkConfig {
        &self.config
    }

    /// Run every stage. The first failure aborts the run; snapshots written
    /// before it stay under the work directory.
    ///
    /// # Errors
    /// `Setup` for unusable directories or a missing patch file (before any
    /// stage runs), `Stage` naming the failing stage otherwise.
    pub fn run(&self, options: &PipelineOptions) -> Result<RunReport, EditError> {
        let config = &self.config;
        self.check_setup(options)?;

        tracing::info!(
            src = %options.src_dir.display(),
            work = %options.work_dir.display(),
            dest = %options.dest_dir.display(),
            prefix = %config.prefix,
            suffix = %config.suffix,
            "starting relink run"
        );

        let mut sequencer = StageSequencer::materialize(&options.src_dir, &options.work_dir, config)
            .map_err(|e| match e {
                EditError::Setup(_) => e,
                other => EditError::in_stage("materialize", other),
            })?;
        sequencer.advance(&NormalizeStage::new(config))?;
        let registry = sequencer.advance(&PrivatizeStage::new(config))?;

        let start = Instant::now();
        let units = sequencer
            .load_current()
            .map_err(|e| EditError::in_stage("list symbols", e))?;
        let symbols = extract_symbols(&units);
        sequencer.record("list symbols", start.elapsed(), units.len(), 0);

        let renamer =
            Renamer::new(&symbols, &config.suffix).map_err(|e| EditError::in_stage("rename", e))?;
        let renamed = sequencer.advance(&RenameStage::new(renamer))?;
        let outputs = sequencer
            .save(&options.dest_dir)
            .map_err(|e| EditError::in_stage("save", e))?;

        let mut report = RunReport {
            timings: Vec::new(),
            blocks: registry.blocks().map(str::to_string).collect(),
            symbols: symbols.len(),
            renamed,
            outputs,
            patched: false,
            glue_file: None,
        };

        if options.partial {
            tracing::info!("partial run: skipping patch and glue generation");
            report.timings = sequencer.into_timings();
            return Ok(report);
        }

        if let Some(patch_file) = &config.patch.file {
            let start = Instant::now();
            PatchApplier::new(&config.patch)
                .apply(patch_file, &options.dest_dir)
                .map_err(|e| EditError::in_stage("patch", e))?;
            sequencer.record("patch", start.elapsed(), 0, 0);
            report.patched = true;
        } else {
            tracing::warn!("no patch file configured; skipping patch application");
        }

        let start = Instant::now();
        let glue = GlueGenerator::new(&registry, config, options.parallel);
        let glue_file = options.glue_dir.join(config.glue_file_name());
        write_text(&glue_file, &glue.render(), TextEncoding::Utf8)
            .map_err(|e| EditError::in_stage("glue", e.into()))?;
        tracing::info!(
            file = %glue_file.display(),
            blocks = glue.block_count(),
            parallel = options.parallel,
            "glue source written"
        );
        sequencer.record("glue", start.elapsed(), 1, 1);
        report.glue_file = Some(glue_file);

        report.timings = sequencer.into_timings();
        Ok(report)
    }

    fn check_setup(&self, options: &PipelineOptions) -> Result<(), EditError> {
        if !options.src_dir.is_dir() {
            return Err(EditError::Setup(format!(
                "source directory {} does not exist or is not a directory",
                options.src_dir.display()
            )));
        }
        ensure_usable(&options.work_dir, "work")?;
        ensure_usable(&options.dest_dir, "destination")?;
        if !options.partial {
            ensure_usable(&options.glue_dir, "glue output")?;
            if let Some(patch) = &self.config.patch.file
                && !patch.is_file()
            {
                return Err(EditError::Setup(format!(
                    "patch file {} does not exist",
                    patch.display()
                )));
            }
        }
        Ok(())
    }
}

fn ensure_usable(dir: &Path, role: &str) -> Result<(), EditError> {
    ensure_dir(dir).map_err(|e| EditError::Setup(format!("{role} directory {}: {e}", dir.display())))
}
