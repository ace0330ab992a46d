use std::path::PathBuf;

use clap::Parser;

use relink_edit::PipelineOptions;

#[derive(Debug, Parser)]
#[command(name = "relink")]
#[command(
    about = "Rewrite legacy fixed-form sources so several builds link into one process, with thread-private COMMON blocks."
)]
pub(crate) struct Cli {
    /// Directory holding the legacy sources (*.FOR, *.INC).
    pub(crate) src: PathBuf,

    /// Working directory for the step_<n> snapshots.
    pub(crate) work: PathBuf,

    /// Destination directory for the rewritten sources.
    pub(crate) dest: PathBuf,

    /// 1 to query the OpenMP thread index in the glue, 0 for the serial stub.
    #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
    pub(crate) openmp: u8,

    /// Debug logging (listed symbols, privatized blocks).
    #[arg(long)]
    pub(crate) verbose: bool,

    /// Only the mechanical rewrites: skip patch application and glue generation.
    #[arg(long)]
    pub(crate) partial: bool,

    /// Settings file (default: ./relink.yaml when present).
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Unified diff applied to the destination tree after the rewrites.
    #[arg(long)]
    pub(crate) patch: Option<PathBuf>,

    /// File name prefix (overrides settings).
    #[arg(long)]
    pub(crate) prefix: Option<String>,

    /// Symbol suffix (overrides settings).
    #[arg(long)]
    pub(crate) suffix: Option<String>,

    /// Directory receiving the generated glue source.
    #[arg(long, default_value = ".")]
    pub(crate) glue_dir: PathBuf,
}

impl Cli {
    pub(crate) fn pipeline_options(&self) -> PipelineOptions {
        let mut options = PipelineOptions::new(&self.src, &self.work, &self.dest);
        options.glue_dir.clone_from(&self.glue_dir);
        options.parallel = self.openmp == 1;
        options.partial = self.partial;
        options
    }
}
