//! relink CLI: rewrite a legacy source directory into a relinkable,
//! thread-private build.
//!
//! Usage: `relink <SRC> <WORK> <DEST> <OPENMP> [--verbose] [--partial]`
//!
//! Logging: set `RUST_LOG=relink_edit=debug` (or `trace` for per-stage diffs)
//! to see pipeline logs on stderr.

mod cli;
mod report;
mod settings;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use relink_edit::RelinkPipeline;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "relink=debug,relink_edit=debug,relink_io=debug"
        } else {
            "relink=info,relink_edit=info,relink_io=warn"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut config = settings::load_settings(cli.config.as_deref())?;
    settings::apply_overrides(&mut config, &cli);

    let report = RelinkPipeline::new(config)
        .run(&cli.pipeline_options())
        .context("relink run failed")?;

    print!("{}", report::render(&report));
    Ok(())
}
