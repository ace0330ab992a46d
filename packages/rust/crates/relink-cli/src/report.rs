//! Human-readable run summary printed to stdout.

use std::fmt::Write as _;

use relink_edit::RunReport;

pub(crate) fn render(report: &RunReport) -> String {
    let mut out = String::new();
    for timing in &report.timings {
        let _ = writeln!(
            out,
            "{:<15}: {:>10.3} s",
            timing.name,
            timing.elapsed.as_secs_f64()
        );
    }
    let _ = writeln!(out, "{:<15}: {:>10.3} s", "total", report.total().as_secs_f64());
    let _ = writeln!(
        out,
        "{} COMMON blocks privatized, {} symbols renamed ({} replacements in {} files)",
        report.blocks.len(),
        report.symbols,
        report.renamed.replacements,
        report.renamed.files_changed
    );
    if let Some(glue) = &report.glue_file {
        let _ = writeln!(out, "glue source: {}", glue.display());
    }
    out
}
