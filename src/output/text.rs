//! Human-readable summaries, colored with yansi.
//!
//! Color is switched off globally with [`yansi::disable`] when `--no-color`
//! or `NO_COLOR` is set, so these functions never check for it themselves.

use std::fmt::Write as _;
use std::path::Path;

use bytesize::ByteSize;
use yansi::Paint;

use crate::actions::collect::CollectResult;
use crate::actions::delete::BatchDeleteResult;
use crate::duplicates::{Resolution, ResolveSummary};
use crate::imaging::StandardizeResult;
use crate::pipeline::{RunSummary, StageCounts};

/// Summary of a dedupe run.
#[must_use]
pub fn dedupe_report(
    resolution: &Resolution,
    scan: &ResolveSummary,
    deleted: &BatchDeleteResult,
    dry_run: bool,
) -> String {
    let mut out = String::new();

    for duplicate in &resolution.removed {
        let verb = if dry_run { "would remove" } else { "remove" };
        let _ = writeln!(
            out,
            "{} {} {}",
            verb.yellow(),
            duplicate.path.display(),
            format!("(same as {})", duplicate.original.display()).dim()
        );
    }
    if !resolution.removed.is_empty() {
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "{} {} images, {} kept, {} duplicates ({})",
        "Scanned".bold(),
        scan.total_files,
        scan.kept.green(),
        scan.removed.yellow(),
        ByteSize::b(scan.reclaimable_bytes)
    );
    if dry_run {
        let _ = writeln!(out, "{}", "Dry run: nothing was deleted".cyan());
    } else if !resolution.is_clean() {
        let _ = writeln!(out, "{}", deleted.summary());
    }
    write_failures(&mut out, scan.errors.iter().chain(deleted.failures.iter()));
    out
}

/// Summary of a collect run.
#[must_use]
pub fn collect_report(result: &CollectResult, destination: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} images into {} ({} skipped, {})",
        "Collected".bold(),
        result.copied_count().green(),
        destination.display(),
        result.skipped_count(),
        ByteSize::b(result.bytes_copied)
    );
    write_failures(&mut out, result.failures.iter());
    out
}

/// Summary of a resize run.
#[must_use]
pub fn resize_report(result: &StandardizeResult, width_px: u32, height_px: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} images to {}x{} px",
        "Resized".bold(),
        result.written.len().green(),
        width_px,
        height_px
    );
    if !result.skipped.is_empty() {
        let _ = writeln!(
            out,
            "  skipped {} with a name already written",
            result.skipped.len().yellow()
        );
    }
    write_failures(&mut out, result.failures.iter());
    out
}

/// Summary of a pipeline (or pdf) run.
#[must_use]
pub fn run_report(summary: &RunSummary) -> String {
    let mut out = String::new();

    if let Some(counts) = summary.collect {
        write_stage(&mut out, "collect", counts);
    }
    if let Some(counts) = summary.dedupe {
        write_stage(&mut out, "dedupe", counts);
        if summary.bytes_freed > 0 {
            let _ = writeln!(out, "  freed {}", ByteSize::b(summary.bytes_freed));
        }
    }
    if let Some(counts) = summary.resize {
        write_stage(&mut out, "resize", counts);
    }
    write_stage(&mut out, "decode", summary.decode);

    let _ = writeln!(
        out,
        "{} {} ({} pages, {} ms)",
        "Wrote".green().bold(),
        summary.output.display(),
        summary.pages,
        summary.duration_ms
    );

    if summary.has_failures() {
        let _ = writeln!(
            out,
            "{} {} files had problems:",
            "Warning:".yellow().bold(),
            summary.failures.len()
        );
        for failure in &summary.failures {
            let _ = writeln!(
                out,
                "  [{}] {}: {}",
                failure.stage,
                failure.path.display(),
                failure.message.red()
            );
        }
    }
    out
}

fn write_stage(out: &mut String, name: &str, counts: StageCounts) {
    let _ = writeln!(
        out,
        "{:<8} {} processed, {} skipped, {} failed",
        name.bold(),
        counts.processed,
        counts.skipped,
        if counts.failed > 0 {
            counts.failed.red().to_string()
        } else {
            counts.failed.to_string()
        }
    );
}

fn write_failures<'a>(
    out: &mut String,
    failures: impl Iterator<Item = &'a (std::path::PathBuf, String)>,
) {
    for (path, message) in failures {
        let _ = writeln!(out, "{} {}: {}", "error".red(), path.display(), message);
    }
}
