//! JSON reports for scripting.
//!
//! # Dedupe schema
//!
//! ```json
//! {
//!   "kept": ["/cards/bolt_1.png"],
//!   "duplicates": [
//!     { "path": "/cards/bolt_2.png", "original": "/cards/bolt_1.png" }
//!   ],
//!   "errors": [],
//!   "summary": {
//!     "total_files": 2,
//!     "removed": 1,
//!     "deleted": 1,
//!     "dry_run": false,
//!     "exit_code": 0,
//!     "exit_code_name": "CP000"
//!   }
//! }
//! ```
//!
//! The run report is the [`RunSummary`] with the exit code added.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::actions::delete::BatchDeleteResult;
use crate::duplicates::{Resolution, ResolveSummary};
use crate::error::ExitCode;
use crate::pipeline::RunSummary;

/// One duplicate and the file it duplicates.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicate {
    pub path: String,
    pub original: String,
}

/// A file that could not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFailure {
    pub path: String,
    pub message: String,
}

/// Dedupe statistics.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDedupeSummary {
    /// Supported images found
    pub total_files: usize,
    /// Images that could not be read
    pub failed_files: usize,
    /// Images kept
    pub kept: usize,
    /// Images marked as duplicates
    pub removed: usize,
    /// Duplicates actually deleted
    pub deleted: usize,
    /// Duplicates whose deletion failed
    pub delete_failures: usize,
    /// Bytes held by the duplicates
    pub reclaimable_bytes: u64,
    /// Bytes freed by deleting
    pub bytes_freed: u64,
    /// Whether deletion was skipped
    pub dry_run: bool,
    /// Scan duration in milliseconds
    pub duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "CP000")
    pub exit_code_name: String,
}

/// Complete dedupe report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDedupeReport {
    pub kept: Vec<String>,
    pub duplicates: Vec<JsonDuplicate>,
    pub errors: Vec<JsonFailure>,
    pub summary: JsonDedupeSummary,
}

impl JsonDedupeReport {
    /// Build the report for one dedupe run.
    #[must_use]
    pub fn new(
        resolution: &Resolution,
        scan: &ResolveSummary,
        deleted: &BatchDeleteResult,
        dry_run: bool,
        exit_code: ExitCode,
    ) -> Self {
        let mut errors: Vec<JsonFailure> = scan
            .errors
            .iter()
            .map(|(path, message)| JsonFailure {
                path: display(path),
                message: message.clone(),
            })
            .collect();
        errors.extend(deleted.failures.iter().map(|(path, message)| JsonFailure {
            path: display(path),
            message: message.clone(),
        }));

        Self {
            kept: resolution.kept.iter().map(|p| display(p)).collect(),
            duplicates: resolution
                .removed
                .iter()
                .map(|d| JsonDuplicate {
                    path: display(&d.path),
                    original: display(&d.original),
                })
                .collect(),
            errors,
            summary: JsonDedupeSummary {
                total_files: scan.total_files,
                failed_files: scan.failed_files,
                kept: scan.kept,
                removed: scan.removed,
                deleted: deleted.success_count(),
                delete_failures: deleted.failure_count(),
                reclaimable_bytes: scan.reclaimable_bytes,
                bytes_freed: deleted.bytes_freed,
                dry_run,
                duration_ms: u64::try_from(scan.duration.as_millis()).unwrap_or(u64::MAX),
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }
}

/// Run report: the pipeline summary plus the exit code.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRunReport<'a> {
    #[serde(flatten)]
    pub run: &'a RunSummary,
    pub exit_code: i32,
    pub exit_code_name: String,
}

impl<'a> JsonRunReport<'a> {
    /// Wrap a run summary.
    #[must_use]
    pub fn new(run: &'a RunSummary, exit_code: ExitCode) -> Self {
        Self {
            run,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Serialize `report` and write it, followed by a newline.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<T: Serialize, W: Write>(
    report: &T,
    writer: &mut W,
    pretty: bool,
) -> Result<(), JsonOutputError> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
