//! Structured error handling and exit codes.

use serde::Serialize;

use crate::pipeline::PipelineError;

/// Exit codes for the cardpress application.
///
/// - 0: Success (everything processed)
/// - 1: General error (fatal failure, nothing written)
/// - 2: No images found in the input folder
/// - 3: Partial success (finished, but some files were skipped with errors)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the command completed without per-file errors.
    Success = 0,
    /// General error: a fatal error stopped the command.
    GeneralError = 1,
    /// No images: the input folder holds no supported images.
    NoImages = 2,
    /// Partial success: completed, but some files failed.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "CP000",
            Self::GeneralError => "CP001",
            Self::NoImages => "CP002",
            Self::PartialSuccess => "CP003",
        }
    }

    /// Exit code for a fatal error returned by [`crate::run_app`].
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::NoImages(_)) => Self::NoImages,
            _ => Self::GeneralError,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "CP001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
