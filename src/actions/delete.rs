//! Apply phase of duplicate resolution: removing the duplicates.
//!
//! # Overview
//!
//! [`crate::duplicates::resolve`] only decides; this module acts on the
//! decision:
//! - Move to system trash (default, recoverable)
//! - Permanent deletion (with explicit flag)
//! - Dry run (report only, nothing is touched)
//!
//! # Safety
//!
//! Every duplicate is deleted at most once, and only after confirming that
//! the kept original it duplicates still exists. Kept files are never
//! touched. A failure on one file is recorded and the batch continues.
//!
//! # Example
//!
//! ```no_run
//! use cardpress::actions::delete::{apply_resolution, DeleteConfig};
//! use cardpress::duplicates::DuplicateResolver;
//! use std::path::Path;
//!
//! let (resolution, _) = DuplicateResolver::with_defaults()
//!     .scan(Path::new("./cards"))
//!     .unwrap();
//! let result = apply_resolution(&resolution, &DeleteConfig::trash(), None);
//! println!("{}", result.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytesize::ByteSize;
use thiserror::Error;

use crate::duplicates::{Duplicate, Resolution};
use crate::progress::ProgressCallback;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The kept copy disappeared, so the duplicate is left in place.
    #[error("kept original {original} is missing, not deleting {path}")]
    OriginalMissing { path: PathBuf, original: PathBuf },

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {message}")]
    PermanentDeleteFailed { path: PathBuf, message: String },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::OriginalMissing { path: p, .. }
            | Self::TrashFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }

    fn from_metadata_error(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Result of a successful deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, permanent: bool) -> Self {
        Self {
            path,
            size,
            permanent,
        }
    }
}

/// Results of applying a resolution.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files (empty in dry-run mode).
    pub successes: Vec<DeleteResult>,
    /// Files that would have been deleted in dry-run mode.
    pub planned: Vec<PathBuf>,
    /// Failed deletions with their error messages.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        if !self.planned.is_empty() {
            return format!("Dry run: {} duplicate(s) would be deleted", self.planned.len());
        }
        if self.all_succeeded() {
            format!(
                "Deleted {} duplicate(s), freed {}",
                self.success_count(),
                ByteSize::b(self.bytes_freed)
            )
        } else {
            format!(
                "Deleted {} duplicate(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                ByteSize::b(self.bytes_freed)
            )
        }
    }
}

/// Configuration for the apply phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Use permanent deletion instead of trash.
    pub permanent: bool,
    /// Report what would be deleted without touching anything.
    pub dry_run: bool,
}

impl DeleteConfig {
    /// Create config for trash deletion.
    #[must_use]
    pub fn trash() -> Self {
        Self::default()
    }

    /// Create config for permanent deletion.
    #[must_use]
    pub fn permanent() -> Self {
        Self {
            permanent: true,
            ..Self::default()
        }
    }

    /// Create config for a dry run.
    #[must_use]
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }
}

/// Delete a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file can't be inspected
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_metadata_error(path, e))?
        .len();

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);
    Ok(DeleteResult::new(path.to_path_buf(), size, false))
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file can't be inspected
/// - `PermanentDeleteFailed` if the delete operation fails
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_metadata_error(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        DeleteError::PermanentDeleteFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);
    Ok(DeleteResult::new(path.to_path_buf(), size, true))
}

/// Delete one duplicate after checking that its original is still there.
///
/// # Errors
///
/// Returns [`DeleteError::OriginalMissing`] if the kept copy no longer
/// exists, otherwise any error from the underlying delete.
pub fn delete_duplicate(
    duplicate: &Duplicate,
    config: &DeleteConfig,
) -> Result<DeleteResult, DeleteError> {
    if !duplicate.original.is_file() {
        return Err(DeleteError::OriginalMissing {
            path: duplicate.path.clone(),
            original: duplicate.original.clone(),
        });
    }

    if config.permanent {
        permanent_delete(&duplicate.path)
    } else {
        delete_to_trash(&duplicate.path)
    }
}

/// Apply a resolution: delete every file it marks as a duplicate.
///
/// Each duplicate is processed exactly once, in traversal order. Failures
/// are collected and never stop the batch.
#[must_use]
pub fn apply_resolution(
    resolution: &Resolution,
    config: &DeleteConfig,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();

    if config.dry_run {
        for duplicate in &resolution.removed {
            log::info!(
                "Would delete {} (duplicate of {})",
                duplicate.path.display(),
                duplicate.original.display()
            );
            result.planned.push(duplicate.path.clone());
        }
        return result;
    }

    if resolution.removed.is_empty() {
        return result;
    }

    if let Some(callback) = progress {
        callback.on_phase_start("delete", resolution.removed.len());
    }

    for (index, duplicate) in resolution.removed.iter().enumerate() {
        if let Some(callback) = progress {
            callback.on_progress(index + 1, duplicate.path.to_string_lossy().as_ref());
        }

        match delete_duplicate(duplicate, config) {
            Ok(deleted) => {
                result.bytes_freed += deleted.size;
                result.successes.push(deleted);
            }
            Err(e) => {
                log::warn!("Failed to delete {}: {}", duplicate.path.display(), e);
                result.failures.push((duplicate.path.clone(), e.to_string()));
            }
        }
    }

    if let Some(callback) = progress {
        callback.on_phase_end("delete");
    }

    log::info!("{}", result.summary());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_temp_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).expect("Failed to write content");
        path
    }

    fn duplicate(path: &Path, original: &Path) -> Duplicate {
        Duplicate {
            path: path.to_path_buf(),
            original: original.to_path_buf(),
        }
    }

    #[test]
    fn test_delete_error_path_and_display() {
        let path = PathBuf::from("/cards/bolt_2.png");

        let err = DeleteError::NotFound(path.clone());
        assert_eq!(err.path(), path.as_path());
        assert!(err.to_string().contains("not found"));

        let err = DeleteError::OriginalMissing {
            path: path.clone(),
            original: PathBuf::from("/cards/bolt_1.png"),
        };
        assert_eq!(err.path(), path.as_path());
        assert!(err.to_string().contains("bolt_1.png"));
    }

    #[test]
    fn test_delete_config_variants() {
        assert!(!DeleteConfig::default().permanent);
        assert!(!DeleteConfig::trash().permanent);
        assert!(DeleteConfig::permanent().permanent);
        assert!(DeleteConfig::dry_run().dry_run);
    }

    #[test]
    fn test_permanent_delete_success() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = create_temp_file(&dir, "delete_me.png", b"test content");

        let result = permanent_delete(&path).expect("Failed to delete");

        assert!(!path.exists());
        assert_eq!(result.size, 12);
        assert!(result.permanent);
    }

    #[test]
    fn test_permanent_delete_not_found() {
        let result = permanent_delete(Path::new("/nonexistent/file.png"));
        assert!(matches!(result, Err(DeleteError::NotFound(_))));
    }

    #[test]
    fn test_delete_to_trash_not_found() {
        let result = delete_to_trash(Path::new("/nonexistent/file.png"));
        assert!(matches!(result, Err(DeleteError::NotFound(_))));
    }

    #[test]
    fn test_apply_deletes_only_duplicates() {
        let dir = TempDir::new().unwrap();
        let original = create_temp_file(&dir, "bolt_1.png", b"same");
        let copy = create_temp_file(&dir, "bolt_2.png", b"same");

        let resolution = Resolution {
            kept: vec![original.clone()],
            removed: vec![duplicate(&copy, &original)],
        };

        let result = apply_resolution(&resolution, &DeleteConfig::permanent(), None);

        assert_eq!(result.success_count(), 1);
        assert_eq!(result.bytes_freed, 4);
        assert!(original.exists());
        assert!(!copy.exists());
    }

    #[test]
    fn test_apply_skips_when_original_missing() {
        let dir = TempDir::new().unwrap();
        let copy = create_temp_file(&dir, "bolt_2.png", b"same");
        let original = dir.path().join("bolt_1.png");

        let resolution = Resolution {
            kept: vec![original.clone()],
            removed: vec![duplicate(&copy, &original)],
        };

        let result = apply_resolution(&resolution, &DeleteConfig::permanent(), None);

        assert_eq!(result.failure_count(), 1);
        assert!(copy.exists());
    }

    #[test]
    fn test_apply_continues_after_failure() {
        let dir = TempDir::new().unwrap();
        let original = create_temp_file(&dir, "bolt_1.png", b"same");
        let gone = dir.path().join("bolt_2.png");
        let copy = create_temp_file(&dir, "bolt_3.png", b"same");

        let resolution = Resolution {
            kept: vec![original.clone()],
            removed: vec![duplicate(&gone, &original), duplicate(&copy, &original)],
        };

        let result = apply_resolution(&resolution, &DeleteConfig::permanent(), None);

        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.success_count(), 1);
        assert!(!copy.exists());
        assert!(result.summary().contains("1 failed"));
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let original = create_temp_file(&dir, "bolt_1.png", b"same");
        let copy = create_temp_file(&dir, "bolt_2.png", b"same");

        let resolution = Resolution {
            kept: vec![original.clone()],
            removed: vec![duplicate(&copy, &original)],
        };

        let result = apply_resolution(&resolution, &DeleteConfig::dry_run(), None);

        assert_eq!(result.planned, vec![copy.clone()]);
        assert_eq!(result.success_count(), 0);
        assert!(copy.exists());
        assert!(result.summary().starts_with("Dry run"));
    }

    #[test]
    fn test_apply_empty_resolution() {
        let result = apply_resolution(&Resolution::default(), &DeleteConfig::permanent(), None);
        assert!(result.all_succeeded());
        assert_eq!(result.success_count(), 0);
        assert!(result.summary().contains("Deleted 0"));
    }
}
