//! Copy step: gather every card image under a root into one flat folder.
//!
//! Files are copied in traversal order. When two sources share a file name
//! the first one wins and later ones are skipped, the same as a file that
//! already exists in the destination from an earlier run. Skips are counted,
//! not reported as errors.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::progress::ProgressCallback;
use crate::scanner::{self, ScanError, WalkerConfig};

/// Outcome of a collect run.
#[derive(Debug, Clone, Default)]
pub struct CollectResult {
    /// Destination paths written, in traversal order
    pub copied: Vec<PathBuf>,
    /// Sources whose name already existed in the destination
    pub skipped: Vec<PathBuf>,
    /// Sources that could not be copied, with the cause
    pub failures: Vec<(PathBuf, String)>,
    /// Bytes written to the destination
    pub bytes_copied: u64,
}

impl CollectResult {
    /// Number of files copied.
    #[must_use]
    pub fn copied_count(&self) -> usize {
        self.copied.len()
    }

    /// Number of files skipped because the name was taken.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Number of files that failed to copy.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Copy every supported image under `root` into `destination`.
///
/// `destination` is created if missing. Nested files land directly in it.
///
/// # Errors
///
/// Returns a [`ScanError`] if `root` is missing or not a directory, or if
/// `destination` cannot be created.
pub fn collect_images(
    root: &Path,
    destination: &Path,
    walker_config: &WalkerConfig,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> Result<CollectResult, ScanError> {
    let outcome = scanner::collect_images(root, walker_config)?;

    fs::create_dir_all(destination).map_err(|e| ScanError::Io {
        path: destination.to_path_buf(),
        source: e,
    })?;

    let mut result = CollectResult::default();
    for error in &outcome.errors {
        result
            .failures
            .push((error.path().to_path_buf(), error.to_string()));
    }

    if let Some(callback) = progress {
        callback.on_phase_start("collect", outcome.files.len());
    }

    for (index, entry) in outcome.files.iter().enumerate() {
        if let Some(callback) = progress {
            callback.on_progress(index + 1, entry.path.to_string_lossy().as_ref());
        }

        let Some(name) = entry.path.file_name() else {
            continue;
        };
        let target = destination.join(name);

        match copy_new(&entry.path, &target) {
            Ok(Some(bytes)) => {
                log::debug!("Copied {} -> {}", entry.path.display(), target.display());
                result.bytes_copied += bytes;
                result.copied.push(target);
            }
            Ok(None) => {
                log::debug!("Skipping {}: {} exists", entry.path.display(), target.display());
                result.skipped.push(entry.path.clone());
            }
            Err(e) => {
                log::warn!("Failed to copy {}: {}", entry.path.display(), e);
                result.failures.push((entry.path.clone(), e.to_string()));
            }
        }
    }

    if let Some(callback) = progress {
        callback.on_phase_end("collect");
    }

    log::info!(
        "Collected {} images into {} ({} skipped, {} failed)",
        result.copied_count(),
        destination.display(),
        result.skipped_count(),
        result.failure_count()
    );
    Ok(result)
}

/// Copy `source` to `target` unless `target` already exists.
///
/// Returns `Ok(None)` for the skip case.
fn copy_new(source: &Path, target: &Path) -> io::Result<Option<u64>> {
    if target.exists() {
        return Ok(None);
    }
    fs::copy(source, target).map(Some)
}
