//! Resize image files on disk to the standard card raster.
//!
//! Each output is written to a temporary file next to its destination and
//! then renamed over it, so an interrupted run never leaves a half-written
//! image, even when originals are overwritten in place.

use std::collections::HashSet;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::ImageFormat;
use rayon::prelude::*;
use tempfile::NamedTempFile;

use super::{decode, encode_jpeg, flatten_onto_white, ImagingError, RasterSpec};
use crate::progress::ProgressCallback;

/// Outcome of [`standardize_batch`].
#[derive(Debug, Clone, Default)]
pub struct StandardizeResult {
    /// Files written, in input order
    pub written: Vec<PathBuf>,
    /// Inputs whose destination name was already taken by an earlier input
    pub skipped: Vec<PathBuf>,
    /// Inputs that could not be standardized, with the cause
    pub failures: Vec<(PathBuf, String)>,
}

impl StandardizeResult {
    /// True when every input was written.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Resize `src` to `spec` and write it to `dst`.
///
/// The output format follows the extension of `dst`. JPEG outputs are
/// flattened onto white first. `src` and `dst` may be the same path.
///
/// # Errors
///
/// Any [`ImagingError`] from decoding, encoding or writing.
pub fn standardize_file(src: &Path, dst: &Path, spec: &RasterSpec) -> Result<(), ImagingError> {
    let format =
        ImageFormat::from_path(dst).map_err(|_| ImagingError::UnsupportedFormat(dst.to_path_buf()))?;

    let resized = spec.fit(decode(src)?);

    let bytes = if format == ImageFormat::Jpeg {
        encode_jpeg(&flatten_onto_white(&resized), spec.jpeg_quality, dst)?
    } else {
        let mut buf = Cursor::new(Vec::new());
        resized
            .write_to(&mut buf, format)
            .map_err(|source| ImagingError::Encode {
                path: dst.to_path_buf(),
                source,
            })?;
        buf.into_inner()
    };

    write_atomic(dst, &bytes)?;
    log::debug!(
        "Standardized {} -> {} ({}x{})",
        src.display(),
        dst.display(),
        spec.width_px,
        spec.height_px
    );
    Ok(())
}

fn write_atomic(dst: &Path, bytes: &[u8]) -> Result<(), ImagingError> {
    let write_error = |source| ImagingError::Write {
        path: dst.to_path_buf(),
        source,
    };
    let dir = match dst.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_error)?;
    tmp.write_all(bytes).map_err(write_error)?;
    tmp.persist(dst).map_err(|e| write_error(e.error))?;
    Ok(())
}

/// Standardize many files, in parallel.
///
/// With `output_dir` set, each file is written there under its own name
/// (the directory is created if needed). When two inputs share a file
/// name, the first in `files` order is written and the rest are skipped.
/// With `None` the originals are overwritten. `written` keeps the order of
/// `files`.
#[must_use]
pub fn standardize_batch(
    files: &[PathBuf],
    output_dir: Option<&Path>,
    spec: &RasterSpec,
    io_threads: usize,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> StandardizeResult {
    let mut result = StandardizeResult::default();
    if files.is_empty() {
        return result;
    }

    if let Some(dir) = output_dir {
        if let Err(e) = fs::create_dir_all(dir) {
            log::error!("Cannot create output directory {}: {}", dir.display(), e);
            result.failures = files
                .iter()
                .map(|f| (f.clone(), format!("cannot create {}: {e}", dir.display())))
                .collect();
            return result;
        }
    }

    let mut taken = HashSet::new();
    let mut jobs = Vec::with_capacity(files.len());
    for src in files {
        let dst = match (output_dir, src.file_name()) {
            (Some(dir), Some(name)) => dir.join(name),
            _ => src.clone(),
        };
        if taken.insert(dst.clone()) {
            jobs.push((src, dst));
        } else {
            log::info!(
                "Skipping {}: {} is already written by an earlier file",
                src.display(),
                dst.display()
            );
            result.skipped.push(src.clone());
        }
    }

    if let Some(callback) = progress {
        callback.on_phase_start("resize", jobs.len());
    }

    let done = AtomicUsize::new(0);
    let process = |(src, dst): &(&PathBuf, PathBuf)| -> Result<PathBuf, ImagingError> {
        let outcome = standardize_file(src, dst, spec).map(|()| dst.clone());
        if let Some(callback) = progress {
            let current = done.fetch_add(1, Ordering::Relaxed) + 1;
            callback.on_progress(current, src.to_string_lossy().as_ref());
        }
        outcome
    };

    let outcomes: Vec<Result<PathBuf, ImagingError>> =
        match rayon::ThreadPoolBuilder::new().num_threads(io_threads.max(1)).build() {
            Ok(pool) => pool.install(|| jobs.par_iter().map(process).collect()),
            Err(e) => {
                log::warn!("Failed to create resize thread pool, resizing sequentially: {e}");
                jobs.iter().map(process).collect()
            }
        };

    if let Some(callback) = progress {
        callback.on_phase_end("resize");
    }

    for outcome in outcomes {
        match outcome {
            Ok(path) => result.written.push(path),
            Err(e) => {
                log::warn!("Failed to standardize {}: {}", e.path().display(), e);
                result.failures.push((e.path().to_path_buf(), e.to_string()));
            }
        }
    }
    result
}
