//! Duplicate resolver orchestration.
//!
//! # Overview
//!
//! This module runs the read side of duplicate resolution:
//! 1. **Walk**: collect supported images under a root, in sorted walk order
//! 2. **Hash**: compute a BLAKE3 digest for every file (parallel, bounded)
//! 3. **Resolve**: feed the candidates, in walk order, to [`resolve`]
//!
//! Hashing runs on a rayon pool, but results are collected into a vector
//! indexed by the original position, so the registry always sees files in
//! traversal order. A file that cannot be read is reported and left out of
//! both the kept and removed lists.
//!
//! # Example
//!
//! ```no_run
//! use cardpress::duplicates::DuplicateResolver;
//! use std::path::Path;
//!
//! let resolver = DuplicateResolver::with_defaults();
//! let (resolution, summary) = resolver.scan(Path::new("./cards")).unwrap();
//! println!("{} duplicates among {} files", resolution.removed.len(), summary.total_files);
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::registry::{resolve, CandidateFile, Resolution, SeenRegistry};
use crate::progress::ProgressCallback;
use crate::scanner::{collect_images, HashError, Hasher, ScanError, WalkerConfig};

/// Configuration for the duplicate resolver.
#[derive(Clone)]
pub struct ResolverConfig {
    /// Walker configuration for discovering files.
    pub walker: WalkerConfig,
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for ResolverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverConfig")
            .field("walker", &self.walker)
            .field("io_threads", &self.io_threads)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            walker: WalkerConfig::default(),
            io_threads: 4,
            progress_callback: None,
        }
    }
}

impl ResolverConfig {
    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker(mut self, walker: WalkerConfig) -> Self {
        self.walker = walker;
        self
    }

    /// Set the number of hashing threads (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Candidates produced by [`build_candidates`], in input order.
#[derive(Debug, Default)]
pub struct CandidateBatch {
    /// Successfully hashed files, in the same relative order as the input
    pub candidates: Vec<CandidateFile>,
    /// Files that could not be read
    pub errors: Vec<HashError>,
}

/// Hash `paths` and turn them into candidates.
///
/// Work is spread over a pool of `io_threads` threads. The output keeps the
/// relative order of `paths`; unreadable files are moved to
/// [`CandidateBatch::errors`].
#[must_use]
pub fn build_candidates(
    paths: Vec<PathBuf>,
    hasher: &Hasher,
    io_threads: usize,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> CandidateBatch {
    if paths.is_empty() {
        return CandidateBatch::default();
    }

    if let Some(callback) = progress {
        callback.on_phase_start("hash", paths.len());
    }

    let done = std::sync::atomic::AtomicUsize::new(0);
    let hash_one = |path: PathBuf| -> Result<CandidateFile, HashError> {
        let result = hasher
            .full_hash(&path)
            .map(|digest| CandidateFile::new(path.clone(), digest));
        if let Some(callback) = progress {
            let current = done.fetch_add(1, std::sync::atomic::Ordering::Relaxed) + 1;
            callback.on_progress(current, path.to_string_lossy().as_ref());
        }
        result
    };

    // Indexed collect: results land at their original positions.
    let results: Vec<Result<CandidateFile, HashError>> =
        match rayon::ThreadPoolBuilder::new().num_threads(io_threads.max(1)).build() {
            Ok(pool) => pool.install(|| paths.into_par_iter().map(hash_one).collect()),
            Err(e) => {
                log::warn!("Failed to create hashing thread pool, hashing sequentially: {e}");
                paths.into_iter().map(hash_one).collect()
            }
        };

    if let Some(callback) = progress {
        callback.on_phase_end("hash");
    }

    let mut batch = CandidateBatch::default();
    for result in results {
        match result {
            Ok(candidate) => batch.candidates.push(candidate),
            Err(e) => {
                log::warn!("Failed to hash {}: {}", e.path().display(), e);
                batch.errors.push(e);
            }
        }
    }
    batch
}

/// Statistics from one resolver run.
#[derive(Debug, Default)]
pub struct ResolveSummary {
    /// Supported image files found by the walk
    pub total_files: usize,
    /// Files that were hashed successfully
    pub hashed_files: usize,
    /// Files that could not be read (excluded from the resolution)
    pub failed_files: usize,
    /// Files kept
    pub kept: usize,
    /// Files marked as duplicates
    pub removed: usize,
    /// Total bytes occupied by the duplicates
    pub reclaimable_bytes: u64,
    /// Walk errors and hashing errors, as messages with their paths
    pub errors: Vec<(PathBuf, String)>,
    /// Wall-clock duration of the scan
    pub duration: Duration,
}

/// Walks a folder, hashes its images and resolves duplicates.
#[derive(Debug, Default)]
pub struct DuplicateResolver {
    config: ResolverConfig,
    hasher: Hasher,
}

impl DuplicateResolver {
    /// Create a resolver with the given configuration.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            hasher: Hasher::new(),
        }
    }

    /// Create a resolver with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Access the configuration.
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Scan `root` and decide which files are duplicates.
    ///
    /// This is the decision phase only; nothing is deleted.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] if `root` is missing or not a directory.
    pub fn scan(&self, root: &Path) -> Result<(Resolution, ResolveSummary), ScanError> {
        let started = Instant::now();
        let outcome = collect_images(root, &self.config.walker)?;

        let mut summary = ResolveSummary {
            total_files: outcome.files.len(),
            ..Default::default()
        };
        summary.errors.extend(
            outcome
                .errors
                .iter()
                .map(|e| (e.path().to_path_buf(), e.to_string())),
        );

        let sizes: std::collections::HashMap<PathBuf, u64> = outcome
            .files
            .iter()
            .map(|f| (f.path.clone(), f.size))
            .collect();

        log::info!("Hashing {} images under {}", outcome.files.len(), root.display());
        let batch = build_candidates(
            outcome.paths(),
            &self.hasher,
            self.config.io_threads,
            self.config.progress_callback.as_ref(),
        );

        summary.hashed_files = batch.candidates.len();
        summary.failed_files = batch.errors.len();
        summary.errors.extend(
            batch
                .errors
                .iter()
                .map(|e| (e.path().to_path_buf(), e.to_string())),
        );

        let (resolution, registry) = resolve(&batch.candidates, SeenRegistry::new());
        summary.kept = resolution.kept.len();
        summary.removed = resolution.removed.len();
        summary.reclaimable_bytes = resolution
            .removed
            .iter()
            .filter_map(|d| sizes.get(&d.path))
            .sum();
        summary.duration = started.elapsed();

        log::info!(
            "Resolved {} files into {} classes: {} kept, {} duplicates, {} unreadable",
            summary.total_files,
            registry.len(),
            summary.kept,
            summary.removed,
            summary.failed_files
        );

        Ok((resolution, summary))
    }
}
