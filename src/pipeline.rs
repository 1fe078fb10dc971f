//! End-to-end batch: folder of card scans in, print-ready PDF out.
//!
//! # Stages
//!
//! 1. **Collect** (optional): copy every image into a flat output root.
//!    Without an output root the remaining stages work on the originals.
//! 2. **Dedupe** (skippable): resolve duplicates, then delete them.
//! 3. **Standardize** (skippable): resize the survivors in place.
//! 4. **Prepare**: decode every survivor into a JPEG card.
//! 5. **Compose**: plan the pages and write the PDF.
//!
//! Per-file problems are recorded in the [`RunSummary`] and never stop the
//! run. A missing input root, a folder without images, a run where no image
//! could be decoded and an unwritable output are fatal.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::actions::collect::collect_images;
use crate::actions::delete::{apply_resolution, DeleteConfig};
use crate::duplicates::{DuplicateResolver, ResolverConfig};
use crate::imaging::{prepare_cards, standardize_batch, RasterSpec};
use crate::layout::{LayoutError, LayoutSettings};
use crate::progress::ProgressCallback;
use crate::render::{ensure_pdf_extension, Compositor, PdfRenderer, RenderError};
use crate::scanner::{self, ScanError, WalkerConfig};

/// Fatal pipeline errors. Anything per-file ends up in [`RunSummary`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input root does not exist or is not a directory.
    #[error("Input folder not found: {0}")]
    InputMissing(PathBuf),

    /// No supported images were found.
    #[error("No supported images found in {0}")]
    NoImages(PathBuf),

    /// Scanning the input failed.
    #[error(transparent)]
    Scan(ScanError),

    /// Planning failed, including when every image failed to decode.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Rendering or writing the document failed.
    #[error(transparent)]
    Render(RenderError),
}

impl From<ScanError> for PipelineError {
    fn from(e: ScanError) -> Self {
        match e {
            ScanError::NotFound(path) | ScanError::NotADirectory(path) => Self::InputMissing(path),
            other => Self::Scan(other),
        }
    }
}

impl From<RenderError> for PipelineError {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::Layout(layout) => Self::Layout(layout),
            other => Self::Render(other),
        }
    }
}

/// Settings for one run.
#[derive(Clone)]
pub struct PipelineOptions {
    /// How the input root is walked
    pub walker: WalkerConfig,
    /// Flat working folder; `None` works on the originals in place
    pub output_root: Option<PathBuf>,
    /// Skip duplicate resolution
    pub skip_dedupe: bool,
    /// How duplicates are deleted
    pub delete: DeleteConfig,
    /// Skip resizing files on disk
    pub skip_resize: bool,
    /// Target raster for resizing and card preparation
    pub raster: RasterSpec,
    /// Page layout
    pub layout: LayoutSettings,
    /// Threads for hashing and decoding
    pub io_threads: usize,
    /// Progress reporting
    pub progress: Option<Arc<dyn ProgressCallback>>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            walker: WalkerConfig::default(),
            output_root: None,
            skip_dedupe: false,
            delete: DeleteConfig::default(),
            skip_resize: false,
            raster: RasterSpec::default(),
            layout: LayoutSettings::default(),
            io_threads: 4,
            progress: None,
        }
    }
}

impl std::fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("walker", &self.walker)
            .field("output_root", &self.output_root)
            .field("skip_dedupe", &self.skip_dedupe)
            .field("delete", &self.delete)
            .field("skip_resize", &self.skip_resize)
            .field("raster", &self.raster)
            .field("layout", &self.layout)
            .field("io_threads", &self.io_threads)
            .finish_non_exhaustive()
    }
}

/// Counts for one stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// A per-file problem, tagged with the stage that hit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub stage: &'static str,
    pub path: PathBuf,
    pub message: String,
}

/// What a run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Folder the later stages worked in
    pub work_dir: PathBuf,
    /// Document written
    pub output: PathBuf,
    /// Copy step; `None` without an output root
    pub collect: Option<StageCounts>,
    /// Duplicate removal: processed = deleted, skipped = kept
    pub dedupe: Option<StageCounts>,
    /// Bytes reclaimed by deleting duplicates
    pub bytes_freed: u64,
    /// On-disk resizing; `None` when skipped
    pub resize: Option<StageCounts>,
    /// Card preparation
    pub decode: StageCounts,
    /// Pages in the document
    pub pages: usize,
    /// Every per-file problem, in stage order
    pub failures: Vec<FileFailure>,
    /// Wall-clock time in milliseconds
    pub duration_ms: u64,
}

impl RunSummary {
    /// True when some file was skipped because of an error.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    fn record(&mut self, stage: &'static str, failures: impl IntoIterator<Item = (PathBuf, String)>) {
        self.failures.extend(
            failures
                .into_iter()
                .map(|(path, message)| FileFailure {
                    stage,
                    path,
                    message,
                }),
        );
    }
}

/// Runs the whole batch.
#[derive(Debug, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a pipeline; `io_threads` of zero is raised to one.
    #[must_use]
    pub fn new(mut options: PipelineOptions) -> Self {
        options.io_threads = options.io_threads.max(1);
        Self { options }
    }

    /// Access the options.
    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Process `root` into the PDF at `output_pdf`.
    ///
    /// `.pdf` is appended to `output_pdf` when missing.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] for the fatal cases listed in the module
    /// documentation.
    pub fn run(&self, root: &Path, output_pdf: &Path) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();
        let opts = &self.options;
        let progress = opts.progress.as_ref();

        if !root.is_dir() {
            return Err(PipelineError::InputMissing(root.to_path_buf()));
        }

        let mut summary = RunSummary {
            output: ensure_pdf_extension(output_pdf),
            ..RunSummary::default()
        };

        let (work_dir, walker) = match &opts.output_root {
            Some(out) => {
                let collected = collect_images(root, out, &opts.walker, progress)?;
                summary.collect = Some(StageCounts {
                    processed: collected.copied_count(),
                    skipped: collected.skipped_count(),
                    failed: collected.failure_count(),
                });
                summary.record("collect", collected.failures);
                let flat = WalkerConfig {
                    recursive: false,
                    ..opts.walker.clone()
                };
                (out.clone(), flat)
            }
            None => (root.to_path_buf(), opts.walker.clone()),
        };
        summary.work_dir = work_dir.clone();

        let images = if opts.skip_dedupe {
            let outcome = scanner::collect_images(&work_dir, &walker)?;
            summary.record(
                "scan",
                outcome
                    .errors
                    .iter()
                    .map(|e| (e.path().to_path_buf(), e.to_string())),
            );
            outcome.paths()
        } else {
            let mut config = ResolverConfig::default()
                .with_walker(walker)
                .with_io_threads(opts.io_threads);
            config.progress_callback = opts.progress.clone();
            let (resolution, scan) = DuplicateResolver::new(config).scan(&work_dir)?;
            summary.record("dedupe", scan.errors);

            let deleted = apply_resolution(&resolution, &opts.delete, progress);
            summary.dedupe = Some(StageCounts {
                processed: deleted.success_count(),
                skipped: resolution.kept.len(),
                failed: scan.failed_files + deleted.failure_count(),
            });
            summary.bytes_freed = deleted.bytes_freed;
            summary.record("delete", deleted.failures);
            resolution.kept
        };

        if images.is_empty() {
            return Err(PipelineError::NoImages(work_dir));
        }
        log::info!("{} card images to process", images.len());

        let images = if opts.skip_resize {
            images
        } else {
            let resized = standardize_batch(&images, None, &opts.raster, opts.io_threads, progress);
            summary.resize = Some(StageCounts {
                processed: resized.written.len(),
                skipped: resized.skipped.len(),
                failed: resized.failures.len(),
            });
            summary.record("resize", resized.failures);
            resized.written
        };

        let prepared = prepare_cards(
            &images,
            &opts.raster,
            opts.layout.card,
            opts.io_threads,
            progress,
        );
        summary.decode = StageCounts {
            processed: prepared.cards.len(),
            skipped: 0,
            failed: prepared.failures.len(),
        };
        summary.record("decode", prepared.failures);

        let mut compositor = Compositor::new(opts.layout);
        if let Some(callback) = &opts.progress {
            compositor = compositor.with_progress(Arc::clone(callback));
        }
        let plan = compositor.compose(&prepared.cards, &mut PdfRenderer::new(), &summary.output)?;
        summary.pages = plan.page_count;

        summary.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        log::info!(
            "Wrote {} ({} cards on {} pages, {} problems)",
            summary.output.display(),
            prepared.cards.len(),
            summary.pages,
            summary.failures.len()
        );
        Ok(summary)
    }
}
