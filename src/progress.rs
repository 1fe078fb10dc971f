//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`Progress`] struct which implements [`ProgressCallback`]
//! to display progress bars in the terminal while the pipeline runs.
//!
//! Phases reported by the library:
//! - `"hash"`: content digests for duplicate resolution
//! - `"delete"`: removing duplicates
//! - `"collect"`: copying images into the working folder
//! - `"resize"`: standardizing image dimensions on disk
//! - `"decode"`: preparing card rasters for the document
//! - `"render"`: placing cards on pages

use std::sync::Mutex;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress callback for pipeline phases.
///
/// Implement this trait to receive progress updates while files are
/// hashed, copied, resized or rendered.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (e.g., "hash", "render")
    /// * `total` - Total number of items to process
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Number of items finished so far (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
///
/// Only one phase runs at a time, so a single active bar is tracked.
pub struct Progress {
    multi: MultiProgress,
    active: Mutex<Option<(String, ProgressBar)>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardpress::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            active: Mutex::new(None),
            quiet,
        }
    }

    /// Whether progress output is suppressed.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn with_active<F: FnOnce(&ProgressBar)>(&self, f: F) {
        if let Ok(guard) = self.active.lock() {
            if let Some((_, ref pb)) = *guard {
                f(pb);
            }
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let pb = self.multi.add(ProgressBar::new(total as u64));
        pb.set_style(Self::bar_style());
        pb.set_message(phase_label(phase).to_string());

        if let Ok(mut guard) = self.active.lock() {
            if let Some((_, previous)) = guard.take() {
                previous.finish_and_clear();
            }
            *guard = Some((phase.to_string(), pb));
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }

        self.with_active(|pb| {
            pb.set_position(current as u64);
            pb.set_message(truncate_path(path, 30));
        });
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        if let Ok(mut guard) = self.active.lock() {
            if guard.as_ref().is_some_and(|(name, _)| name == phase) {
                if let Some((_, pb)) = guard.take() {
                    pb.finish_with_message(format!("{} complete", phase_label(phase)));
                }
            }
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }

        self.with_active(|pb| pb.set_message(message.to_string()));
    }
}

/// Human label for a phase name.
fn phase_label(phase: &str) -> &str {
    match phase {
        "hash" => "Hashing",
        "delete" => "Removing duplicates",
        "collect" => "Copying images",
        "resize" => "Resizing images",
        "decode" => "Preparing cards",
        "render" => "Rendering pages",
        other => other,
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.len() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if file_name.chars().count() >= max_len {
        let tail: String = file_name
            .chars()
            .rev()
            .take(max_len - 3)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
