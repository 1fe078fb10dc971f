//! Directory walker implementation using jwalk.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a card folder
//! and collecting every supported image file. Children of each directory are
//! sorted by file name before they are visited, so two walks over the same
//! tree always produce the same sequence. Duplicate resolution depends on
//! that: the first file of an equivalence class in walk order is the one
//! that is kept.
//!
//! # Example
//!
//! ```no_run
//! use cardpress::scanner::{collect_images, WalkerConfig};
//! use std::path::Path;
//!
//! let outcome = collect_images(Path::new("./cards"), &WalkerConfig::default()).unwrap();
//! println!("{} images, {} unreadable entries", outcome.files.len(), outcome.errors.len());
//! ```

use std::path::{Path, PathBuf};

use jwalk::WalkDir;

use super::{is_supported_image, FileEntry, ScanError, WalkerConfig};

/// Directory walker for image discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Root directory of this walker.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the directory tree, yielding supported image files.
    ///
    /// Returns an iterator over [`FileEntry`] results. Errors are yielded
    /// as [`ScanError`] values rather than stopping iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let mut walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(|_depth, _path, _read_dir_state, children| {
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        if !self.config.recursive {
            walk_dir = walk_dir.max_depth(1);
        }

        walk_dir
            .into_iter()
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    if path == self.root {
                        return None;
                    }

                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        return None;
                    }

                    if file_type.is_symlink() && !self.config.follow_symlinks {
                        log::trace!("Skipping symlink: {}", path.display());
                        return None;
                    }

                    if !is_supported_image(&path) {
                        log::trace!("Skipping unsupported file: {}", path.display());
                        return None;
                    }

                    let metadata = if self.config.follow_symlinks {
                        std::fs::metadata(&path)
                    } else {
                        std::fs::symlink_metadata(&path)
                    };

                    match metadata {
                        Ok(m) if m.is_file() => Some(Ok(FileEntry::new(path, m.len()))),
                        Ok(_) => None,
                        Err(e) => Some(Err(self.handle_io_error(&path, e))),
                    }
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    log::warn!("Walker error for {}: {}", path.display(), e);
                    Some(Err(ScanError::Io {
                        path,
                        source: std::io::Error::other(e.to_string()),
                    }))
                }
            })
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path.to_path_buf())
            }
            ErrorKind::NotFound => {
                log::debug!("File not found (may have been deleted): {}", path.display());
                ScanError::NotFound(path.to_path_buf())
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                ScanError::Io {
                    path: path.to_path_buf(),
                    source: error,
                }
            }
        }
    }
}

/// Files found by [`collect_images`], in traversal order.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Supported image files, in walk order
    pub files: Vec<FileEntry>,
    /// Entries that could not be inspected
    pub errors: Vec<ScanError>,
}

impl ScanOutcome {
    /// Paths of all discovered files, in walk order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Walk `root` and collect every supported image.
///
/// # Errors
///
/// Returns [`ScanError::NotFound`] if `root` does not exist and
/// [`ScanError::NotADirectory`] if it is not a directory. Problems with
/// individual entries are collected in [`ScanOutcome::errors`] instead.
pub fn collect_images(root: &Path, config: &WalkerConfig) -> Result<ScanOutcome, ScanError> {
    if !root.exists() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let walker = Walker::new(root, config.clone());
    let mut outcome = ScanOutcome::default();
    for entry in walker.walk() {
        match entry {
            Ok(file) => outcome.files.push(file),
            Err(e) => outcome.errors.push(e),
        }
    }

    log::debug!(
        "Scanned {}: {} images, {} errors",
        root.display(),
        outcome.files.len(),
        outcome.errors.len()
    );
    Ok(outcome)
}
