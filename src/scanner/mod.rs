//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Directory walking using jwalk, in a stable sorted order
//! - Filtering by supported card image extensions
//! - Content hashing with BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and image discovery
//! - [`hasher`]: BLAKE3 file hashing (streaming)
//!
//! # Example
//!
//! ```no_run
//! use cardpress::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     recursive: false,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("./cards"), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::path::{Path, PathBuf};

pub use hasher::{hash_to_hex, Hash, Hasher, CHUNK_SIZE};
pub use walker::{collect_images, ScanOutcome, Walker};

/// Image extensions accepted by every stage of the pipeline (lowercase).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tiff"];

/// Check whether a path carries one of the [`SUPPORTED_EXTENSIONS`].
///
/// The comparison is case-insensitive, so `CARD.PNG` is accepted.
///
/// ```
/// use cardpress::scanner::is_supported_image;
/// use std::path::Path;
///
/// assert!(is_supported_image(Path::new("bolt.JPG")));
/// assert!(!is_supported_image(Path::new("notes.txt")));
/// assert!(!is_supported_image(Path::new("README")));
/// ```
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Metadata for a discovered image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path to the file (root joined with the relative location)
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Descend into subdirectories. When false only the root's direct
    /// children are considered.
    pub recursive: bool,

    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_symlinks: false,
            skip_hidden: false,
        }
    }
}

impl WalkerConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(recursive: bool, follow_symlinks: bool, skip_hidden: bool) -> Self {
        Self {
            recursive,
            follow_symlinks,
            skip_hidden,
        }
    }

    /// Non-recursive configuration (root directory only).
    #[must_use]
    pub fn flat() -> Self {
        Self {
            recursive: false,
            ..Self::default()
        }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) | Self::NotADirectory(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Build a hash error from an I/O error, classifying the common kinds.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path of the file that could not be hashed.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}
