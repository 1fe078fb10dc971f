//! First-seen-wins duplicate resolution.
//!
//! # Overview
//!
//! The decision phase is a pure function over an *ordered* sequence of
//! [`CandidateFile`]s. The first candidate of each [`EquivalenceKey`] is
//! kept; every later candidate with the same key is marked as a duplicate
//! of it. Nothing here touches the file system, so resolutions can be
//! computed and inspected (dry run) before the apply phase in
//! [`crate::actions::delete`] removes anything.
//!
//! The [`SeenRegistry`] is owned by the caller and threaded through
//! [`resolve`], which makes it possible to resolve a scan in several
//! batches while keeping the first-seen rule across all of them.
//!
//! # Example
//!
//! ```
//! use cardpress::duplicates::{resolve, CandidateFile, SeenRegistry};
//! use std::path::PathBuf;
//!
//! let candidates = vec![
//!     CandidateFile::new(PathBuf::from("bolt_1.png"), [1; 32]),
//!     CandidateFile::new(PathBuf::from("bolt_2.png"), [1; 32]),
//!     CandidateFile::new(PathBuf::from("bolt_3.png"), [2; 32]),
//! ];
//!
//! let (resolution, registry) = resolve(&candidates, SeenRegistry::new());
//! assert_eq!(resolution.kept.len(), 2);
//! assert_eq!(resolution.removed[0].path, PathBuf::from("bolt_2.png"));
//! assert_eq!(resolution.removed[0].original, PathBuf::from("bolt_1.png"));
//! assert_eq!(registry.len(), 2);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::key::{normalized_key, EquivalenceKey};
use crate::scanner::Hash;

/// One file under consideration for deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Location of the file, unique within a scan
    pub path: PathBuf,
    /// Alphabetic-only file stem
    pub normalized_key: String,
    /// BLAKE3 digest of the full content
    pub content_digest: Hash,
}

impl CandidateFile {
    /// Build a candidate, deriving the normalized key from `path`.
    #[must_use]
    pub fn new(path: PathBuf, content_digest: Hash) -> Self {
        let normalized_key = normalized_key(&path);
        Self {
            path,
            normalized_key,
            content_digest,
        }
    }

    /// The equivalence class this file belongs to.
    #[must_use]
    pub fn key(&self) -> EquivalenceKey {
        EquivalenceKey::new(self.normalized_key.clone(), self.content_digest)
    }
}

/// Map from equivalence class to the first file that produced it.
///
/// Grows monotonically during resolution; insertion order is traversal order.
#[derive(Debug, Clone, Default)]
pub struct SeenRegistry {
    first_seen: HashMap<EquivalenceKey, PathBuf>,
}

impl SeenRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The file that first produced `key`, if any.
    #[must_use]
    pub fn original_for(&self, key: &EquivalenceKey) -> Option<&Path> {
        self.first_seen.get(key).map(PathBuf::as_path)
    }

    /// Number of distinct equivalence classes seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    /// True if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }

    /// Register `candidate` unless its class is already known.
    ///
    /// Returns the path of the earlier file when `candidate` is a duplicate.
    fn observe(&mut self, candidate: &CandidateFile) -> Option<PathBuf> {
        match self.first_seen.entry(candidate.key()) {
            std::collections::hash_map::Entry::Occupied(entry) => Some(entry.get().clone()),
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(candidate.path.clone());
                None
            }
        }
    }
}

/// A file marked as a duplicate of an earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Duplicate {
    /// The duplicate file (to be removed)
    pub path: PathBuf,
    /// The earlier file with the same equivalence key (kept)
    pub original: PathBuf,
}

/// Outcome of the decision phase, both lists in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Files that survive deduplication
    pub kept: Vec<PathBuf>,
    /// Files that duplicate an earlier kept file
    pub removed: Vec<Duplicate>,
}

impl Resolution {
    /// Paths marked for removal.
    #[must_use]
    pub fn removed_paths(&self) -> Vec<PathBuf> {
        self.removed.iter().map(|d| d.path.clone()).collect()
    }

    /// True when no duplicates were found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.removed.is_empty()
    }

    /// Total number of files that went through resolution.
    #[must_use]
    pub fn total(&self) -> usize {
        self.kept.len() + self.removed.len()
    }
}

/// Partition `candidates` into kept files and duplicates.
///
/// `candidates` must be in traversal order: for every equivalence class the
/// earliest candidate is kept, regardless of path or name ordering. Classes
/// already present in `registry` (from an earlier batch) make even the first
/// occurrence in this batch a duplicate. The updated registry is returned to
/// the caller.
#[must_use]
pub fn resolve(
    candidates: &[CandidateFile],
    mut registry: SeenRegistry,
) -> (Resolution, SeenRegistry) {
    let mut resolution = Resolution::default();

    for candidate in candidates {
        match registry.observe(candidate) {
            Some(original) => {
                log::debug!(
                    "Duplicate: {} (same as {})",
                    candidate.path.display(),
                    original.display()
                );
                resolution.removed.push(Duplicate {
                    path: candidate.path.clone(),
                    original,
                });
            }
            None => {
                log::trace!("Keeping {} [{}]", candidate.path.display(), candidate.key());
                resolution.kept.push(candidate.path.clone());
            }
        }
    }

    (resolution, registry)
}
