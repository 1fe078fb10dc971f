//! Equivalence keys for duplicate detection.
//!
//! Two card files are duplicates when their *normalized names* and their
//! content digests both match. The normalized name is the file stem with
//! everything but alphabetic characters removed, so `bolt_01.png` and
//! `bolt-002.jpg` share the name `bolt`. Case is preserved: `BOLT` and
//! `bolt` are different names.

use std::fmt;
use std::path::Path;

use crate::scanner::{hash_to_hex, Hash};

/// Derive the normalized name of a file.
///
/// Takes the file name without its extension and keeps only alphabetic
/// characters (Unicode-aware). Digits, underscores, hyphens, whitespace and
/// punctuation are dropped. A stem without any letters normalizes to the
/// empty string, which is still a valid key.
///
/// ```
/// use cardpress::duplicates::normalized_key;
/// use std::path::Path;
///
/// assert_eq!(normalized_key(Path::new("card_01.png")), "card");
/// assert_eq!(normalized_key(Path::new("CARD002.png")), "CARD");
/// assert_eq!(normalized_key(Path::new("c a r d!! .png")), "card");
/// assert_eq!(normalized_key(Path::new("0001.jpg")), "");
/// ```
#[must_use]
pub fn normalized_key(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect()
}

/// The `(normalized name, content digest)` pair that defines an
/// equivalence class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EquivalenceKey {
    /// Normalized file name (see [`normalized_key`])
    pub name: String,
    /// BLAKE3 digest of the full file content
    pub digest: Hash,
}

impl EquivalenceKey {
    /// Create a key from its parts.
    #[must_use]
    pub fn new(name: impl Into<String>, digest: Hash) -> Self {
        Self {
            name: name.into(),
            digest,
        }
    }
}

impl fmt::Display for EquivalenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, &hash_to_hex(&self.digest)[..16])
    }
}
