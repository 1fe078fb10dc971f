//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//! This module provides the `Hasher` struct for computing BLAKE3 hashes
//! of file contents. Files are read in fixed-size chunks so large scans
//! never need to hold a whole image in memory just to fingerprint it.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use super::HashError;

/// A 256-bit BLAKE3 content digest.
pub type Hash = [u8; 32];

/// Read buffer size used while streaming files through the hasher (64 KiB).
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Streaming BLAKE3 hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    chunk_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher using the default [`CHUNK_SIZE`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
        }
    }

    /// Create a hasher with a custom read buffer size (minimum 1 byte).
    #[must_use]
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Hash the entire content of a file.
    ///
    /// The file is opened and read exactly once; interrupted reads are
    /// resumed, every other error is returned to the caller.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be opened or read.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    hasher.update(&buffer[..n]);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            }
        }

        Ok(*hasher.finalize().as_bytes())
    }

    /// Hash an in-memory byte slice.
    #[must_use]
    pub fn hash_bytes(&self, bytes: &[u8]) -> Hash {
        *blake3::hash(bytes).as_bytes()
    }
}

/// Render a hash as lowercase hexadecimal (64 characters).
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}
