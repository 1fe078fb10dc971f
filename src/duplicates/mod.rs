//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Name normalization and equivalence keys ([`key`])
//! - The pure first-seen-wins decision phase ([`registry`])
//! - Walking, hashing and resolving a folder ([`finder`])
//!
//! Deleting the duplicates is a separate apply phase, see
//! [`crate::actions::delete::apply_resolution`].

pub mod finder;
pub mod key;
pub mod registry;

pub use finder::{
    build_candidates, CandidateBatch, DuplicateResolver, ResolveSummary, ResolverConfig,
};
pub use key::{normalized_key, EquivalenceKey};
pub use registry::{resolve, CandidateFile, Duplicate, Resolution, SeenRegistry};
