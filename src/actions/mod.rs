//! File actions module.
//!
//! This module provides the steps that change the file system:
//! - Removing duplicates found by [`crate::duplicates`] ([`delete`])
//! - Copying images into a flat working folder ([`collect`])
//!
//! # Deletion
//!
//! The delete module applies a [`crate::duplicates::Resolution`] with:
//! - Move to system trash (default, recoverable)
//! - Permanent deletion (requires explicit configuration)
//! - Dry run that only reports
//! - A check that the kept original still exists before each delete
//!
//! ```no_run
//! use cardpress::actions::delete::{delete_to_trash, DeleteConfig};
//! use std::path::PathBuf;
//!
//! let path = PathBuf::from("/path/to/bolt_2.png");
//! let result = delete_to_trash(&path);
//! ```

pub mod collect;
pub mod delete;

// Re-export commonly used types
pub use collect::{collect_images, CollectResult};
pub use delete::{
    apply_resolution, delete_duplicate, delete_to_trash, permanent_delete, BatchDeleteResult,
    DeleteConfig, DeleteError, DeleteResult,
};
