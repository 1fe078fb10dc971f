//! Page layout planning.
//!
//! This module turns a card count into a [`LayoutPlan`]: the page and
//! position of every card, before anything is rendered.
//!
//! - [`geometry`]: page formats, card sizes, millimetre/point conversion
//! - [`policy`]: the grid and single-card placement rules
//! - [`plan`]: the pure [`layout`] function and its result
//!
//! # Example
//!
//! ```
//! use cardpress::layout::{layout, CardSize, LayoutPolicy, LayoutSettings, PageSize};
//!
//! let settings = LayoutSettings::new(LayoutPolicy::Single, CardSize::default(), PageSize::default());
//! let plan = layout(2, &settings).unwrap();
//! assert_eq!(plan.page_count, 2);
//! assert_eq!(plan.placements[1].x_mm, 73.5);
//! ```

pub mod geometry;
pub mod plan;
pub mod policy;

pub use geometry::{mm_to_pt, CardSize, Orientation, PageFormat, PageSize, PT_PER_MM};
pub use plan::{layout, LayoutPlan, LayoutSettings, Placement};
pub use policy::{GridSpec, LayoutKind, LayoutPolicy};

/// Errors from layout planning.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LayoutError {
    /// There is nothing to lay out.
    #[error("No card images to lay out")]
    EmptyInput,

    /// The grid parameters are inconsistent.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// The card size is zero, negative or not a number.
    #[error("Invalid card size: {0}")]
    InvalidCard(String),
}
