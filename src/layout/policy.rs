//! Layout policies: where the n-th card of a run lands.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::geometry::{CardSize, PageSize};
use super::plan::Placement;
use super::LayoutError;

/// Grid (N-up) tiling parameters, all lengths in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    /// Cards per row
    pub columns: u32,
    /// Rows per page
    pub rows: u32,
    /// Cards per page, at most `columns * rows`
    pub capacity: u32,
    /// Left margin of the first column
    pub offset_x: f64,
    /// Top margin of the first row
    pub offset_y: f64,
    /// Horizontal space between cards
    pub gap_x: f64,
    /// Vertical space between cards
    pub gap_y: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            columns: 3,
            rows: 3,
            capacity: 9,
            offset_x: 10.0,
            offset_y: 10.0,
            gap_x: 0.0,
            gap_y: 0.0,
        }
    }
}

impl GridSpec {
    /// Check the tiling parameters.
    ///
    /// # Errors
    ///
    /// [`LayoutError::InvalidGrid`] when a count is zero, the capacity does
    /// not fit the grid, or a length is negative or not finite.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.columns == 0 || self.rows == 0 || self.capacity == 0 {
            return Err(LayoutError::InvalidGrid(
                "columns, rows and capacity must be at least 1".to_string(),
            ));
        }
        if u64::from(self.capacity) > u64::from(self.columns) * u64::from(self.rows) {
            return Err(LayoutError::InvalidGrid(format!(
                "capacity {} exceeds {} columns x {} rows",
                self.capacity, self.columns, self.rows
            )));
        }
        for (name, value) in [
            ("offset_x", self.offset_x),
            ("offset_y", self.offset_y),
            ("gap_x", self.gap_x),
            ("gap_y", self.gap_y),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidGrid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Rows actually used by a full page.
    #[must_use]
    pub fn used_rows(&self) -> u32 {
        self.capacity.div_ceil(self.columns.max(1))
    }

    /// Bottom-right corner of the last occupied cell on a full page.
    #[must_use]
    pub fn extent(&self, card: CardSize) -> (f64, f64) {
        let columns = self.columns.min(self.capacity);
        let width = self.offset_x
            + f64::from(columns) * card.width_mm
            + f64::from(columns.saturating_sub(1)) * self.gap_x;
        let rows = self.used_rows();
        let height = self.offset_y
            + f64::from(rows) * card.height_mm
            + f64::from(rows.saturating_sub(1)) * self.gap_y;
        (width, height)
    }
}

/// Layout policy selector, as named in configuration and on the command line.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Several cards per page on a grid
    #[default]
    Grid,
    /// One centered card per page
    Single,
}

/// How cards are distributed over pages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutPolicy {
    /// Row-major N-up grid, `capacity` cards per page.
    Grid(GridSpec),
    /// One card per page, centered.
    Single,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self::Grid(GridSpec::default())
    }
}

impl LayoutPolicy {
    /// Build the policy named by `kind`; `grid` is ignored for single.
    #[must_use]
    pub fn from_kind(kind: LayoutKind, grid: GridSpec) -> Self {
        match kind {
            LayoutKind::Grid => Self::Grid(grid),
            LayoutKind::Single => Self::Single,
        }
    }

    /// The selector for this policy.
    #[must_use]
    pub fn kind(&self) -> LayoutKind {
        match self {
            Self::Grid(_) => LayoutKind::Grid,
            Self::Single => LayoutKind::Single,
        }
    }

    /// Cards per page.
    #[must_use]
    pub fn per_page(&self) -> usize {
        match self {
            Self::Grid(grid) => grid.capacity.max(1) as usize,
            Self::Single => 1,
        }
    }

    /// Placement of the card at `index` (0-based over the whole run).
    ///
    /// Pure: the result depends only on the arguments.
    #[must_use]
    pub fn place(&self, index: usize, card: CardSize, page: PageSize) -> Placement {
        match self {
            Self::Grid(grid) => {
                let capacity = self.per_page();
                let columns = grid.columns.max(1) as usize;
                let slot = index % capacity;
                let (col, row) = (slot % columns, slot / columns);
                Placement {
                    index,
                    page_index: index / capacity,
                    x_mm: grid.offset_x + col as f64 * (card.width_mm + grid.gap_x),
                    y_mm: grid.offset_y + row as f64 * (card.height_mm + grid.gap_y),
                    width_mm: card.width_mm,
                    height_mm: card.height_mm,
                }
            }
            Self::Single => Placement {
                index,
                page_index: index,
                x_mm: (page.width_mm - card.width_mm) / 2.0,
                y_mm: (page.height_mm - card.height_mm) / 2.0,
                width_mm: card.width_mm,
                height_mm: card.height_mm,
            },
        }
    }

    /// True if a full page stays within `page`.
    #[must_use]
    pub fn fits(&self, card: CardSize, page: PageSize) -> bool {
        match self {
            Self::Grid(grid) => {
                let (w, h) = grid.extent(card);
                w <= page.width_mm && h <= page.height_mm
            }
            Self::Single => card.width_mm <= page.width_mm && card.height_mm <= page.height_mm,
        }
    }
}
