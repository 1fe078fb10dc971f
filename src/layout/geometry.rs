//! Physical page and card dimensions.
//!
//! Layout is computed in millimetres with the origin at the top-left corner
//! of the page; conversion to PDF points happens only at render time.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// PDF points per millimetre (72 pt per inch, 25.4 mm per inch).
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Convert millimetres to PDF points.
#[must_use]
pub fn mm_to_pt(mm: f64) -> f64 {
    mm * PT_PER_MM
}

/// Standard paper formats.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    /// ISO A3, 297 x 420 mm
    A3,
    /// ISO A4, 210 x 297 mm
    #[default]
    A4,
    /// ISO A5, 148 x 210 mm
    A5,
    /// US Letter, 8.5 x 11 in
    Letter,
    /// US Legal, 8.5 x 14 in
    Legal,
}

impl PageFormat {
    /// Portrait `(width, height)` in millimetres.
    #[must_use]
    pub fn dimensions_mm(self) -> (f64, f64) {
        match self {
            Self::A3 => (297.0, 420.0),
            Self::A4 => (210.0, 297.0),
            Self::A5 => (148.0, 210.0),
            Self::Letter => (215.9, 279.4),
            Self::Legal => (215.9, 355.6),
        }
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::A3 => "a3",
            Self::A4 => "a4",
            Self::A5 => "a5",
            Self::Letter => "letter",
            Self::Legal => "legal",
        };
        f.write_str(name)
    }
}

/// Page orientation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Long edge vertical
    #[default]
    Portrait,
    /// Long edge horizontal
    Landscape,
}

/// Size of one page in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageSize {
    /// Create a page size from explicit dimensions.
    #[must_use]
    pub fn new(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }

    /// Resolve a paper format in the given orientation.
    ///
    /// ```
    /// use cardpress::layout::{Orientation, PageFormat, PageSize};
    ///
    /// let a4 = PageSize::from_format(PageFormat::A4, Orientation::Landscape);
    /// assert_eq!((a4.width_mm, a4.height_mm), (297.0, 210.0));
    /// ```
    #[must_use]
    pub fn from_format(format: PageFormat, orientation: Orientation) -> Self {
        let (w, h) = format.dimensions_mm();
        match orientation {
            Orientation::Portrait => Self::new(w, h),
            Orientation::Landscape => Self::new(h, w),
        }
    }

    /// Width in PDF points.
    #[must_use]
    pub fn width_pt(&self) -> f64 {
        mm_to_pt(self.width_mm)
    }

    /// Height in PDF points.
    #[must_use]
    pub fn height_pt(&self) -> f64 {
        mm_to_pt(self.height_mm)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::from_format(PageFormat::default(), Orientation::default())
    }
}

/// Physical size of a card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl CardSize {
    /// Create a card size.
    #[must_use]
    pub fn new(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }

    /// True if both sides are finite and strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.width_mm, self.height_mm]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

impl Default for CardSize {
    /// Standard poker-size trading card, 63 x 88 mm.
    fn default() -> Self {
        Self::new(63.0, 88.0)
    }
}
