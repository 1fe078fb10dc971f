//! Layout plans: every placement of a run, computed up front.

use serde::Serialize;

use super::geometry::{CardSize, PageSize};
use super::policy::LayoutPolicy;
use super::LayoutError;

/// Where one card lands. Coordinates are millimetres from the top-left
/// corner of its page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    /// Position of the card in the input sequence
    pub index: usize,
    /// 0-based page number, non-decreasing across a plan
    pub page_index: usize,
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

/// Inputs that fully determine a plan besides the card count.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutSettings {
    pub policy: LayoutPolicy,
    pub card: CardSize,
    pub page: PageSize,
}

impl LayoutSettings {
    /// Bundle a policy with card and page dimensions.
    #[must_use]
    pub fn new(policy: LayoutPolicy, card: CardSize, page: PageSize) -> Self {
        Self { policy, card, page }
    }
}

/// The ordered placements for a whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutPlan {
    /// Size shared by every page
    pub page_size: PageSize,
    /// One placement per card, in input order
    pub placements: Vec<Placement>,
    /// Number of pages
    pub page_count: usize,
}

impl LayoutPlan {
    /// Placements grouped by page, in page order.
    pub fn pages(&self) -> impl Iterator<Item = &[Placement]> + '_ {
        self.placements
            .chunk_by(|a, b| a.page_index == b.page_index)
    }

    /// Number of cards placed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// True if the plan places nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Compute the plan for `count` cards.
///
/// A pure function of its inputs: the same arguments always yield an
/// identical plan. Every chunk of `per_page` consecutive cards gets its own
/// page, including a final partial chunk. A grid that runs past the page
/// edge is logged, not rejected.
///
/// ```
/// use cardpress::layout::{layout, LayoutSettings};
///
/// let plan = layout(10, &LayoutSettings::default()).unwrap();
/// assert_eq!(plan.page_count, 2);
/// assert_eq!(plan.pages().map(|p| p.len()).collect::<Vec<_>>(), vec![9, 1]);
/// ```
///
/// # Errors
///
/// [`LayoutError::EmptyInput`] when `count` is zero, and the validation
/// errors of the grid or card size.
pub fn layout(count: usize, settings: &LayoutSettings) -> Result<LayoutPlan, LayoutError> {
    if count == 0 {
        return Err(LayoutError::EmptyInput);
    }
    if !settings.card.is_valid() {
        return Err(LayoutError::InvalidCard(format!(
            "{} x {} mm",
            settings.card.width_mm, settings.card.height_mm
        )));
    }
    if let LayoutPolicy::Grid(grid) = &settings.policy {
        grid.validate()?;
    }

    if !settings.policy.fits(settings.card, settings.page) {
        log::warn!(
            "Layout exceeds the {} x {} mm page; cards will be clipped",
            settings.page.width_mm,
            settings.page.height_mm
        );
    }

    let placements: Vec<Placement> = (0..count)
        .map(|i| settings.policy.place(i, settings.card, settings.page))
        .collect();
    let page_count = count.div_ceil(settings.policy.per_page());

    log::debug!("Planned {count} cards on {page_count} pages");
    Ok(LayoutPlan {
        page_size: settings.page,
        placements,
        page_count,
    })
}
