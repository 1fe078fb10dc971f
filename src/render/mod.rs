//! Rendering a [`LayoutPlan`] into a document.
//!
//! # Overview
//!
//! Rendering walks the plan page by page: open a page, place each card that
//! belongs to it, move on. Output formats implement [`PageRenderer`]; the
//! shipped one is [`PdfRenderer`].
//!
//! [`Compositor`] ties planning and rendering together and tracks the run:
//!
//! ```text
//! Idle -> Planning -> Rendering -> Finalized
//!            |            |
//!            +-> Failed <-+
//! ```
//!
//! Planning fails when there are no images; rendering fails when the
//! renderer or the final write does. A compositor composes exactly once.
//!
//! # Example
//!
//! ```no_run
//! use cardpress::layout::LayoutSettings;
//! use cardpress::render::{Compositor, PdfRenderer};
//! use std::path::Path;
//!
//! # let cards = Vec::new();
//! let mut compositor = Compositor::new(LayoutSettings::default());
//! let plan = compositor
//!     .compose(&cards, &mut PdfRenderer::new(), Path::new("cards.pdf"))
//!     .unwrap();
//! println!("{} pages", plan.page_count);
//! ```

pub mod pdf;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::imaging::CardImage;
use crate::layout::{layout, LayoutError, LayoutPlan, LayoutSettings, PageSize, Placement};
use crate::progress::ProgressCallback;

pub use pdf::PdfRenderer;

/// Errors from rendering a plan.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Planning failed.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// The plan and the images disagree on the number of cards.
    #[error("Plan places {planned} cards but {images} images were supplied")]
    PlanMismatch { planned: usize, images: usize },

    /// An image was placed before any page was opened.
    #[error("Cannot place an image before a page is started")]
    NoPage,

    /// The document could not be assembled.
    #[error("Cannot build document: {0}")]
    Document(String),

    /// Writing the finished document failed.
    #[error("Cannot write {path}: {message}")]
    Write { path: PathBuf, message: String },

    /// The compositor was used outside of its lifecycle.
    #[error("Compositor cannot compose from state {0}")]
    InvalidState(CompositorState),
}

/// Output backend driven page by page.
pub trait PageRenderer {
    /// Start a new page; any previous page is complete.
    fn begin_page(&mut self, size: PageSize) -> Result<(), RenderError>;

    /// Draw `image` on the current page at `placement`.
    fn place_image(&mut self, image: &CardImage, placement: &Placement)
        -> Result<(), RenderError>;

    /// Complete the document and write it to `output`.
    ///
    /// Nothing may be left at `output` when this fails.
    fn finish(&mut self, output: &Path) -> Result<(), RenderError>;
}

/// Drive `renderer` through `plan`, drawing `images[i]` at placement `i`.
///
/// Returns the number of pages rendered.
///
/// # Errors
///
/// [`RenderError::PlanMismatch`] if the counts differ, otherwise the first
/// error returned by the renderer.
pub fn render<R: PageRenderer + ?Sized>(
    plan: &LayoutPlan,
    images: &[CardImage],
    renderer: &mut R,
    output: &Path,
) -> Result<usize, RenderError> {
    render_with_progress(plan, images, renderer, output, None)
}

fn render_with_progress<R: PageRenderer + ?Sized>(
    plan: &LayoutPlan,
    images: &[CardImage],
    renderer: &mut R,
    output: &Path,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> Result<usize, RenderError> {
    if plan.len() != images.len() {
        return Err(RenderError::PlanMismatch {
            planned: plan.len(),
            images: images.len(),
        });
    }

    if let Some(callback) = progress {
        callback.on_phase_start("render", plan.page_count);
    }

    let mut pages = 0;
    for page in plan.pages() {
        renderer.begin_page(plan.page_size)?;
        for placement in page {
            renderer.place_image(&images[placement.index], placement)?;
        }
        pages += 1;
        if let Some(callback) = progress {
            callback.on_progress(pages, output.to_string_lossy().as_ref());
        }
    }

    renderer.finish(output)?;

    if let Some(callback) = progress {
        callback.on_phase_end("render");
    }
    log::info!("Wrote {} pages to {}", pages, output.display());
    Ok(pages)
}

/// Lifecycle of one composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompositorState {
    Idle,
    Planning,
    Rendering,
    Finalized,
    Failed,
}

impl fmt::Display for CompositorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Plans and renders one document.
pub struct Compositor {
    settings: LayoutSettings,
    state: CompositorState,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl fmt::Debug for Compositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compositor")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Compositor {
    /// Create an idle compositor.
    #[must_use]
    pub fn new(settings: LayoutSettings) -> Self {
        Self {
            settings,
            state: CompositorState::Idle,
            progress: None,
        }
    }

    /// Report rendered pages to `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CompositorState {
        self.state
    }

    /// Plan `images` and render them to `output`.
    ///
    /// # Errors
    ///
    /// - [`RenderError::InvalidState`] if this compositor already ran
    /// - [`RenderError::Layout`] if planning fails (no images)
    /// - any renderer error, including the final write
    pub fn compose<R: PageRenderer + ?Sized>(
        &mut self,
        images: &[CardImage],
        renderer: &mut R,
        output: &Path,
    ) -> Result<LayoutPlan, RenderError> {
        if self.state != CompositorState::Idle {
            return Err(RenderError::InvalidState(self.state));
        }

        self.state = CompositorState::Planning;
        let plan = match layout(images.len(), &self.settings) {
            Ok(plan) => plan,
            Err(e) => {
                self.state = CompositorState::Failed;
                return Err(e.into());
            }
        };

        self.state = CompositorState::Rendering;
        match render_with_progress(&plan, images, renderer, output, self.progress.as_ref()) {
            Ok(_) => {
                self.state = CompositorState::Finalized;
                Ok(plan)
            }
            Err(e) => {
                log::error!("Rendering {} failed: {}", output.display(), e);
                self.state = CompositorState::Failed;
                Err(e)
            }
        }
    }
}

/// Append `.pdf` unless `path` already ends in it (any case).
///
/// ```
/// use cardpress::render::ensure_pdf_extension;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(ensure_pdf_extension(Path::new("out")), PathBuf::from("out.pdf"));
/// assert_eq!(ensure_pdf_extension(Path::new("out.PDF")), PathBuf::from("out.PDF"));
/// assert_eq!(ensure_pdf_extension(Path::new("out.v2")), PathBuf::from("out.v2.pdf"));
/// ```
#[must_use]
pub fn ensure_pdf_extension(path: &Path) -> PathBuf {
    let has_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if has_pdf {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".pdf");
        PathBuf::from(name)
    }
}
