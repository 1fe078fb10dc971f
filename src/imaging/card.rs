//! Card rasters ready for placement on a page.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::{decode, encode_jpeg, flatten_onto_white, ImagingError, RasterSpec};
use crate::layout::CardSize;
use crate::progress::ProgressCallback;

/// A decoded, resized card encoded as baseline JPEG.
///
/// The physical size is what the compositor places; the pixel size is what
/// the JPEG stream contains.
#[derive(Clone, PartialEq)]
pub struct CardImage {
    /// File the card was read from
    pub source: PathBuf,
    /// Physical width in millimetres
    pub width_mm: f64,
    /// Physical height in millimetres
    pub height_mm: f64,
    /// Raster width in pixels
    pub pixel_width: u32,
    /// Raster height in pixels
    pub pixel_height: u32,
    /// Encoded JPEG bytes
    pub jpeg: Vec<u8>,
}

impl std::fmt::Debug for CardImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardImage")
            .field("source", &self.source)
            .field("width_mm", &self.width_mm)
            .field("height_mm", &self.height_mm)
            .field("pixel_width", &self.pixel_width)
            .field("pixel_height", &self.pixel_height)
            .field("jpeg", &format_args!("<{} bytes>", self.jpeg.len()))
            .finish()
    }
}

impl CardImage {
    /// Physical size of the card.
    #[must_use]
    pub fn size(&self) -> CardSize {
        CardSize::new(self.width_mm, self.height_mm)
    }
}

/// Decode `path` and turn it into a [`CardImage`] of `card` size.
///
/// # Errors
///
/// Any [`ImagingError`] from decoding or encoding.
pub fn prepare_card(
    path: &Path,
    spec: &RasterSpec,
    card: CardSize,
) -> Result<CardImage, ImagingError> {
    let rgb = flatten_onto_white(&spec.fit(decode(path)?));
    let jpeg = encode_jpeg(&rgb, spec.jpeg_quality, path)?;

    Ok(CardImage {
        source: path.to_path_buf(),
        width_mm: card.width_mm,
        height_mm: card.height_mm,
        pixel_width: rgb.width(),
        pixel_height: rgb.height(),
        jpeg,
    })
}

/// Cards produced by [`prepare_cards`].
#[derive(Debug, Default)]
pub struct PreparedCards {
    /// Cards that decoded, in input order
    pub cards: Vec<CardImage>,
    /// Inputs that could not be decoded, with the cause
    pub failures: Vec<(PathBuf, String)>,
}

/// Prepare many cards in parallel.
///
/// Decoding runs on a pool of `io_threads`; results are collected by input
/// index, so `cards` keeps the relative order of `paths` with failed inputs
/// left out.
#[must_use]
pub fn prepare_cards(
    paths: &[PathBuf],
    spec: &RasterSpec,
    card: CardSize,
    io_threads: usize,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> PreparedCards {
    let mut prepared = PreparedCards::default();
    if paths.is_empty() {
        return prepared;
    }

    if let Some(callback) = progress {
        callback.on_phase_start("decode", paths.len());
    }

    let done = AtomicUsize::new(0);
    let process = |path: &PathBuf| {
        let outcome = prepare_card(path, spec, card);
        if let Some(callback) = progress {
            let current = done.fetch_add(1, Ordering::Relaxed) + 1;
            callback.on_progress(current, path.to_string_lossy().as_ref());
        }
        outcome
    };

    let outcomes: Vec<Result<CardImage, ImagingError>> =
        match rayon::ThreadPoolBuilder::new().num_threads(io_threads.max(1)).build() {
            Ok(pool) => pool.install(|| paths.par_iter().map(process).collect()),
            Err(e) => {
                log::warn!("Failed to create decode thread pool, decoding sequentially: {e}");
                paths.iter().map(process).collect()
            }
        };

    if let Some(callback) = progress {
        callback.on_phase_end("decode");
    }

    for outcome in outcomes {
        match outcome {
            Ok(card) => prepared.cards.push(card),
            Err(e) => {
                log::warn!("Skipping card {}: {}", e.path().display(), e);
                prepared.failures.push((e.path().to_path_buf(), e.to_string()));
            }
        }
    }
    prepared
}
