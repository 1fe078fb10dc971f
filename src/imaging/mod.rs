//! Image codec: decoding, resampling and encoding card rasters.
//!
//! This module provides functionality for:
//! - Decoding any supported image, sniffing the format from content
//! - Standardizing files on disk to a fixed pixel size ([`standardize`])
//! - Preparing in-memory JPEG cards for the page compositor ([`card`])
//!
//! All resampling uses Lanczos3. JPEG cannot carry alpha, so transparent
//! pixels are composited onto white before encoding.

pub mod card;
pub mod standardize;

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

pub use card::{prepare_card, prepare_cards, CardImage, PreparedCards};
pub use standardize::{standardize_batch, standardize_file, StandardizeResult};

/// Resampling filter used for every resize.
pub const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Target raster for standardized card images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSpec {
    /// Width in pixels
    pub width_px: u32,
    /// Height in pixels
    pub height_px: u32,
    /// JPEG quality, 1-100
    pub jpeg_quality: u8,
}

impl Default for RasterSpec {
    fn default() -> Self {
        Self {
            width_px: 750,
            height_px: 1050,
            jpeg_quality: 95,
        }
    }
}

impl RasterSpec {
    /// Create a spec with the default JPEG quality.
    #[must_use]
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
            ..Self::default()
        }
    }

    /// Set the JPEG quality (clamped to 1-100).
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Resize `image` to exactly this size, unless it already matches.
    #[must_use]
    pub fn fit(&self, image: DynamicImage) -> DynamicImage {
        if image.width() == self.width_px && image.height() == self.height_px {
            image
        } else {
            image.resize_exact(self.width_px, self.height_px, RESAMPLE_FILTER)
        }
    }
}

/// Errors from decoding or encoding a single image.
#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    /// The file could not be opened or read.
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not a decodable image.
    #[error("Cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Encoding the resized image failed.
    #[error("Cannot encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The destination extension is not a format we can write.
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Writing the result failed.
    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ImagingError {
    /// Path of the image the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. }
            | Self::Decode { path, .. }
            | Self::Encode { path, .. }
            | Self::Write { path, .. } => path,
            Self::UnsupportedFormat(path) => path,
        }
    }
}

/// Decode an image file.
///
/// The format is guessed from the leading bytes; the extension is only used
/// when the content is not recognized.
///
/// # Errors
///
/// [`ImagingError::Read`] if the file cannot be opened,
/// [`ImagingError::Decode`] if it is not a valid image.
pub fn decode(path: &Path) -> Result<DynamicImage, ImagingError> {
    let read_error = |source| ImagingError::Read {
        path: path.to_path_buf(),
        source,
    };
    ImageReader::open(path)
        .map_err(read_error)?
        .with_guessed_format()
        .map_err(read_error)?
        .decode()
        .map_err(|source| ImagingError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Composite `image` onto an opaque white background.
///
/// Images without an alpha channel are only converted to RGB.
#[must_use]
pub fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u32::from(a);
        let blend = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Encode an RGB raster as baseline JPEG at `quality`.
///
/// # Errors
///
/// Returns the encoder error, tagged with `path` for reporting.
pub fn encode_jpeg(rgb: &RgbImage, quality: u8, path: &Path) -> Result<Vec<u8>, ImagingError> {
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .encode_image(rgb)
        .map_err(|source| ImagingError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(buf.into_inner())
}
