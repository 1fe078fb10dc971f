//! Command-line interface definitions for cardpress.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! Global options (verbosity, color, config file) apply to every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Whole pipeline: dedupe, resize and lay out 3x3 on A4
//! cardpress run ./scans deck.pdf
//!
//! # Only report duplicates, as JSON
//! cardpress dedupe ./scans --dry-run --output json
//!
//! # One card per page on Letter
//! cardpress pdf ./cards deck.pdf --layout single --page letter
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::layout::{LayoutKind, Orientation, PageFormat};

/// Turn folders of trading-card scans into print-ready PDFs.
///
/// cardpress removes duplicate scans (same name stem and same content),
/// resizes every card to a standard raster, and tiles the cards onto pages.
#[derive(Debug, Parser)]
#[command(name = "cardpress")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file (defaults to config.toml in the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find and remove duplicate card images
    Dedupe(DedupeArgs),
    /// Copy every card image into one flat folder
    Collect(CollectArgs),
    /// Resize card images to the standard raster
    Resize(ResizeArgs),
    /// Lay out card images into a PDF
    Pdf(PdfArgs),
    /// Collect, dedupe, resize and lay out in one go
    Run(RunArgs),
    /// Print the effective configuration as TOML
    Config,
}

/// Options shared by every command that walks a folder.
#[derive(Debug, Clone, Default, Args)]
pub struct WalkArgs {
    /// Only look at the top level of the folder
    #[arg(long)]
    pub no_recursive: bool,

    /// Follow symbolic links during the walk
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Number of I/O threads for hashing and decoding (default: 4)
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,
}

impl WalkArgs {
    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if self.no_recursive {
            config.scan.recursive = false;
        }
        if self.follow_symlinks {
            config.scan.follow_symlinks = true;
        }
        if self.skip_hidden {
            config.scan.skip_hidden = true;
        }
        if let Some(threads) = self.io_threads {
            config.scan.io_threads = threads;
        }
    }
}

/// Page layout options.
#[derive(Debug, Clone, Default, Args)]
pub struct LayoutArgs {
    /// Layout policy
    #[arg(long, value_enum, value_name = "POLICY")]
    pub layout: Option<LayoutKind>,

    /// Paper format
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub page: Option<PageFormat>,

    /// Page orientation
    #[arg(long, value_enum)]
    pub orientation: Option<Orientation>,

    /// Card width in millimetres
    #[arg(long, value_name = "MM")]
    pub card_width: Option<f64>,

    /// Card height in millimetres
    #[arg(long, value_name = "MM")]
    pub card_height: Option<f64>,

    /// Grid columns
    #[arg(long, value_name = "N")]
    pub columns: Option<u32>,

    /// Grid rows
    #[arg(long, value_name = "N")]
    pub rows: Option<u32>,

    /// Cards per grid page (at most columns x rows)
    #[arg(long, value_name = "N")]
    pub capacity: Option<u32>,

    /// Left margin of the grid in millimetres
    #[arg(long, value_name = "MM")]
    pub offset_x: Option<f64>,

    /// Top margin of the grid in millimetres
    #[arg(long, value_name = "MM")]
    pub offset_y: Option<f64>,

    /// Horizontal gap between cards in millimetres
    #[arg(long, value_name = "MM")]
    pub gap_x: Option<f64>,

    /// Vertical gap between cards in millimetres
    #[arg(long, value_name = "MM")]
    pub gap_y: Option<f64>,
}

impl LayoutArgs {
    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(policy) = self.layout {
            config.layout.policy = policy;
        }
        if let Some(format) = self.page {
            config.page.format = format;
        }
        if let Some(orientation) = self.orientation {
            config.page.orientation = orientation;
        }
        if let Some(width) = self.card_width {
            config.card.width_mm = width;
        }
        if let Some(height) = self.card_height {
            config.card.height_mm = height;
        }

        let grid = &mut config.layout.grid;
        if let Some(columns) = self.columns {
            grid.columns = columns;
        }
        if let Some(rows) = self.rows {
            grid.rows = rows;
        }
        if let Some(capacity) = self.capacity {
            grid.capacity = capacity;
        } else if self.columns.is_some() || self.rows.is_some() {
            grid.capacity = grid.columns.saturating_mul(grid.rows);
        }
        if let Some(v) = self.offset_x {
            grid.offset_x = v;
        }
        if let Some(v) = self.offset_y {
            grid.offset_y = v;
        }
        if let Some(v) = self.gap_x {
            grid.gap_x = v;
        }
        if let Some(v) = self.gap_y {
            grid.gap_y = v;
        }
    }
}

/// Raster options.
#[derive(Debug, Clone, Default, Args)]
pub struct RasterArgs {
    /// Target width in pixels
    #[arg(long, value_name = "PX")]
    pub width_px: Option<u32>,

    /// Target height in pixels
    #[arg(long, value_name = "PX")]
    pub height_px: Option<u32>,

    /// JPEG quality (1-100)
    #[arg(long, value_name = "Q", value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,
}

impl RasterArgs {
    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(width) = self.width_px {
            config.raster.width_px = width;
        }
        if let Some(height) = self.height_px {
            config.raster.height_px = height;
        }
        if let Some(quality) = self.quality {
            config.raster.jpeg_quality = quality;
        }
    }
}

/// Arguments for the dedupe subcommand.
#[derive(Debug, Args)]
pub struct DedupeArgs {
    /// Folder to deduplicate
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    #[command(flatten)]
    pub walk: WalkArgs,

    /// Report duplicates without deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Use permanent deletion instead of moving to trash
    ///
    /// Warning: Files cannot be recovered after permanent deletion.
    #[arg(long)]
    pub permanent: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the collect subcommand.
#[derive(Debug, Args)]
pub struct CollectArgs {
    /// Folder to collect from
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Destination folder (created if missing)
    #[arg(value_name = "DEST")]
    pub destination: PathBuf,

    #[command(flatten)]
    pub walk: WalkArgs,
}

/// Arguments for the resize subcommand.
#[derive(Debug, Args)]
pub struct ResizeArgs {
    /// Folder with card images
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Write resized copies here instead of overwriting the originals
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub walk: WalkArgs,

    #[command(flatten)]
    pub raster: RasterArgs,
}

/// Arguments for the pdf subcommand.
#[derive(Debug, Args)]
pub struct PdfArgs {
    /// Folder with card images
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output PDF (".pdf" is appended when missing)
    #[arg(value_name = "OUTPUT")]
    pub output_pdf: PathBuf,

    #[command(flatten)]
    pub walk: WalkArgs,

    #[command(flatten)]
    pub layout: LayoutArgs,

    #[command(flatten)]
    pub raster: RasterArgs,
}

/// Arguments for the run subcommand.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Folder with card scans
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output PDF (".pdf" is appended when missing)
    #[arg(value_name = "OUTPUT")]
    pub output_pdf: PathBuf,

    /// Copy images into this flat folder first instead of working in place
    #[arg(long, value_name = "DIR")]
    pub output_root: Option<PathBuf>,

    /// Do not remove duplicates
    #[arg(long)]
    pub skip_dedupe: bool,

    /// Do not resize files on disk
    #[arg(long)]
    pub skip_resize: bool,

    /// Use permanent deletion instead of moving to trash
    #[arg(long)]
    pub permanent: bool,

    /// Report duplicates without deleting them; the PDF still uses only the kept files
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub walk: WalkArgs,

    #[command(flatten)]
    pub layout: LayoutArgs,

    #[command(flatten)]
    pub raster: RasterArgs,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored human-readable summary
    Text,
    /// JSON for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
