//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config <PATH>`, or `config.toml` in the platform config
//!    directory)
//! 3. Environment variables prefixed with `CARDPRESS_`; nested keys are
//!    separated by `__`, e.g. `CARDPRESS_LAYOUT__GRID__COLUMNS=4`
//! 4. Command-line flags, applied by the CLI on top of the extracted config
//!
//! # Example file
//!
//! ```toml
//! [scan]
//! recursive = true
//! io_threads = 4
//!
//! [card]
//! width_mm = 63.0
//! height_mm = 88.0
//!
//! [page]
//! format = "a4"
//! orientation = "portrait"
//!
//! [layout]
//! policy = "grid"
//!
//! [layout.grid]
//! columns = 3
//! rows = 3
//! capacity = 9
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::delete::DeleteConfig;
use crate::imaging::RasterSpec;
use crate::layout::{
    CardSize, GridSpec, LayoutKind, LayoutPolicy, LayoutSettings, Orientation, PageFormat,
    PageSize,
};
use crate::scanner::WalkerConfig;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "CARDPRESS_";

/// Errors while loading or checking configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has the wrong shape.
    #[error("Invalid configuration: {0}")]
    Parse(#[from] Box<figment::Error>),

    /// Values parsed but are not usable.
    #[error("Invalid configuration: {0}")]
    Validation(String),

    /// The effective configuration could not be printed.
    #[error("Cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Directory discovery and hashing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    pub recursive: bool,
    pub follow_symlinks: bool,
    pub skip_hidden: bool,
    /// Threads for hashing and image decoding
    pub io_threads: usize,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_symlinks: false,
            skip_hidden: false,
            io_threads: 4,
        }
    }
}

/// Duplicate removal settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupeSection {
    /// Run duplicate resolution as part of `run`
    pub enabled: bool,
    /// Delete for real instead of moving to the trash
    pub permanent: bool,
}

impl Default for DedupeSection {
    fn default() -> Self {
        Self {
            enabled: true,
            permanent: false,
        }
    }
}

/// Page size selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSection {
    pub format: PageFormat,
    pub orientation: Orientation,
}

/// Layout policy selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSection {
    pub policy: LayoutKind,
    /// Used by the grid policy only
    pub grid: GridSpec,
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Flat folder for collected/resized copies; unset works in place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_root: Option<PathBuf>,
    pub scan: ScanSection,
    pub dedupe: DedupeSection,
    pub card: CardSize,
    pub page: PageSection,
    pub layout: LayoutSection,
    pub raster: RasterSpec,
}

impl Config {
    /// Default platform-specific config file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "cardpress", "cardpress")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Build the figment for defaults, file and environment layers.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotFound`] if `path` is given but does not exist.
    pub fn figment(path: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(default) = Self::default_path() {
                    log::debug!("Looking for config at {}", default.display());
                    figment = figment.merge(Toml::file(default));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load and validate the layered configuration.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`]: missing explicit file, parse failure, or invalid
    /// values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment(path)?)
    }

    /// Extract and validate a configuration from `figment`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] or [`ConfigError::Validation`].
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Config = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Validation`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.io_threads == 0 {
            return Err(ConfigError::Validation(
                "scan.io_threads must be at least 1".to_string(),
            ));
        }
        if !self.card.is_valid() {
            return Err(ConfigError::Validation(format!(
                "card size must be positive, got {} x {} mm",
                self.card.width_mm, self.card.height_mm
            )));
        }
        if self.raster.width_px == 0 || self.raster.height_px == 0 {
            return Err(ConfigError::Validation(format!(
                "raster size must be positive, got {} x {} px",
                self.raster.width_px, self.raster.height_px
            )));
        }
        if !(1..=100).contains(&self.raster.jpeg_quality) {
            return Err(ConfigError::Validation(format!(
                "raster.jpeg_quality must be between 1 and 100, got {}",
                self.raster.jpeg_quality
            )));
        }
        self.layout
            .grid
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }

    /// Print the configuration as TOML.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Serialize`] if TOML serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Walker settings from the `[scan]` section.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(
            self.scan.recursive,
            self.scan.follow_symlinks,
            self.scan.skip_hidden,
        )
    }

    /// Resolved page size.
    #[must_use]
    pub fn page_size(&self) -> PageSize {
        PageSize::from_format(self.page.format, self.page.orientation)
    }

    /// Policy, card and page combined for planning.
    #[must_use]
    pub fn layout_settings(&self) -> LayoutSettings {
        LayoutSettings::new(
            LayoutPolicy::from_kind(self.layout.policy, self.layout.grid),
            self.card,
            self.page_size(),
        )
    }

    /// Delete settings from the `[dedupe]` section.
    ///
    /// Dry runs are a per-invocation flag and never come from the file.
    #[must_use]
    pub fn delete_config(&self, dry_run: bool) -> DeleteConfig {
        DeleteConfig {
            permanent: self.dedupe.permanent,
            dry_run,
        }
    }
}
