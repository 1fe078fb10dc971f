//! Report formatters for command results.
//!
//! - [`text`]: colored summaries for terminals
//! - [`json`]: machine-readable reports for scripting
//!
//! # Example
//!
//! ```no_run
//! use cardpress::output::json::{write_json, JsonRunReport};
//! use cardpress::error::ExitCode;
//! use cardpress::pipeline::{Pipeline, PipelineOptions};
//! use std::path::Path;
//!
//! let summary = Pipeline::new(PipelineOptions::default())
//!     .run(Path::new("./cards"), Path::new("deck.pdf"))
//!     .unwrap();
//! let report = JsonRunReport::new(&summary, ExitCode::Success);
//! write_json(&report, &mut std::io::stdout(), true).unwrap();
//! ```

pub mod json;
pub mod text;

pub use json::{write_json, JsonDedupeReport, JsonOutputError, JsonRunReport};
