//! Logging setup for cardpress.
//!
//! Uses the `log` facade with an `env_logger` backend. The level comes from,
//! in priority order:
//!
//! 1. `RUST_LOG` (if set)
//! 2. `--quiet` (errors only) or `--verbose` (`-v` debug, `-vv` trace)
//! 3. Default: info
//!
//! Per-file problems are logged at `warn` with the path and the cause, so a
//! default run shows every skipped card.
//!
//! ```rust,no_run
//! use cardpress::logging::init_logging;
//!
//! init_logging(1, false, false);
//! log::debug!("visible with -v");
//! ```

use std::env;
use std::io::Write;

use env_logger::{Builder, WriteStyle};
use log::LevelFilter;

/// Initialize logging from the CLI flags.
///
/// Calling it again is harmless: the first logger stays installed.
pub fn init_logging(verbose: u8, quiet: bool, no_color: bool) {
    let from_env = env::var("RUST_LOG").is_ok();

    let mut builder = Builder::new();
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }
    if no_color {
        builder.write_style(WriteStyle::Never);
    }

    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        if verbose >= 1 {
            writeln!(
                buf,
                "{} {style}{:<5}{style:#} [{}] {}",
                buf.timestamp_millis(),
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(buf, "{style}{:<5}{style:#} {}", level, record.args())
        }
    });

    if builder.try_init().is_ok() {
        log::debug!("Logging initialized at level {}", current_level_name());
    }
}

/// Level for the given verbosity flags; quiet wins over verbose.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Name of the active maximum log level.
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
