//! cardpress - print-ready PDFs from folders of trading-card scans
//!
//! Two engines do the work:
//!
//! - the duplicate resolver ([`duplicates`]) keeps the first file of every
//!   group sharing a normalized name stem and BLAKE3 content, and
//!   [`actions`] deletes the rest;
//! - the page compositor ([`layout`] + [`render`]) tiles standardized card
//!   images onto pages and writes a PDF with lopdf.
//!
//! [`pipeline`] chains them; [`run_app`] is the CLI entry point.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod imaging;
pub mod layout;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod scanner;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::actions::delete::{apply_resolution, DeleteConfig};
use crate::cli::{
    Cli, CollectArgs, Commands, DedupeArgs, OutputFormat, PdfArgs, ResizeArgs, RunArgs,
};
use crate::config::Config;
use crate::duplicates::{DuplicateResolver, ResolverConfig};
use crate::error::ExitCode;
use crate::imaging::{prepare_cards, standardize_batch};
use crate::output::json::{write_json, JsonDedupeReport, JsonRunReport};
use crate::output::text;
use crate::pipeline::{
    FileFailure, Pipeline, PipelineError, PipelineOptions, RunSummary, StageCounts,
};
use crate::progress::{Progress, ProgressCallback};
use crate::render::{ensure_pdf_extension, Compositor, PdfRenderer};

/// Run one CLI invocation.
///
/// Returns [`ExitCode::Success`] or [`ExitCode::PartialSuccess`] when the
/// command finished; fatal problems come back as errors, to be mapped with
/// [`ExitCode::for_error`].
///
/// # Errors
///
/// Configuration errors, a missing input folder, a folder without images,
/// and failures writing the final output.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.no_color);
    if cli.no_color {
        yansi::disable();
    }

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    log::debug!("Loaded configuration: {config:?}");

    match cli.command {
        Commands::Dedupe(args) => {
            args.walk.apply(&mut config);
            config.validate()?;
            handle_dedupe(&args, &config, cli.quiet)
        }
        Commands::Collect(args) => {
            args.walk.apply(&mut config);
            config.validate()?;
            handle_collect(&args, &config, cli.quiet)
        }
        Commands::Resize(args) => {
            args.walk.apply(&mut config);
            args.raster.apply(&mut config);
            config.validate()?;
            handle_resize(&args, &config, cli.quiet)
        }
        Commands::Pdf(args) => {
            args.walk.apply(&mut config);
            args.layout.apply(&mut config);
            args.raster.apply(&mut config);
            config.validate()?;
            handle_pdf(&args, &config, cli.quiet)
        }
        Commands::Run(args) => {
            args.walk.apply(&mut config);
            args.layout.apply(&mut config);
            args.raster.apply(&mut config);
            if args.permanent {
                config.dedupe.permanent = true;
            }
            config.validate()?;
            handle_run(&args, &config, cli.quiet)
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(ExitCode::Success)
        }
    }
}

fn progress_for(quiet: bool) -> Arc<dyn ProgressCallback> {
    Arc::new(Progress::new(quiet))
}

fn require_dir(path: &Path) -> Result<(), PipelineError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(PipelineError::InputMissing(path.to_path_buf()))
    }
}

fn exit_code_for(partial: bool) -> ExitCode {
    if partial {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    }
}

fn handle_dedupe(args: &DedupeArgs, config: &Config, quiet: bool) -> anyhow::Result<ExitCode> {
    require_dir(&args.path)?;
    let json = args.output == OutputFormat::Json;
    let progress = progress_for(quiet || json);

    let resolver = DuplicateResolver::new(
        ResolverConfig::default()
            .with_walker(config.walker_config())
            .with_io_threads(config.scan.io_threads)
            .with_progress_callback(Arc::clone(&progress)),
    );
    let (resolution, scan) = resolver.scan(&args.path).map_err(PipelineError::from)?;
    if scan.total_files == 0 {
        return Err(PipelineError::NoImages(args.path.clone()).into());
    }

    let delete = DeleteConfig {
        permanent: args.permanent || config.dedupe.permanent,
        ..config.delete_config(args.dry_run)
    };
    let deleted = apply_resolution(&resolution, &delete, Some(&progress));

    let code = exit_code_for(!scan.errors.is_empty() || !deleted.failures.is_empty());
    if json {
        let report = JsonDedupeReport::new(&resolution, &scan, &deleted, args.dry_run, code);
        write_json(&report, &mut io::stdout().lock(), true)?;
    } else if !quiet {
        print!("{}", text::dedupe_report(&resolution, &scan, &deleted, args.dry_run));
    }
    Ok(code)
}

fn handle_collect(args: &CollectArgs, config: &Config, quiet: bool) -> anyhow::Result<ExitCode> {
    require_dir(&args.path)?;
    let progress = progress_for(quiet);

    let result = actions::collect_images(
        &args.path,
        &args.destination,
        &config.walker_config(),
        Some(&progress),
    )
    .map_err(PipelineError::from)?;
    if result.copied_count() + result.skipped_count() + result.failure_count() == 0 {
        return Err(PipelineError::NoImages(args.path.clone()).into());
    }

    if !quiet {
        print!("{}", text::collect_report(&result, &args.destination));
    }
    Ok(exit_code_for(result.failure_count() > 0))
}

fn handle_resize(args: &ResizeArgs, config: &Config, quiet: bool) -> anyhow::Result<ExitCode> {
    require_dir(&args.path)?;
    let progress = progress_for(quiet);

    let outcome = scanner::collect_images(&args.path, &config.walker_config())
        .map_err(PipelineError::from)?;
    if outcome.files.is_empty() {
        return Err(PipelineError::NoImages(args.path.clone()).into());
    }

    let mut result = standardize_batch(
        &outcome.paths(),
        args.output_dir.as_deref(),
        &config.raster,
        config.scan.io_threads,
        Some(&progress),
    );
    result.failures.extend(
        outcome
            .errors
            .iter()
            .map(|e| (e.path().to_path_buf(), e.to_string())),
    );

    if !quiet {
        print!(
            "{}",
            text::resize_report(&result, config.raster.width_px, config.raster.height_px)
        );
    }
    Ok(exit_code_for(!result.all_succeeded()))
}

fn handle_pdf(args: &PdfArgs, config: &Config, quiet: bool) -> anyhow::Result<ExitCode> {
    require_dir(&args.path)?;
    let progress = progress_for(quiet);
    let started = std::time::Instant::now();

    let outcome = scanner::collect_images(&args.path, &config.walker_config())
        .map_err(PipelineError::from)?;
    if outcome.files.is_empty() {
        return Err(PipelineError::NoImages(args.path.clone()).into());
    }

    let prepared = prepare_cards(
        &outcome.paths(),
        &config.raster,
        config.card,
        config.scan.io_threads,
        Some(&progress),
    );

    let mut summary = RunSummary {
        work_dir: args.path.clone(),
        output: ensure_pdf_extension(&args.output_pdf),
        decode: StageCounts {
            processed: prepared.cards.len(),
            skipped: 0,
            failed: prepared.failures.len(),
        },
        ..RunSummary::default()
    };
    let scan_failures = outcome
        .errors
        .iter()
        .map(|e| ("scan", e.path().to_path_buf(), e.to_string()));
    let decode_failures = prepared
        .failures
        .iter()
        .map(|(path, message)| ("decode", path.clone(), message.clone()));
    summary.failures = scan_failures
        .chain(decode_failures)
        .map(|(stage, path, message)| FileFailure {
            stage,
            path,
            message,
        })
        .collect();

    let plan = Compositor::new(config.layout_settings())
        .with_progress(Arc::clone(&progress))
        .compose(&prepared.cards, &mut PdfRenderer::new(), &summary.output)
        .map_err(PipelineError::from)?;
    summary.pages = plan.page_count;
    summary.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if !quiet {
        print!("{}", text::run_report(&summary));
    }
    Ok(exit_code_for(summary.has_failures()))
}

fn handle_run(args: &RunArgs, config: &Config, quiet: bool) -> anyhow::Result<ExitCode> {
    let json = args.output == OutputFormat::Json;

    let options = PipelineOptions {
        walker: config.walker_config(),
        output_root: args
            .output_root
            .clone()
            .or_else(|| config.output_root.clone()),
        skip_dedupe: args.skip_dedupe || !config.dedupe.enabled,
        delete: config.delete_config(args.dry_run),
        skip_resize: args.skip_resize,
        raster: config.raster,
        layout: config.layout_settings(),
        io_threads: config.scan.io_threads,
        progress: Some(progress_for(quiet || json)),
    };
    let summary = Pipeline::new(options).run(&args.path, &args.output_pdf)?;

    let code = exit_code_for(summary.has_failures());
    if json {
        let mut stdout = io::stdout().lock();
        write_json(&JsonRunReport::new(&summary, code), &mut stdout, true)?;
        stdout.flush()?;
    } else if !quiet {
        print!("{}", text::run_report(&summary));
    }
    Ok(code)
}
