use cardpress::actions::delete::DeleteConfig;
use cardpress::cli::Cli;
use cardpress::error::ExitCode;
use cardpress::imaging::RasterSpec;
use cardpress::layout::{CardSize, GridSpec, LayoutPolicy, LayoutSettings, PageSize};
use cardpress::pipeline::{Pipeline, PipelineError, PipelineOptions};
use clap::Parser;
use image::{Rgb, RgbImage};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_card(path: &Path, shade: u8) {
    RgbImage::from_pixel(24, 34, Rgb([shade, 255 - shade, 0]))
        .save(path)
        .unwrap();
}

fn small_options() -> PipelineOptions {
    PipelineOptions {
        delete: DeleteConfig::permanent(),
        raster: RasterSpec::new(12, 17),
        io_threads: 2,
        ..PipelineOptions::default()
    }
}

fn pdf_pages(path: &Path) -> usize {
    lopdf::Document::load(path).unwrap().get_pages().len()
}

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut full = vec!["cardpress", "--quiet"];
    full.extend_from_slice(args);
    cardpress::run_app(Cli::try_parse_from(full).unwrap())
}

#[test]
fn test_pipeline_four_up_pages() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("scans");
    fs::create_dir(&src).unwrap();
    for i in 0..5u8 {
        write_card(&src.join(format!("card_{i}.png")), i * 40);
    }
    let settings = LayoutSettings::new(
        LayoutPolicy::Grid(GridSpec {
            columns: 2,
            rows: 2,
            capacity: 4,
            ..GridSpec::default()
        }),
        CardSize::default(),
        PageSize::default(),
    );

    let summary = Pipeline::new(PipelineOptions {
        layout: settings,
        ..small_options()
    })
    .run(&src, &dir.path().join("deck.pdf"))
    .unwrap();

    assert_eq!(summary.pages, 2);
    assert_eq!(summary.decode.processed, 5);
    assert_eq!(summary.dedupe.unwrap().skipped, 5);
    assert_eq!(pdf_pages(&summary.output), 2);
}

#[test]
fn test_pipeline_collects_then_dedupes_copies() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("scans");
    fs::create_dir_all(src.join("binder")).unwrap();
    write_card(&src.join("bolt_1.png"), 10);
    fs::copy(src.join("bolt_1.png"), src.join("binder/bolt_2.png")).unwrap();
    write_card(&src.join("binder/shock.png"), 90);
    let work = dir.path().join("work");

    let summary = Pipeline::new(PipelineOptions {
        output_root: Some(work.clone()),
        ..small_options()
    })
    .run(&src, &dir.path().join("deck"))
    .unwrap();

    assert_eq!(summary.collect.unwrap().processed, 3);
    assert_eq!(summary.dedupe.unwrap().processed, 1);
    assert_eq!(summary.decode.processed, 2);
    // Originals are untouched; the duplicate is gone from the work folder.
    assert!(src.join("binder/bolt_2.png").exists());
    assert!(!work.join("bolt_2.png").exists());
    assert!(work.join("bolt_1.png").exists());
    assert_eq!(summary.output, dir.path().join("deck.pdf"));
}

#[test]
fn test_pipeline_skip_stages() {
    let dir = tempdir().unwrap();
    write_card(&dir.path().join("bolt_1.png"), 10);
    fs::copy(dir.path().join("bolt_1.png"), dir.path().join("bolt_2.png")).unwrap();

    let summary = Pipeline::new(PipelineOptions {
        skip_dedupe: true,
        skip_resize: true,
        ..small_options()
    })
    .run(dir.path(), &dir.path().join("out/deck.pdf"))
    .unwrap();

    assert!(summary.dedupe.is_none());
    assert!(summary.resize.is_none());
    assert_eq!(summary.decode.processed, 2);
    assert!(dir.path().join("bolt_2.png").exists());
    let on_disk = image::open(dir.path().join("bolt_1.png")).unwrap();
    assert_eq!((on_disk.width(), on_disk.height()), (24, 34));
}

#[test]
fn test_pipeline_empty_folder() {
    let dir = tempdir().unwrap();
    let err = Pipeline::new(small_options())
        .run(dir.path(), &dir.path().join("deck.pdf"))
        .unwrap_err();
    assert!(matches!(err, PipelineError::NoImages(_)));
    assert!(!dir.path().join("deck.pdf").exists());
}

#[test]
fn test_cli_run_json() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("scans");
    fs::create_dir(&src).unwrap();
    write_card(&src.join("a.png"), 1);
    write_card(&src.join("b.png"), 2);
    let output = dir.path().join("deck.pdf");

    let code = run(&[
        "run",
        src.to_str().unwrap(),
        output.to_str().unwrap(),
        "--permanent",
        "--width-px",
        "12",
        "--height-px",
        "17",
        "--layout",
        "single",
        "--output",
        "json",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(pdf_pages(&output), 2);
}

#[test]
fn test_cli_run_dry_run_keeps_duplicates_on_disk() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("scans");
    fs::create_dir(&src).unwrap();
    write_card(&src.join("bolt_1.png"), 1);
    fs::copy(src.join("bolt_1.png"), src.join("bolt_2.png")).unwrap();
    write_card(&src.join("shock.png"), 2);
    let output = dir.path().join("deck.pdf");

    let code = run(&[
        "run",
        src.to_str().unwrap(),
        output.to_str().unwrap(),
        "--dry-run",
        "--skip-resize",
        "--layout",
        "single",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(src.join("bolt_1.png").exists());
    assert!(src.join("bolt_2.png").exists());
    // Only the kept copies are laid out.
    assert_eq!(pdf_pages(&output), 2);
}

#[test]
fn test_cli_pdf_reports_partial_success() {
    let dir = tempdir().unwrap();
    write_card(&dir.path().join("good.png"), 1);
    fs::write(dir.path().join("bad.png"), b"broken").unwrap();
    let output = dir.path().join("out");

    let code = run(&[
        "pdf",
        dir.path().to_str().unwrap(),
        output.to_str().unwrap(),
        "--width-px",
        "12",
        "--height-px",
        "17",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::PartialSuccess);
    assert_eq!(pdf_pages(&dir.path().join("out.pdf")), 1);
    // pdf never touches the sources
    assert!(dir.path().join("bad.png").exists());
}

#[test]
fn test_cli_resize_to_output_dir() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("cards");
    fs::create_dir(&src).unwrap();
    write_card(&src.join("a.png"), 1);
    let resized = dir.path().join("resized");

    let code = run(&[
        "resize",
        src.to_str().unwrap(),
        "--output-dir",
        resized.to_str().unwrap(),
        "--width-px",
        "8",
        "--height-px",
        "11",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    let out = image::open(resized.join("a.png")).unwrap();
    assert_eq!((out.width(), out.height()), (8, 11));
    let original = image::open(src.join("a.png")).unwrap();
    assert_eq!((original.width(), original.height()), (24, 34));
}

#[test]
fn test_cli_collect_and_dedupe() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("scans");
    fs::create_dir_all(src.join("box")).unwrap();
    fs::write(src.join("bolt_1.png"), b"bolt").unwrap();
    fs::write(src.join("box/bolt_2.png"), b"bolt").unwrap();
    let flat = dir.path().join("flat");

    let code = run(&["collect", src.to_str().unwrap(), flat.to_str().unwrap()]).unwrap();
    assert_eq!(code, ExitCode::Success);
    assert!(flat.join("bolt_2.png").exists());

    let code = run(&[
        "dedupe",
        flat.to_str().unwrap(),
        "--permanent",
        "--output",
        "json",
    ])
    .unwrap();
    assert_eq!(code, ExitCode::Success);
    assert!(flat.join("bolt_1.png").exists());
    assert!(!flat.join("bolt_2.png").exists());
}
