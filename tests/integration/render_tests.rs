use cardpress::imaging::{prepare_card, CardImage, RasterSpec};
use cardpress::layout::{
    layout, CardSize, GridSpec, LayoutError, LayoutPolicy, LayoutSettings, PageSize,
};
use cardpress::render::{render, Compositor, CompositorState, PdfRenderer, RenderError};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn cards(dir: &Path, count: usize) -> Vec<CardImage> {
    let spec = RasterSpec::new(30, 42);
    (0..count)
        .map(|i| {
            let path = dir.join(format!("card_{i}.png"));
            let shade = (i * 20 % 255) as u8;
            RgbImage::from_pixel(25, 35, Rgb([shade, 100, 200]))
                .save(&path)
                .unwrap();
            prepare_card(&path, &spec, CardSize::default()).unwrap()
        })
        .collect()
}

fn page_count(path: &Path) -> usize {
    lopdf::Document::load(path).unwrap().get_pages().len()
}

#[test]
fn test_prepare_card_standardizes_pixels() {
    let dir = tempdir().unwrap();
    let card = cards(dir.path(), 1).remove(0);

    assert_eq!((card.pixel_width, card.pixel_height), (30, 42));
    assert_eq!((card.width_mm, card.height_mm), (63.0, 88.0));
    // JPEG SOI marker
    assert_eq!(&card.jpeg[..2], &[0xFF, 0xD8]);
}

#[test]
fn test_transparent_card_is_flattened() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clear.png");
    RgbaImage::from_pixel(10, 14, Rgba([0, 0, 0, 0]))
        .save(&path)
        .unwrap();

    let card = prepare_card(&path, &RasterSpec::new(10, 14), CardSize::default()).unwrap();
    let decoded = image::load_from_memory(&card.jpeg).unwrap().to_rgb8();

    // Fully transparent pixels come out white, not black.
    assert!(decoded.pixels().all(|p| p.0.iter().all(|&c| c > 240)));
}

#[test]
fn test_undecodable_card_is_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.png");
    fs::write(&path, b"not an image").unwrap();

    assert!(prepare_card(&path, &RasterSpec::default(), CardSize::default()).is_err());
}

#[test]
fn test_compose_grid_pages() {
    let dir = tempdir().unwrap();
    let images = cards(dir.path(), 11);
    let output = dir.path().join("deck.pdf");

    let mut compositor = Compositor::new(LayoutSettings::default());
    let plan = compositor
        .compose(&images, &mut PdfRenderer::new(), &output)
        .unwrap();

    assert_eq!(plan.page_count, 2);
    assert_eq!(compositor.state(), CompositorState::Finalized);
    assert!(fs::read(&output).unwrap().starts_with(b"%PDF-"));
    assert_eq!(page_count(&output), 2);
}

#[test]
fn test_single_layout_one_page_per_card() {
    let dir = tempdir().unwrap();
    let images = cards(dir.path(), 3);
    let output = dir.path().join("single.pdf");
    let settings = LayoutSettings::new(
        LayoutPolicy::Single,
        CardSize::default(),
        PageSize::default(),
    );

    Compositor::new(settings)
        .compose(&images, &mut PdfRenderer::new(), &output)
        .unwrap();

    assert_eq!(page_count(&output), 3);
}

#[test]
fn test_pages_carry_media_box_in_points() {
    let dir = tempdir().unwrap();
    let images = cards(dir.path(), 1);
    let output = dir.path().join("a4.pdf");

    Compositor::new(LayoutSettings::default())
        .compose(&images, &mut PdfRenderer::new(), &output)
        .unwrap();

    let doc = lopdf::Document::load(&output).unwrap();
    let page_id = *doc.get_pages().values().next().unwrap();
    let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
    let width = media_box[2].as_float().unwrap();
    let height = media_box[3].as_float().unwrap();

    assert!((width - 595.28).abs() < 0.1);
    assert!((height - 841.89).abs() < 0.1);
}

#[test]
fn test_output_is_created_in_missing_directory() {
    let dir = tempdir().unwrap();
    let images = cards(dir.path(), 2);
    let output = dir.path().join("out/nested/deck.pdf");

    Compositor::new(LayoutSettings::default())
        .compose(&images, &mut PdfRenderer::new(), &output)
        .unwrap();

    assert!(output.is_file());
}

#[test]
fn test_empty_input_writes_nothing() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("empty.pdf");

    let mut compositor = Compositor::new(LayoutSettings::default());
    let err = compositor
        .compose(&[], &mut PdfRenderer::new(), &output)
        .unwrap_err();

    assert!(matches!(err, RenderError::Layout(LayoutError::EmptyInput)));
    assert_eq!(compositor.state(), CompositorState::Failed);
    assert!(!output.exists());
}

#[test]
fn test_unwritable_output_leaves_no_file() {
    let dir = tempdir().unwrap();
    let images = cards(dir.path(), 1);
    let out_dir = dir.path().join("out");
    let output = out_dir.join("deck.pdf");
    fs::create_dir_all(&output).unwrap();

    let mut compositor = Compositor::new(LayoutSettings::default());
    let err = compositor
        .compose(&images, &mut PdfRenderer::new(), &output)
        .unwrap_err();

    assert!(matches!(err, RenderError::Write { .. }));
    assert_eq!(compositor.state(), CompositorState::Failed);
    assert!(output.is_dir());
    assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 1);
}

#[test]
fn test_compositor_runs_once() {
    let dir = tempdir().unwrap();
    let images = cards(dir.path(), 1);
    let output = dir.path().join("deck.pdf");

    let mut compositor = Compositor::new(LayoutSettings::default());
    compositor
        .compose(&images, &mut PdfRenderer::new(), &output)
        .unwrap();
    let again = compositor.compose(&images, &mut PdfRenderer::new(), &output);

    assert!(matches!(again, Err(RenderError::InvalidState(_))));
}

#[test]
fn test_render_rejects_mismatched_plan() {
    let dir = tempdir().unwrap();
    let images = cards(dir.path(), 2);
    let settings = LayoutSettings::new(
        LayoutPolicy::Grid(GridSpec::default()),
        CardSize::default(),
        PageSize::default(),
    );
    let plan = layout(3, &settings).unwrap();

    let err = render(
        &plan,
        &images,
        &mut PdfRenderer::new(),
        &dir.path().join("x.pdf"),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        RenderError::PlanMismatch {
            planned: 3,
            images: 2
        }
    ));
}
