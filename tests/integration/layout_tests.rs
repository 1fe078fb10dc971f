use cardpress::layout::{
    layout, CardSize, GridSpec, LayoutError, LayoutPolicy, LayoutSettings, Orientation,
    PageFormat, PageSize,
};

fn grid(columns: u32, rows: u32, capacity: u32) -> GridSpec {
    GridSpec {
        columns,
        rows,
        capacity,
        ..GridSpec::default()
    }
}

#[test]
fn test_default_grid_nine_up() {
    let plan = layout(9, &LayoutSettings::default()).unwrap();

    assert_eq!(plan.page_count, 1);
    assert_eq!(plan.page_size, PageSize::new(210.0, 297.0));

    // Row-major from the top-left offset.
    let first = plan.placements[0];
    assert_eq!((first.x_mm, first.y_mm), (10.0, 10.0));
    let second = plan.placements[1];
    assert_eq!((second.x_mm, second.y_mm), (73.0, 10.0));
    let fourth = plan.placements[3];
    assert_eq!((fourth.x_mm, fourth.y_mm), (10.0, 98.0));
    let last = plan.placements[8];
    assert_eq!((last.x_mm, last.y_mm), (136.0, 186.0));
}

#[test]
fn test_partial_last_page() {
    let plan = layout(20, &LayoutSettings::default()).unwrap();

    assert_eq!(plan.page_count, 3);
    let sizes: Vec<usize> = plan.pages().map(<[_]>::len).collect();
    assert_eq!(sizes, vec![9, 9, 2]);

    // The second page restarts at the first cell.
    assert_eq!(plan.placements[9].page_index, 1);
    assert_eq!(plan.placements[9].x_mm, plan.placements[0].x_mm);
    assert_eq!(plan.placements[9].y_mm, plan.placements[0].y_mm);
}

#[test]
fn test_capacity_below_grid_size() {
    let settings = LayoutSettings::new(
        LayoutPolicy::Grid(grid(3, 3, 8)),
        CardSize::default(),
        PageSize::default(),
    );
    let plan = layout(9, &settings).unwrap();

    assert_eq!(plan.page_count, 2);
    assert_eq!(plan.placements[8].page_index, 1);
    assert_eq!(plan.placements[7].page_index, 0);
}

#[test]
fn test_gaps_shift_cells() {
    let settings = LayoutSettings::new(
        LayoutPolicy::Grid(GridSpec {
            gap_x: 2.0,
            gap_y: 3.0,
            ..GridSpec::default()
        }),
        CardSize::default(),
        PageSize::default(),
    );
    let plan = layout(5, &settings).unwrap();

    assert_eq!(plan.placements[1].x_mm, 10.0 + 63.0 + 2.0);
    assert_eq!(plan.placements[4].y_mm, 10.0 + 88.0 + 3.0);
}

#[test]
fn test_single_centers_one_card_per_page() {
    let settings = LayoutSettings::new(
        LayoutPolicy::Single,
        CardSize::new(63.0, 88.0),
        PageSize::from_format(PageFormat::A4, Orientation::Portrait),
    );
    let plan = layout(3, &settings).unwrap();

    assert_eq!(plan.page_count, 3);
    for (i, placement) in plan.placements.iter().enumerate() {
        assert_eq!(placement.page_index, i);
        assert_eq!(placement.x_mm, (210.0 - 63.0) / 2.0);
        assert_eq!(placement.y_mm, (297.0 - 88.0) / 2.0);
    }
}

#[test]
fn test_landscape_page() {
    let settings = LayoutSettings::new(
        LayoutPolicy::Grid(grid(4, 2, 8)),
        CardSize::default(),
        PageSize::from_format(PageFormat::A4, Orientation::Landscape),
    );
    let plan = layout(8, &settings).unwrap();

    assert_eq!(plan.page_count, 1);
    assert_eq!(plan.page_size.width_mm, 297.0);
    assert_eq!(plan.placements[3].x_mm, 10.0 + 3.0 * 63.0);
    assert_eq!(plan.placements[4].y_mm, 10.0 + 88.0);
}

#[test]
fn test_empty_input_is_error() {
    assert_eq!(
        layout(0, &LayoutSettings::default()),
        Err(LayoutError::EmptyInput)
    );
}

#[test]
fn test_invalid_grid_is_error() {
    let settings = LayoutSettings::new(
        LayoutPolicy::Grid(grid(3, 3, 10)),
        CardSize::default(),
        PageSize::default(),
    );
    assert!(matches!(
        layout(1, &settings),
        Err(LayoutError::InvalidGrid(_))
    ));

    let settings = LayoutSettings::new(
        LayoutPolicy::Grid(grid(0, 3, 3)),
        CardSize::default(),
        PageSize::default(),
    );
    assert!(layout(1, &settings).is_err());
}

#[test]
fn test_invalid_card_is_error() {
    let settings = LayoutSettings::new(
        LayoutPolicy::Single,
        CardSize::new(-1.0, 88.0),
        PageSize::default(),
    );
    assert!(matches!(
        layout(1, &settings),
        Err(LayoutError::InvalidCard(_))
    ));
}

#[test]
fn test_oversized_grid_is_still_planned() {
    let settings = LayoutSettings::new(
        LayoutPolicy::Grid(grid(5, 5, 25)),
        CardSize::default(),
        PageSize::default(),
    );
    let plan = layout(25, &settings).unwrap();
    assert_eq!(plan.page_count, 1);
    assert!(!settings.policy.fits(settings.card, settings.page));
}

#[test]
fn test_layout_is_deterministic() {
    let settings = LayoutSettings::default();
    assert_eq!(layout(17, &settings), layout(17, &settings));
}
