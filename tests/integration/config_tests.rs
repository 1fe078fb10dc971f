use cardpress::config::{Config, ConfigError};
use cardpress::layout::{LayoutKind, Orientation, PageFormat, PageSize};
use figment::providers::{Format, Serialized, Toml};
use figment::{Figment, Jail};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_load_explicit_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cardpress.toml");
    fs::write(
        &path,
        r#"
output_root = "/tmp/cards"

[scan]
recursive = false
io_threads = 2

[dedupe]
permanent = true

[card]
width_mm = 59.0
height_mm = 86.0

[raster]
width_px = 600
"#,
    )
    .unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&path));
    let config = Config::from_figment(&figment).unwrap();

    assert!(!config.scan.recursive);
    assert_eq!(config.scan.io_threads, 2);
    assert!(config.dedupe.permanent);
    assert!(config.delete_config(false).permanent);
    assert_eq!(config.card.width_mm, 59.0);
    assert_eq!(config.raster.width_px, 600);
    assert_eq!(config.raster.height_px, 1050);
    assert_eq!(
        config.output_root.as_deref(),
        Some(std::path::Path::new("/tmp/cards"))
    );
}

#[test]
fn test_env_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "cardpress.toml",
            r#"
[page]
format = "a3"

[layout.grid]
columns = 2
rows = 2
capacity = 4
"#,
        )?;
        jail.set_env("CARDPRESS_PAGE__ORIENTATION", "landscape");
        jail.set_env("CARDPRESS_LAYOUT__GRID__CAPACITY", "3");

        let config = Config::load(Some(std::path::Path::new("cardpress.toml")))
            .map_err(|e| e.to_string())?;

        assert_eq!(config.page.format, PageFormat::A3);
        assert_eq!(config.page.orientation, Orientation::Landscape);
        assert_eq!(config.page_size(), PageSize::new(420.0, 297.0));
        assert_eq!(config.layout.grid.capacity, 3);
        assert_eq!(config.layout_settings().policy.per_page(), 3);
        Ok(())
    });
}

#[test]
fn test_invalid_values_are_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "bad.toml",
            r#"
[layout]
policy = "grid"

[layout.grid]
columns = 2
rows = 2
capacity = 5
"#,
        )?;
        let result = Config::load(Some(std::path::Path::new("bad.toml")));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
        Ok(())
    });
}

#[test]
fn test_malformed_file_is_parse_error() {
    Jail::expect_with(|jail| {
        jail.create_file("broken.toml", "[page]\nformat = \"tabloid\"\n")?;
        let result = Config::load(Some(std::path::Path::new("broken.toml")));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
        Ok(())
    });
}

#[test]
fn test_single_policy_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("c.toml");
    fs::write(&path, "[layout]\npolicy = \"single\"\n").unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&path));
    let config = Config::from_figment(&figment).unwrap();

    assert_eq!(config.layout.policy, LayoutKind::Single);
    assert_eq!(config.layout_settings().policy.per_page(), 1);
}

#[test]
fn test_printed_config_parses_back() {
    let text = Config::default().to_toml().unwrap();
    let parsed: Config = toml::from_str(&text).unwrap();
    assert_eq!(parsed, Config::default());
}
