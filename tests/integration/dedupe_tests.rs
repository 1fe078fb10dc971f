use cardpress::actions::delete::{apply_resolution, DeleteConfig};
use cardpress::duplicates::{
    build_candidates, resolve, DuplicateResolver, ResolverConfig, SeenRegistry,
};
use cardpress::scanner::{Hasher, WalkerConfig};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let resolver = DuplicateResolver::with_defaults();

    let (resolution, summary) = resolver.scan(dir.path()).unwrap();

    assert!(resolution.kept.is_empty());
    assert!(resolution.is_clean());
    assert_eq!(summary.total_files, 0);
}

#[test]
fn test_same_stem_same_content_is_duplicate() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bolt_1.png"), b"bolt scan").unwrap();
    fs::write(dir.path().join("bolt_2.png"), b"bolt scan").unwrap();
    fs::write(dir.path().join("shock.png"), b"shock scan").unwrap();

    let (resolution, summary) = DuplicateResolver::with_defaults()
        .scan(dir.path())
        .unwrap();

    assert_eq!(
        resolution.kept,
        vec![dir.path().join("bolt_1.png"), dir.path().join("shock.png")]
    );
    assert_eq!(resolution.removed.len(), 1);
    assert_eq!(resolution.removed[0].path, dir.path().join("bolt_2.png"));
    assert_eq!(resolution.removed[0].original, dir.path().join("bolt_1.png"));
    assert_eq!(summary.removed, 1);
    assert_eq!(summary.reclaimable_bytes, 9);
}

#[test]
fn test_same_content_different_name_is_kept() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bolt.png"), b"identical").unwrap();
    fs::write(dir.path().join("shock.png"), b"identical").unwrap();

    let (resolution, _) = DuplicateResolver::with_defaults()
        .scan(dir.path())
        .unwrap();

    assert_eq!(resolution.kept.len(), 2);
    assert!(resolution.is_clean());
}

#[test]
fn test_same_name_different_content_is_kept() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bolt_1.png"), b"alpha art").unwrap();
    fs::write(dir.path().join("bolt_2.png"), b"beta art").unwrap();

    let (resolution, _) = DuplicateResolver::with_defaults()
        .scan(dir.path())
        .unwrap();

    assert_eq!(resolution.kept.len(), 2);
    assert!(resolution.is_clean());
}

#[test]
fn test_numeric_only_names_share_a_class() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("0001.jpg"), b"scan").unwrap();
    fs::write(dir.path().join("0002.jpg"), b"scan").unwrap();

    let (resolution, _) = DuplicateResolver::with_defaults()
        .scan(dir.path())
        .unwrap();

    assert_eq!(resolution.kept, vec![dir.path().join("0001.jpg")]);
    assert_eq!(resolution.removed[0].path, dir.path().join("0002.jpg"));
}

#[test]
fn test_extension_does_not_matter() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bolt.png"), b"same bytes").unwrap();
    fs::write(dir.path().join("bolt.jpg"), b"same bytes").unwrap();

    let (resolution, _) = DuplicateResolver::with_defaults()
        .scan(dir.path())
        .unwrap();

    // "bolt.jpg" sorts first
    assert_eq!(resolution.kept, vec![dir.path().join("bolt.jpg")]);
    assert_eq!(resolution.removed[0].path, dir.path().join("bolt.png"));
}

#[test]
fn test_first_seen_across_subdirectories() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    fs::create_dir_all(dir.path().join("b")).unwrap();
    fs::write(dir.path().join("a/bolt.png"), b"art").unwrap();
    fs::write(dir.path().join("b/bolt.png"), b"art").unwrap();

    let (resolution, _) = DuplicateResolver::with_defaults()
        .scan(dir.path())
        .unwrap();

    assert_eq!(resolution.kept, vec![dir.path().join("a/bolt.png")]);
    assert_eq!(resolution.removed[0].original, dir.path().join("a/bolt.png"));
}

#[test]
fn test_non_recursive_ignores_subdirectories() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("bolt.png"), b"art").unwrap();
    fs::write(dir.path().join("nested/bolt.png"), b"art").unwrap();

    let config = ResolverConfig::default().with_walker(WalkerConfig::flat());
    let (resolution, summary) = DuplicateResolver::new(config).scan(dir.path()).unwrap();

    assert_eq!(summary.total_files, 1);
    assert!(resolution.is_clean());
}

#[test]
fn test_unsupported_files_are_ignored() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bolt.txt"), b"same").unwrap();
    fs::write(dir.path().join("bolt_2.txt"), b"same").unwrap();
    fs::write(dir.path().join("bolt.png"), b"card").unwrap();

    let (resolution, summary) = DuplicateResolver::with_defaults()
        .scan(dir.path())
        .unwrap();

    assert_eq!(summary.total_files, 1);
    assert_eq!(resolution.kept, vec![dir.path().join("bolt.png")]);
}

#[test]
fn test_missing_root_is_error() {
    let result = DuplicateResolver::with_defaults().scan(std::path::Path::new("/nonexistent/cards"));
    assert!(result.is_err());
}

#[test]
fn test_registry_carries_over_between_batches() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("bolt_1.png");
    let second = dir.path().join("bolt_2.png");
    fs::write(&first, b"art").unwrap();
    fs::write(&second, b"art").unwrap();
    let hasher = Hasher::new();

    let batch = build_candidates(vec![first.clone()], &hasher, 1, None);
    let (resolution, registry) = resolve(&batch.candidates, SeenRegistry::new());
    assert_eq!(resolution.kept, vec![first.clone()]);

    let batch = build_candidates(vec![second.clone()], &hasher, 1, None);
    let (resolution, registry) = resolve(&batch.candidates, registry);
    assert!(resolution.kept.is_empty());
    assert_eq!(resolution.removed[0].original, first);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_dry_run_deletes_nothing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bolt_1.png"), b"art").unwrap();
    fs::write(dir.path().join("bolt_2.png"), b"art").unwrap();

    let (resolution, _) = DuplicateResolver::with_defaults()
        .scan(dir.path())
        .unwrap();
    let result = apply_resolution(&resolution, &DeleteConfig::dry_run(), None);

    assert_eq!(result.planned, vec![dir.path().join("bolt_2.png")]);
    assert_eq!(result.success_count(), 0);
    assert!(dir.path().join("bolt_2.png").exists());
}

#[test]
fn test_apply_permanent_removes_only_duplicates() {
    let dir = tempdir().unwrap();
    for name in ["bolt_1.png", "bolt_2.png", "bolt_3.png", "shock.png"] {
        let content: &[u8] = if name == "shock.png" { b"other" } else { b"art" };
        fs::write(dir.path().join(name), content).unwrap();
    }

    let (resolution, _) = DuplicateResolver::with_defaults()
        .scan(dir.path())
        .unwrap();
    let result = apply_resolution(&resolution, &DeleteConfig::permanent(), None);

    assert_eq!(result.success_count(), 2);
    assert_eq!(result.bytes_freed, 6);
    let mut remaining: Vec<PathBuf> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    remaining.sort();
    assert_eq!(
        remaining,
        vec![dir.path().join("bolt_1.png"), dir.path().join("shock.png")]
    );
}

#[test]
fn test_rescan_after_apply_is_clean() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bolt_1.png"), b"art").unwrap();
    fs::write(dir.path().join("bolt_2.png"), b"art").unwrap();
    let resolver = DuplicateResolver::with_defaults();

    let (resolution, _) = resolver.scan(dir.path()).unwrap();
    let _ = apply_resolution(&resolution, &DeleteConfig::permanent(), None);
    let (again, _) = resolver.scan(dir.path()).unwrap();

    assert!(again.is_clean());
    assert_eq!(again.kept, resolution.kept);
}

#[test]
fn test_missing_original_blocks_delete() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bolt_1.png"), b"art").unwrap();
    fs::write(dir.path().join("bolt_2.png"), b"art").unwrap();

    let (resolution, _) = DuplicateResolver::with_defaults()
        .scan(dir.path())
        .unwrap();
    fs::remove_file(dir.path().join("bolt_1.png")).unwrap();
    let result = apply_resolution(&resolution, &DeleteConfig::permanent(), None);

    assert_eq!(result.failure_count(), 1);
    assert!(dir.path().join("bolt_2.png").exists());
}
