use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use vidset_clean::{CleanupEngine, MemoryFileSystem, RealFileSystem};
use vidset_core::{CleanupConfig, RetentionPolicy, ScanError, ScanResult};

fn engine_over(fs: MemoryFileSystem, policy: RetentionPolicy) -> CleanupEngine<MemoryFileSystem> {
    let config = CleanupConfig::builder()
        .root("root")
        .policy(policy)
        .build()
        .unwrap();
    CleanupEngine::new(fs, config)
}

fn paths(records: &[vidset_core::FileRecord]) -> BTreeSet<PathBuf> {
    records.iter().map(|record| record.path.clone()).collect()
}

#[test]
fn test_scan_partitions_all_files() {
    let fs = MemoryFileSystem::with_files([
        ("root/a.mp4", 500u64),
        ("root/b.txt", 10),
        ("root/sub/c.mp4", 700),
        ("root/sub/d.jpg", 40),
    ]);
    let engine = engine_over(fs, RetentionPolicy::new([".mp4"]));

    let scan = engine.scan().unwrap();
    let keep = paths(&scan.to_keep);
    let remove = paths(&scan.to_remove);

    assert_eq!(
        keep,
        BTreeSet::from([PathBuf::from("root/a.mp4"), PathBuf::from("root/sub/c.mp4")])
    );
    assert_eq!(
        remove,
        BTreeSet::from([PathBuf::from("root/b.txt"), PathBuf::from("root/sub/d.jpg")])
    );
    assert!(keep.is_disjoint(&remove));
    assert_eq!(keep.len() + remove.len(), 4);
}

#[test]
fn test_scan_is_idempotent_as_sets() {
    let fs = MemoryFileSystem::with_files([
        ("root/a.mp4", 1u64),
        ("root/b.txt", 2),
        ("root/deep/nested/c.webm", 3),
    ]);
    let engine = engine_over(fs, RetentionPolicy::new([".mp4", ".webm"]));

    let first = engine.scan().unwrap();
    let second = engine.scan().unwrap();
    assert_eq!(paths(&first.to_keep), paths(&second.to_keep));
    assert_eq!(paths(&first.to_remove), paths(&second.to_remove));
}

#[test]
fn test_scan_missing_root_is_explicit_error() {
    let engine = engine_over(MemoryFileSystem::new(), RetentionPolicy::default());
    assert!(matches!(engine.scan(), Err(ScanError::RootNotFound { .. })));
}

#[test]
fn test_scan_empty_root_is_empty_result_not_error() {
    let fs = MemoryFileSystem::new();
    fs.add_dir("root");
    let engine = engine_over(fs, RetentionPolicy::default());

    let scan = engine.scan().unwrap();
    assert!(scan.to_keep.is_empty());
    assert!(scan.to_remove.is_empty());
}

#[test]
fn test_files_without_extension_are_removed_by_default() {
    let fs = MemoryFileSystem::with_files([("root/README", 5u64), ("root/a.mp4", 6)]);
    let engine = engine_over(fs, RetentionPolicy::new([".mp4"]));

    let scan = engine.scan().unwrap();
    assert_eq!(paths(&scan.to_remove), BTreeSet::from([PathBuf::from("root/README")]));
}

#[test]
fn test_empty_extension_token_in_policy_keeps_extensionless() {
    let fs = MemoryFileSystem::with_files([("root/README", 5u64), ("root/a.mp4", 6)]);
    let engine = engine_over(fs, RetentionPolicy::new(["", ".mp4"]));

    let scan = engine.scan().unwrap();
    assert!(scan.to_remove.is_empty());
    assert_eq!(scan.to_keep.len(), 2);
}

#[test]
fn test_empty_policy_removes_everything_without_crashing() {
    let fs = MemoryFileSystem::with_files([("root/a.mp4", 1u64), ("root/b.txt", 2)]);
    let engine = engine_over(fs, RetentionPolicy::empty());

    let scan = engine.scan().unwrap();
    assert!(scan.to_keep.is_empty());
    assert_eq!(scan.to_remove.len(), 2);
}

#[test]
fn test_execute_preserves_every_keep_file() {
    let fs = MemoryFileSystem::with_files([
        ("root/a.mp4", 500u64),
        ("root/b.txt", 10),
        ("root/sub/c.mp4", 700),
        ("root/sub/d.jpg", 40),
    ]);
    let engine = engine_over(fs, RetentionPolicy::new([".mp4"]));

    let scan = engine.scan().unwrap();
    let outcome = engine.execute(&scan, true);

    assert_eq!(outcome.removed, 2);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.removed + outcome.failed, scan.remove_count());
    assert_eq!(outcome.kept_remaining, 2);

    let fs = engine.into_fs();
    assert!(fs.contains_file("root/a.mp4"));
    assert!(fs.contains_file("root/sub/c.mp4"));
    assert!(!fs.contains_file("root/b.txt"));
    assert!(!fs.contains_file("root/sub/d.jpg"));
    // sub still holds c.mp4, so it is not pruned.
    assert!(fs.contains_dir("root/sub"));
    assert_eq!(outcome.pruned_dirs, 0);
}

#[test]
fn test_execute_empty_remove_set_is_zero_outcome() {
    let fs = MemoryFileSystem::with_files([("root/a.mp4", 1u64)]);
    let engine = engine_over(fs, RetentionPolicy::new([".mp4"]));

    let scan = engine.scan().unwrap();
    assert!(scan.to_remove.is_empty());

    // confirmed=false must not matter: confirmation is skipped entirely.
    let outcome = engine.execute(&scan, false);
    assert_eq!(outcome.removed, 0);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.pruned_dirs, 0);
}

#[test]
fn test_declined_confirmation_leaves_tree_unchanged() {
    let fs = MemoryFileSystem::with_files([("root/a.mp4", 1u64), ("root/b.txt", 2)]);
    let engine = engine_over(fs, RetentionPolicy::new([".mp4"]));

    let scan = engine.scan().unwrap();
    let outcome = engine.execute(&scan, false);

    assert_eq!(outcome.removed, 0);
    assert_eq!(outcome.failed, 0);
    let fs = engine.into_fs();
    assert_eq!(fs.file_count(), 2);
}

#[test]
fn test_preview_does_not_mutate() {
    let fs = MemoryFileSystem::with_files([("root/a.txt", 1u64), ("root/b.txt", 2)]);
    let engine = engine_over(fs, RetentionPolicy::new([".mp4"]));

    let scan = engine.scan().unwrap();
    let preview = scan.preview(1);
    assert_eq!(preview.paths.len(), 1);
    assert_eq!(preview.remaining, 1);

    assert_eq!(engine.into_fs().file_count(), 2);
}

#[test]
fn test_pruning_removes_emptied_dirs_but_not_root() {
    let fs = MemoryFileSystem::with_files([("root/sub/inner/onlyfile.txt", 9u64)]);
    let engine = engine_over(fs, RetentionPolicy::new([".mp4"]));

    let scan = engine.scan().unwrap();
    let outcome = engine.execute(&scan, true);

    assert_eq!(outcome.removed, 1);
    // inner empties first, which empties sub in the same pass.
    assert_eq!(outcome.pruned_dirs, 2);
    let fs = engine.into_fs();
    assert!(!fs.contains_dir("root/sub/inner"));
    assert!(!fs.contains_dir("root/sub"));
    assert!(fs.contains_dir("root"));
}

#[test]
fn test_removal_failure_is_counted_not_fatal() {
    let fs = MemoryFileSystem::with_files([
        ("root/a.txt", 1u64),
        ("root/b.txt", 2),
        ("root/c.txt", 3),
    ]);
    fs.fail_removal_of("root/b.txt");
    let engine = engine_over(fs, RetentionPolicy::new([".mp4"]));

    let scan = engine.scan().unwrap();
    let outcome = engine.execute(&scan, true);

    assert_eq!(outcome.removed, 2);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.removed + outcome.failed, scan.remove_count());
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].path, PathBuf::from("root/b.txt"));
    assert!(engine.into_fs().contains_file("root/b.txt"));
}

#[test]
fn test_prune_failure_is_counted_not_fatal() {
    let fs = MemoryFileSystem::with_files([("root/sub/a.txt", 1u64)]);
    fs.fail_prune_of("root/sub");
    let engine = engine_over(fs, RetentionPolicy::new([".mp4"]));

    let scan = engine.scan().unwrap();
    let outcome = engine.execute(&scan, true);

    assert_eq!(outcome.removed, 1);
    assert_eq!(outcome.pruned_dirs, 0);
    assert_eq!(outcome.prune_failures, 1);
}

#[test]
fn test_progress_fires_per_removal_attempt() {
    let fs = MemoryFileSystem::with_files([
        ("root/a.txt", 1u64),
        ("root/b.txt", 2),
        ("root/c.txt", 3),
    ]);
    let engine = engine_over(fs, RetentionPolicy::new([".mp4"]));

    let scan = engine.scan().unwrap();
    let mut seen = Vec::new();
    engine.execute_with_progress(&scan, true, |progress| {
        seen.push((progress.completed, progress.total));
    });
    assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
}

#[test]
fn test_real_fs_worked_example() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::write(root.join("a.mp4"), b"video").unwrap();
    std::fs::write(root.join("b.txt"), b"notes").unwrap();
    std::fs::create_dir(root.join("sub")).unwrap();
    std::fs::write(root.join("sub/c.mp4"), b"video").unwrap();
    std::fs::write(root.join("sub/d.jpg"), b"image").unwrap();

    let config = CleanupConfig::builder()
        .root(root)
        .policy(RetentionPolicy::new([".mp4"]))
        .build()
        .unwrap();
    let engine = CleanupEngine::new(RealFileSystem::new(), config);

    let scan = engine.scan().unwrap();
    assert_eq!(scan.keep_count(), 2);
    assert_eq!(scan.remove_count(), 2);

    let outcome = engine.execute(&scan, true);
    assert_eq!(outcome.removed, 2);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.kept_remaining, 2);

    assert!(root.join("a.mp4").exists());
    assert!(root.join("sub/c.mp4").exists());
    assert!(!root.join("b.txt").exists());
    assert!(!root.join("sub/d.jpg").exists());
    // sub survives because c.mp4 remains.
    assert!(root.join("sub").is_dir());
}

#[test]
fn test_real_fs_prunes_down_to_root() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("sub/inner")).unwrap();
    std::fs::write(root.join("sub/inner/onlyfile.txt"), b"x").unwrap();

    let config = CleanupConfig::builder()
        .root(root)
        .policy(RetentionPolicy::new([".mp4"]))
        .build()
        .unwrap();
    let engine = CleanupEngine::new(RealFileSystem::new(), config);

    let scan = engine.scan().unwrap();
    let outcome = engine.execute(&scan, true);

    assert_eq!(outcome.removed, 1);
    assert_eq!(outcome.pruned_dirs, 2);
    assert!(!root.join("sub").exists());
    assert!(root.is_dir());
}

#[test]
fn test_real_fs_missing_root() {
    let config = CleanupConfig::builder()
        .root("/definitely/not/a/real/path")
        .build()
        .unwrap();
    let engine = CleanupEngine::new(RealFileSystem::new(), config);
    assert!(matches!(engine.scan(), Err(ScanError::RootNotFound { .. })));
}

#[test]
fn test_outcome_counts_match_snapshot_even_if_file_already_gone() {
    // Simulate a file vanishing between scan and execute: the stale
    // snapshot entry counts as a failure, not a crash.
    let fs = MemoryFileSystem::with_files([("root/a.txt", 1u64), ("root/b.txt", 2)]);
    let engine = engine_over(fs, RetentionPolicy::new([".mp4"]));

    let scan = engine.scan().unwrap();
    let stale = ScanResult {
        to_keep: scan.to_keep.clone(),
        to_remove: {
            let mut records = scan.to_remove.clone();
            records.push(vidset_core::FileRecord::new("root/vanished.txt", 0, ".txt"));
            records
        },
    };

    let outcome = engine.execute(&stale, true);
    assert_eq!(outcome.removed, 2);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.removed + outcome.failed, stale.remove_count());
}

#[test]
fn test_engine_config_accessor() {
    let engine = engine_over(MemoryFileSystem::new(), RetentionPolicy::default());
    assert_eq!(engine.config().root, Path::new("root"));
}
