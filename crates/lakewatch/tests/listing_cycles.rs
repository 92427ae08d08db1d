//! End-to-end listing cycle behavior
//!
//! Exercises the lister against both the local filesystem adapter and
//! the in-memory store, with the file-backed cursor store in between,
//! the way the binary wires them together.

use lakewatch::config::ListingConfig;
use lakewatch::listing::cursor::{FileCursorStore, MemoryCursorStore};
use lakewatch::listing::orchestrator::Lister;
use lakewatch::record::BufferSink;
use lakewatch::remote::{LocalFs, MemoryFs};
use std::fs;
use std::path::Path;

fn config(root: &str) -> ListingConfig {
    ListingConfig {
        root_path: root.to_string(),
        ..Default::default()
    }
}

fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn local_tree_listed_once_then_quiet() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir.path().join("data/a.csv"), "a");
    write_file(&dir.path().join("data/sub/b.csv"), "bb");

    let remote = LocalFs::new(dir.path());
    let mut lister = Lister::new(&config("/data"), Box::new(MemoryCursorStore::new())).unwrap();

    let mut sink = BufferSink::default();
    let outcome = lister.run_cycle(&remote, &mut sink).unwrap();
    assert_eq!(outcome.stats.files_emitted, 2);

    let names: Vec<&str> = sink
        .records
        .iter()
        .map(|r| r.attributes["filename"].as_str())
        .collect();
    assert!(names.contains(&"a.csv"));
    assert!(names.contains(&"b.csv"));

    let sub = sink
        .records
        .iter()
        .find(|r| r.attributes["filename"] == "b.csv")
        .unwrap();
    assert_eq!(sub.attributes["path"], "/sub");
    assert_eq!(sub.attributes["relativePath"], "/sub");
    assert_eq!(sub.attributes["absolute.path"], "/data/sub");
    assert_eq!(sub.attributes["file.length"], "2");

    let outcome = lister.run_cycle(&remote, &mut sink).unwrap();
    assert_eq!(outcome.stats.files_emitted, 0);
    assert_eq!(sink.records.len(), 2);
}

#[test]
fn cursor_survives_process_restart() {
    let fs = MemoryFs::new();
    fs.add_file("/data/a.csv", 100, b"a");

    let dir = tempfile::tempdir().unwrap();
    let cursor_path = dir.path().join("cursor.json");
    let cfg = config("/data");

    {
        let store = FileCursorStore::new(&cursor_path, cfg.fingerprint());
        let mut lister = Lister::new(&cfg, Box::new(store)).unwrap();
        let mut sink = BufferSink::default();
        let outcome = lister.run_cycle(&fs, &mut sink).unwrap();
        assert_eq!(outcome.stats.files_emitted, 1);
    }

    // A fresh lister over the same cursor file picks up where the
    // first left off.
    fs.add_file("/data/b.csv", 200, b"b");
    let store = FileCursorStore::new(&cursor_path, cfg.fingerprint());
    let mut lister = Lister::new(&cfg, Box::new(store)).unwrap();
    let mut sink = BufferSink::default();
    let outcome = lister.run_cycle(&fs, &mut sink).unwrap();
    assert_eq!(outcome.stats.files_emitted, 1);
    assert_eq!(sink.records[0].attributes["filename"], "b.csv");
}

#[test]
fn same_instant_arrivals_emit_exactly_once() {
    let fs = MemoryFs::new();
    fs.add_file("/data/a.csv", 100, b"a");

    let dir = tempfile::tempdir().unwrap();
    let cfg = config("/data");
    let store = FileCursorStore::new(dir.path().join("cursor.json"), cfg.fingerprint());
    let mut lister = Lister::new(&cfg, Box::new(store)).unwrap();
    let mut sink = BufferSink::default();

    lister.run_cycle(&fs, &mut sink).unwrap();

    // b shares the watermark instant and must still be picked up, and
    // neither file may appear twice across the three cycles.
    fs.add_file("/data/b.csv", 100, b"b");
    lister.run_cycle(&fs, &mut sink).unwrap();
    lister.run_cycle(&fs, &mut sink).unwrap();

    let names: Vec<&str> = sink
        .records
        .iter()
        .map(|r| r.attributes["filename"].as_str())
        .collect();
    assert_eq!(names, vec!["a.csv", "b.csv"]);
}

#[test]
fn older_files_below_the_watermark_are_never_emitted() {
    let fs = MemoryFs::new();
    fs.add_file("/data/new.csv", 500, b"n");

    let mut lister = Lister::new(&config("/data"), Box::new(MemoryCursorStore::new())).unwrap();
    let mut sink = BufferSink::default();
    lister.run_cycle(&fs, &mut sink).unwrap();

    // A file appearing with an instant below the watermark is treated
    // as already handled.
    fs.add_file("/data/backfilled.csv", 400, b"o");
    let outcome = lister.run_cycle(&fs, &mut sink).unwrap();
    assert_eq!(outcome.stats.files_emitted, 0);
}

#[test]
fn watermark_only_moves_forward() {
    let fs = MemoryFs::new();
    fs.add_file("/data/a.csv", 500, b"a");

    let mut lister = Lister::new(&config("/data"), Box::new(MemoryCursorStore::new())).unwrap();
    let mut sink = BufferSink::default();
    let first = lister.run_cycle(&fs, &mut sink).unwrap();
    assert_eq!(first.watermark_millis, Some(500));

    fs.remove("/data/a.csv");
    fs.add_file("/data/b.csv", 300, b"b");
    let second = lister.run_cycle(&fs, &mut sink).unwrap();
    assert_eq!(second.watermark_millis, Some(500));
}

#[test]
fn listing_failure_redelivers_the_whole_batch() {
    let fs = MemoryFs::new();
    fs.add_file("/data/a.csv", 100, b"a");
    fs.add_file("/data/sub/b.csv", 200, b"b");
    fs.fail_listing_of("/data/sub");

    let dir = tempfile::tempdir().unwrap();
    let cfg = config("/data");
    let store = FileCursorStore::new(dir.path().join("cursor.json"), cfg.fingerprint());
    let mut lister = Lister::new(&cfg, Box::new(store)).unwrap();
    let mut sink = BufferSink::default();

    assert!(lister.run_cycle(&fs, &mut sink).is_err());
    assert!(sink.records.is_empty());

    fs.restore_listing_of("/data/sub");
    let outcome = lister.run_cycle(&fs, &mut sink).unwrap();
    assert_eq!(outcome.stats.files_emitted, 2);
}

#[test]
fn changed_configuration_discards_stored_progress() {
    let fs = MemoryFs::new();
    fs.add_file("/data/a.csv", 100, b"a");

    let dir = tempfile::tempdir().unwrap();
    let cursor_path = dir.path().join("cursor.json");

    let cfg = config("/data");
    let store = FileCursorStore::new(&cursor_path, cfg.fingerprint());
    let mut lister = Lister::new(&cfg, Box::new(store)).unwrap();
    let mut sink = BufferSink::default();
    lister.run_cycle(&fs, &mut sink).unwrap();

    // Same cursor file, different filter: the fingerprint no longer
    // matches and the tree is listed from scratch.
    let mut changed = config("/data");
    changed.filter_pattern = ".*\\.csv".to_string();
    let store = FileCursorStore::new(&cursor_path, changed.fingerprint());
    let mut lister = Lister::new(&changed, Box::new(store)).unwrap();
    let mut sink = BufferSink::default();
    let outcome = lister.run_cycle(&fs, &mut sink).unwrap();
    assert_eq!(outcome.stats.files_emitted, 1);
}

#[test]
fn explicit_reset_relists_everything() {
    let fs = MemoryFs::new();
    fs.add_file("/data/a.csv", 100, b"a");

    let dir = tempfile::tempdir().unwrap();
    let cfg = config("/data");
    let store = FileCursorStore::new(dir.path().join("cursor.json"), cfg.fingerprint());
    let mut lister = Lister::new(&cfg, Box::new(store)).unwrap();
    let mut sink = BufferSink::default();

    lister.run_cycle(&fs, &mut sink).unwrap();
    lister.reset().unwrap();
    let outcome = lister.run_cycle(&fs, &mut sink).unwrap();
    assert_eq!(outcome.stats.files_emitted, 1);
    assert_eq!(sink.records.len(), 2);
}

#[test]
fn corrupt_cursor_file_stops_the_cycle() {
    let fs = MemoryFs::new();
    fs.add_file("/data/a.csv", 100, b"a");

    let dir = tempfile::tempdir().unwrap();
    let cursor_path = dir.path().join("cursor.json");
    fs::write(&cursor_path, "{ not json").unwrap();

    let cfg = config("/data");
    let store = FileCursorStore::new(&cursor_path, cfg.fingerprint());
    let mut lister = Lister::new(&cfg, Box::new(store)).unwrap();
    let mut sink = BufferSink::default();

    // A broken cursor must not silently turn into a full re-listing.
    assert!(lister.run_cycle(&fs, &mut sink).is_err());
    assert!(sink.records.is_empty());
}
