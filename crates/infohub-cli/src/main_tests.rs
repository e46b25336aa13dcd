// crates/infohub-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Tests
// Description: Unit tests for argument parsing and export file loading.
// Purpose: Ensure store loading is bounded and all-or-nothing.
// Dependencies: clap, infohub-store-sqlite, tempfile
// ============================================================================

//! ## Overview
//! Covers subcommand parsing, bounded reads, export file shapes, and batch
//! validation before any store write.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use infohub_core::ExportName;
use infohub_store_sqlite::SqliteExportStore;
use infohub_store_sqlite::SqliteStoreConfig;
use tempfile::TempDir;

use super::Cli;
use super::Commands;
use super::ReadLimitError;
use super::StoreCommand;
use super::load_export_files;
use super::read_bytes_with_limit;
use super::read_export_file;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn export_json(name: &str) -> String {
    format!(
        r#"{{
            "exportName": "{name}",
            "policies": {{"example/examplePolicy/1.0": {{"input": "rawValue"}}}},
            "cacheTtl": 60,
            "issuer": "did:example:hub",
            "keyNamespace": "hub",
            "key": "signing"
        }}"#
    )
}

fn write(dir: &TempDir, file: &str, content: &str) -> PathBuf {
    let path = dir.path().join(file);
    fs::write(&path, content).expect("write fixture");
    path
}

fn store(dir: &TempDir) -> SqliteExportStore {
    SqliteExportStore::new(&SqliteStoreConfig::new(dir.path().join("exports.db")))
        .expect("open store")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn store_load_parses_files_and_config() {
    let cli = Cli::try_parse_from([
        "infohub", "store", "load", "--config", "hub.toml", "a.json", "b.json",
    ])
    .expect("parse");
    let Some(Commands::Store {
        command: StoreCommand::Load(load),
    }) = cli.command
    else {
        panic!("expected store load");
    };
    assert_eq!(load.config, Some(PathBuf::from("hub.toml")));
    assert_eq!(load.files.len(), 2);
}

#[test]
fn store_load_requires_a_file() {
    assert!(Cli::try_parse_from(["infohub", "store", "load"]).is_err());
}

#[test]
fn read_bytes_with_limit_rejects_large_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "large.json", "123456789");

    match read_bytes_with_limit(&path, 8) {
        Err(ReadLimitError::TooLarge {
            size,
            limit,
        }) => {
            assert_eq!(size, 9);
            assert_eq!(limit, 8);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn export_file_accepts_object_or_array() {
    let dir = TempDir::new().unwrap();
    let single = write(&dir, "single.json", &export_json("patients"));
    let many = write(
        &dir,
        "many.json",
        &format!("[{}, {}]", export_json("a"), export_json("b")),
    );

    let parsed = read_export_file(&single).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].export_name.as_str(), "patients");
    assert_eq!(parsed[0].cache_ttl, Some(60));
    assert_eq!(read_export_file(&many).unwrap().len(), 2);
}

#[test]
fn export_file_missing_signing_fields_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.json", r#"{"exportName": "x"}"#);

    let err = read_export_file(&path).unwrap_err();
    assert!(err.to_string().starts_with("invalid export file"));
}

#[test]
fn load_stores_every_export() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let first = write(&dir, "a.json", &export_json("a"));
    let second = write(&dir, "b.json", &export_json("b"));

    assert_eq!(load_export_files(&store, &[first, second]).unwrap(), 2);
    let names: Vec<String> =
        store.list().unwrap().into_iter().map(|name| name.as_str().to_string()).collect();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    assert!(store.load(&ExportName::new("a")).unwrap().is_some());
}

#[test]
fn duplicate_names_across_files_write_nothing() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let first = write(&dir, "a.json", &export_json("Patients"));
    let second = write(&dir, "b.json", &export_json("patients"));

    let err = load_export_files(&store, &[first, second]).unwrap_err();
    assert!(err.to_string().contains("duplicate export name"));
    assert!(store.list().unwrap().is_empty());
}
