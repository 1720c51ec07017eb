//! Tests for BatchValidator over directories of tree files

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use diagtree::application::services::{BatchValidator, FileStatus};
use diagtree::application::ApplicationError;
use diagtree::infrastructure::traits::RealFileSystem;

fn resource(rel: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources")
        .join(rel)
}

fn validator() -> BatchValidator {
    BatchValidator::new(
        Arc::new(RealFileSystem),
        vec!["json".to_string(), "toml".to_string()],
    )
}

fn copy_resource(rel: &str, dir: &Path, name: &str) {
    fs::copy(resource(rel), dir.join(name)).expect("copy fixture");
}

#[test]
fn given_valid_tree_dir_when_validating_then_all_files_pass() {
    let report = validator().validate_path(&resource("trees")).unwrap();

    // notes.md is not a tree file
    assert_eq!(report.files.len(), 2);
    assert_eq!(report.valid_count(), 2);
    assert!(report.is_success(false));
    assert!(report.is_success(true));
    assert!(report.files[0].path.ends_with("nested/overheating.toml"));
    assert_eq!(report.files[1].node_count, 4);
}

#[test]
fn given_mixed_dir_when_validating_then_reports_each_file() {
    // Arrange
    let temp = TempDir::new().unwrap();
    copy_resource("trees/no_crank.json", temp.path(), "a_valid.json");
    copy_resource("invalid/broken.json", temp.path(), "b_broken.json");
    copy_resource("invalid/not_a_tree.json", temp.path(), "c_garbage.json");

    // Act
    let report = validator().validate_path(temp.path()).unwrap();

    // Assert
    let statuses: Vec<FileStatus> = report.files.iter().map(|f| f.status).collect();
    assert_eq!(
        statuses,
        vec![FileStatus::Valid, FileStatus::Invalid, FileStatus::Unreadable]
    );
    assert_eq!(report.files[1].defects.len(), 3);
    assert!(report.files[2].error.is_some());
    assert_eq!(report.invalid_count(), 2);
    assert!(!report.is_success(false));
}

#[test]
fn given_tree_with_warnings_when_validating_strict_then_batch_fails() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("orphan.json"),
        r#"{"steps": [
            {"id": "start", "kind": "solution", "text": "Done", "action": "Nothing"},
            {"id": "lost", "kind": "solution", "text": "Never shown", "action": "Nothing"}
        ]}"#,
    )
    .unwrap();

    let report = validator().validate_path(temp.path()).unwrap();

    assert_eq!(report.valid_count(), 1);
    assert_eq!(report.warning_count(), 1);
    assert!(report.is_success(false));
    assert!(!report.is_success(true));
}

#[test]
fn given_single_file_when_validating_then_reports_only_that_file() {
    let report = validator()
        .validate_path(&resource("invalid/broken.json"))
        .unwrap();

    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].status, FileStatus::Invalid);
}

#[test]
fn given_empty_dir_when_validating_then_succeeds_with_no_files() {
    let temp = TempDir::new().unwrap();

    let report = validator().validate_path(temp.path()).unwrap();

    assert!(report.files.is_empty());
    assert!(report.is_success(true));
}

#[test]
fn given_missing_path_when_validating_then_returns_not_found() {
    let temp = TempDir::new().unwrap();

    let err = validator()
        .validate_path(&temp.path().join("nope"))
        .unwrap_err();

    assert!(matches!(err, ApplicationError::NotFound(_)));
}

#[test]
fn given_report_when_serializing_then_defects_are_messages() {
    let report = validator()
        .validate_path(&resource("invalid/broken.json"))
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    let file = &json["files"][0];
    assert_eq!(file["status"], "invalid");
    assert_eq!(file["defects"][0], "missing start node: no step with id \"start\"");
    assert_eq!(file["node_count"], 2);
}
