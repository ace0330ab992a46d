//! Tests for snapshot directory helpers.

use tempfile::TempDir;

use relink_io::{IoError, copy_files_into, ensure_dir, list_files, remove_dir};

#[test]
fn test_list_files_filters_extensions() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("CORE.FOR"), "").unwrap();
    std::fs::write(dir.path().join("COMMONS.INC"), "").unwrap();
    std::fs::write(dir.path().join("README.txt"), "").unwrap();
    std::fs::write(dir.path().join("lower.for"), "").unwrap();
    std::fs::create_dir(dir.path().join("nested.FOR")).unwrap();

    let files = list_files(dir.path(), &["FOR", "INC"]).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["COMMONS.INC", "CORE.FOR"]);
}

#[test]
fn test_list_files_all() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("B"), "").unwrap();
    std::fs::write(dir.path().join("A"), "").unwrap();
    assert_eq!(list_files(dir.path(), &[]).unwrap().len(), 2);
}

#[test]
fn test_list_files_missing_dir() {
    let result = list_files("/nonexistent/relink/dir", &[]);
    assert!(matches!(result, Err(IoError::NotFound(_))));
}

#[test]
fn test_ensure_dir_rejects_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("occupied");
    std::fs::write(&file, "").unwrap();
    assert!(matches!(ensure_dir(&file), Err(IoError::NotADirectory(_))));
}

#[test]
fn test_copy_and_remove() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("step_3");
    ensure_dir(&src).unwrap();
    std::fs::write(src.join("RP9_CORE.FOR"), "      END\n").unwrap();

    let dest = dir.path().join("out");
    let copied = copy_files_into(&src, &dest).unwrap();
    assert_eq!(copied.len(), 1);
    assert_eq!(
        std::fs::read_to_string(dest.join("RP9_CORE.FOR")).unwrap(),
        "      END\n"
    );

    remove_dir(&src).unwrap();
    assert!(!src.exists());
    remove_dir(&src).unwrap();
}
