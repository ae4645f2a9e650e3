// Junk file naming: gap scanning and continuation across runs

use junkgen::namer::{file_name, find_start_index, next_available_name};
use std::fs;

#[test]
fn empty_directory_starts_at_zero() {
    let dir = tempfile::TempDir::new().unwrap();
    assert_eq!(find_start_index(dir.path()).unwrap(), 0);
    assert_eq!(
        next_available_name(dir.path(), 0).unwrap(),
        ("JunkFile_00000000.dat".to_string(), 1)
    );
}

#[test]
fn start_index_continues_past_contiguous_files() {
    let dir = tempfile::TempDir::new().unwrap();
    for i in 0..3 {
        fs::write(dir.path().join(file_name(i)), b"old").unwrap();
    }
    assert_eq!(find_start_index(dir.path()).unwrap(), 3);
}

#[test]
fn next_name_skips_existing_files() {
    let dir = tempfile::TempDir::new().unwrap();
    // gap at 1, occupied 0, 2, 3
    for i in [0, 2, 3] {
        fs::write(dir.path().join(file_name(i)), b"old").unwrap();
    }
    assert_eq!(find_start_index(dir.path()).unwrap(), 1);

    let (name, next) = next_available_name(dir.path(), 1).unwrap();
    assert_eq!(name, "JunkFile_00000001.dat");
    assert_eq!(next, 2);

    fs::write(dir.path().join(&name), b"new").unwrap();
    let (name, next) = next_available_name(dir.path(), next).unwrap();
    assert_eq!(name, "JunkFile_00000004.dat");
    assert_eq!(next, 5);
}

#[test]
fn unrelated_files_do_not_block_names() {
    let dir = tempfile::TempDir::new().unwrap();
    fs::write(dir.path().join("JunkFile_00000000.txt"), b"x").unwrap();
    fs::write(dir.path().join("notes.dat"), b"x").unwrap();
    assert_eq!(find_start_index(dir.path()).unwrap(), 0);
}

#[test]
fn directories_count_as_taken_names() {
    let dir = tempfile::TempDir::new().unwrap();
    fs::create_dir(dir.path().join(file_name(0))).unwrap();
    assert_eq!(find_start_index(dir.path()).unwrap(), 1);
}
