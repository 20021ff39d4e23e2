use std::fs;
use std::path::Path;

use fileshare_engine::{ensure_output_dir, local_file_name, AtomicFileWriter, PersistError};
use tempfile::TempDir;

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("downloads");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_download() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("report.pdf", b"v1").unwrap();
    assert_eq!(first.file_name().unwrap(), "report.pdf");
    assert_eq!(fs::read(&first).unwrap(), b"v1");

    let second = writer.write("report.pdf", b"v2").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"v2");
}

#[test]
fn repeated_writes_leave_no_staging_files() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path());
    assert_eq!(writer.dir(), temp.path());

    for round in 0..3u8 {
        writer.write("data.bin", &[round; 16]).unwrap();
    }

    assert_eq!(dir_entries(temp.path()), vec!["data.bin".to_string()]);
    assert_eq!(fs::read(temp.path().join("data.bin")).unwrap(), vec![2u8; 16]);
}

#[test]
fn failed_replacement_keeps_what_was_there() {
    let temp = TempDir::new().unwrap();
    let occupied = temp.path().join("report.bin");
    fs::create_dir(&occupied).unwrap();
    fs::write(occupied.join("keep.txt"), "old contents").unwrap();

    let writer = AtomicFileWriter::new(temp.path());
    let err = writer.write("report.bin", b"new contents").unwrap_err();

    assert!(matches!(err, PersistError::Io { .. }), "{err:?}");
    assert!(occupied.is_dir());
    assert_eq!(fs::read_to_string(occupied.join("keep.txt")).unwrap(), "old contents");
    // The staged copy is cleaned up with the error.
    assert_eq!(dir_entries(temp.path()), vec!["report.bin".to_string()]);
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let err = writer.write("doc.bin", b"data").unwrap_err();
    assert!(matches!(err, PersistError::OutputDir { .. }), "{err:?}");
    assert!(!file_path.with_file_name("doc.bin").exists());
}

#[test]
fn local_names_stay_inside_the_output_dir() {
    assert_eq!(local_file_name("report.pdf"), "report.pdf");
    assert_eq!(local_file_name("../../etc/passwd"), "passwd");
    assert_eq!(local_file_name("C:\\Users\\me\\notes.txt"), "notes.txt");
    assert_eq!(local_file_name("dir/"), "dir");
    assert_eq!(local_file_name(".."), "download");
    assert_eq!(local_file_name(""), "download");
}

#[test]
fn local_names_replace_forbidden_characters() {
    assert_eq!(local_file_name("what? now*.txt"), "what_ now_.txt");
    assert_eq!(local_file_name("a:b|c\"d.txt"), "a_b_c_d.txt");
    assert_eq!(local_file_name("  spaced name.  "), "spaced name");
}

#[test]
fn reserved_device_names_are_patched() {
    assert_eq!(local_file_name("CON"), "CON_");
    assert_eq!(local_file_name("nul.txt"), "nul.txt_");
    assert_eq!(local_file_name("COM3.log"), "COM3.log_");
    assert_eq!(local_file_name("COM0.log"), "COM0.log");
    assert_eq!(local_file_name("CONSOLE.txt"), "CONSOLE.txt");
}

#[test]
fn long_names_are_truncated_on_char_boundaries() {
    let long = "é".repeat(150);
    let name = local_file_name(&long);
    assert!(name.len() <= 200);
    assert!(name.chars().all(|c| c == 'é'));
}
