//! Integration tests for the flatcopy binary
//!
//! Exercise exit status and stream routing of the real executable.

use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn flatcopy() -> Command {
    Command::new(env!("CARGO_BIN_EXE_flatcopy"))
}

fn write_file(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[test]
fn test_missing_arguments_print_usage() {
    let output = flatcopy().env_remove("FLATCOPY_THREADS").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage: flatcopy <SOURCE> <TARGET>"));

    let output = flatcopy().arg("only-source").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_scenario_lines_and_exit_status() {
    let src = tempdir().unwrap();
    let dst = tempdir().unwrap();
    write_file(src.path(), "a/x.txt", b"a");
    write_file(src.path(), "b/y.txt", b"y");
    write_file(src.path(), "b/c/x.txt", b"c");

    let output = flatcopy()
        .args([src.path(), dst.path()])
        .args(["--threads", "2"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines.iter().filter(|l| l.ends_with(": OK")).count(), 2);
    assert_eq!(lines.iter().filter(|l| l.ends_with(": FAIL")).count(), 1);

    let mut names: Vec<String> = std::fs::read_dir(dst.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["x.txt", "y.txt"]);

    // A second run skips everything but still exits 0
    let output = flatcopy().args([src.path(), dst.path()]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().all(|l| l.ends_with(": FAIL")));
}

#[test]
fn test_missing_source_reports_error() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("out");

    let output = flatcopy()
        .arg(dir.path().join("nope"))
        .arg(&target)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: Path not found"));
    assert!(!target.exists());
}
