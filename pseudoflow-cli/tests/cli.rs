use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn write_input(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn two_node_trivial_round_trips_through_the_cli() {
    let dir = tempdir().unwrap();
    let input = write_input(&dir, "in.txt", "p 2 1 0 0 0\nn 0 s\nn 1 t\na 0 1 5.0 0.0\n");
    let output = dir.path().join("out.txt");

    Command::cargo_bin("hpf")
        .unwrap()
        .args([input.to_str().unwrap(), output.to_str().unwrap()])
        .assert()
        .success();

    let contents = fs::read_to_string(&output).unwrap();
    let mut lines = contents.lines();
    assert!(lines.next().unwrap().starts_with('t'));
    assert!(lines.next().unwrap().starts_with('s'));
    assert_eq!(lines.next().unwrap(), "p 1");
    assert_eq!(lines.next().unwrap(), "l 0.000000000000");
    assert_eq!(lines.next().unwrap(), "n 0 1");
    assert_eq!(lines.next().unwrap(), "n 1 0");
}

#[test]
fn parameter_free_single_cut_through_the_cli() {
    let dir = tempdir().unwrap();
    let input = write_input(
        &dir,
        "in.txt",
        "p 4 4 0 0 0\nn 0 s\nn 3 t\na 0 1 10.0 0.0\na 0 2 10.0 0.0\na 1 3 5.0 0.0\na 2 3 5.0 0.0\n",
    );
    let output = dir.path().join("out.txt");

    Command::cargo_bin("hpf")
        .unwrap()
        .args([input.to_str().unwrap(), output.to_str().unwrap()])
        .assert()
        .success();

    let contents = fs::read_to_string(&output).unwrap();
    assert!(contents.contains("n 0 1"));
    assert!(contents.contains("n 3 0"));
}

#[test]
fn negative_capacity_without_rounding_fails_with_a_diagnostic() {
    let dir = tempdir().unwrap();
    let input = write_input(&dir, "in.txt", "p 2 1 -5 5 0\nn 0 s\nn 1 t\na 0 1 1.0 1.0\n");
    let output = dir.path().join("out.txt");

    Command::cargo_bin("hpf")
        .unwrap()
        .args([input.to_str().unwrap(), output.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("negative capacity"));
    assert!(!output.exists());
}

#[test]
fn round_negative_flag_overrides_header() {
    let dir = tempdir().unwrap();
    let input = write_input(&dir, "in.txt", "p 2 1 -5 5 0\nn 0 s\nn 1 t\na 0 1 1.0 1.0\n");
    let output = dir.path().join("out.txt");

    Command::cargo_bin("hpf")
        .unwrap()
        .args([
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--round-negative",
        ])
        .assert()
        .success();
    assert!(output.exists());
}

#[test]
fn arc_count_mismatch_fails_with_a_diagnostic() {
    let dir = tempdir().unwrap();
    let input = write_input(&dir, "in.txt", "p 2 2 0 0 0\nn 0 s\nn 1 t\na 0 1 5.0 0.0\n");
    let output = dir.path().join("out.txt");

    Command::cargo_bin("hpf")
        .unwrap()
        .args([input.to_str().unwrap(), output.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("incorrect number of arcs"));
}

#[test]
fn missing_input_file_fails_with_an_io_diagnostic() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.txt");

    Command::cargo_bin("hpf")
        .unwrap()
        .args([
            dir.path().join("does-not-exist.txt").to_str().unwrap(),
            output.to_str().unwrap(),
        ])
        .assert()
        .failure();
}
