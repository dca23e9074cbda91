use std::fs;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::tempdir;

fn segregation() -> Command {
    let mut cmd = Command::cargo_bin("segregation").expect("segregation binary is built");
    let _ = cmd.env("RUST_LOG", "warn");
    cmd
}

fn frame_turns(stdout: &[u8]) -> Vec<u64> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| {
            let frame: Value = serde_json::from_str(line).expect("each line is a json frame");
            frame["snapshot"]["turn"].as_u64().expect("frame carries a turn")
        })
        .collect()
}

#[test]
fn single_turn_without_frames_succeeds() {
    let output = segregation()
        .args(["--turns", "1", "--format", "none", "--seed", "3"])
        .output()
        .expect("run segregation");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn json_format_emits_initial_frame_and_one_per_turn() {
    let output = segregation()
        .args([
            "--width", "5", "--height", "5", "--agents", "10", "--turns", "2", "--seed", "1",
            "--format", "json",
        ])
        .output()
        .expect("run segregation");

    assert!(output.status.success());
    assert_eq!(frame_turns(&output.stdout), vec![0, 1, 2]);
}

#[test]
fn text_format_prints_turn_header() {
    let output = segregation()
        .args([
            "--width",
            "3",
            "--height",
            "2",
            "--agents",
            "0",
            "--turns",
            "0",
            "--frame-delay-ms",
            "0",
        ])
        .output()
        .expect("run segregation");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Turn: 0"));
    assert!(!stdout.contains("Turn: 1"));
}

#[test]
fn overcrowded_grid_exits_with_error() {
    let output = segregation()
        .args(["--width", "2", "--height", "2", "--agents", "5", "--format", "none"])
        .output()
        .expect("run segregation");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot place 5 agents"));
}

#[test]
fn config_file_supplies_defaults_for_flags() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("run.toml");
    fs::write(
        &path,
        "width = 4\nheight = 4\nagents = 3\nturns = 1\nformat = \"json\"\n",
    )
    .expect("write config");

    let output = segregation()
        .arg("--config")
        .arg(&path)
        .args(["--seed", "2"])
        .output()
        .expect("run segregation");

    assert!(output.status.success());
    assert_eq!(frame_turns(&output.stdout), vec![0, 1]);
}
