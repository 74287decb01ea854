mod common;

use common::workspace;
use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lila"))
        .args(args)
        .output()
        .expect("run lila binary")
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lila"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run lila binary")
}

fn json_lines(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("stdout line is JSON"))
        .collect()
}

#[test]
fn describe_prints_operator_metadata() {
    let output = run(&["--describe"]);
    assert_eq!(output.status.code(), Some(0));
    let operator: Value = serde_json::from_slice(&output.stdout).expect("operator json");
    assert_eq!(operator["name"], "lila");
    assert_eq!(operator["commands"][0], "check");
}

#[test]
fn check_passing_tree_exits_zero() {
    let workspace = workspace();
    let testlog = workspace.testlog.to_string_lossy().into_owned();
    let output = run_in(workspace.root.path(), &["check", &testlog]);

    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stdout));
    let rows = json_lines(&output.stdout);
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|row| row["verdict"] == Value::Bool(true)));
    assert_eq!(rows[0]["file"], "Motor_Step.txt");
    assert_eq!(rows[0]["check"], "1_exist");
}

#[test]
fn check_with_missing_artifact_exits_one() {
    let workspace = workspace();
    std::fs::remove_file(workspace.path("TestCsv/Motor_Step.xeat")).expect("remove xeat");
    let testlog = workspace.testlog.to_string_lossy().into_owned();
    let output = run_in(workspace.root.path(), &["check", &testlog, "--warnings-only"]);

    assert_eq!(output.status.code(), Some(1));
    let rows = json_lines(&output.stdout);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["category"], "xeat");
    assert_eq!(rows[0]["verdict"], Value::Bool(false));
}

#[test]
fn missing_testlog_is_refused() {
    let output = run(&["check", "/nonexistent/lila/Motor_Step.txt"]);
    assert_eq!(output.status.code(), Some(2));
    let refusal: Value = serde_json::from_slice(&output.stdout).expect("refusal json");
    assert_eq!(refusal["outcome"], "REFUSAL");
    assert_eq!(refusal["refusal"]["code"], "E_BAD_INPUT");
}

#[test]
fn unsupported_settings_format_is_refused() {
    let workspace = workspace();
    workspace.write("settings.toml", "tooltips = {}\n");
    let settings = workspace.path("settings.toml").to_string_lossy().into_owned();
    let testlog = workspace.testlog.to_string_lossy().into_owned();
    let output = run(&["--settings", &settings, "check", &testlog]);

    assert_eq!(output.status.code(), Some(2));
    let refusal: Value = serde_json::from_slice(&output.stdout).expect("refusal json");
    assert_eq!(refusal["refusal"]["code"], "E_BAD_SETTINGS");
    assert_eq!(refusal["refusal"]["next_command"], "lila --describe");
}

#[test]
fn unknown_package_is_refused() {
    let workspace = workspace();
    let data_dir = workspace.path("data").to_string_lossy().into_owned();
    let testlog = workspace.testlog.to_string_lossy().into_owned();
    let output = run(&["--data-dir", &data_dir, "--package", "nope", "check", &testlog]);

    assert_eq!(output.status.code(), Some(2));
    let refusal: Value = serde_json::from_slice(&output.stdout).expect("refusal json");
    assert_eq!(refusal["refusal"]["code"], "E_BAD_SETTINGS");
}

#[test]
fn batch_emits_one_entry_per_testlog_with_progress() {
    let workspace = workspace();
    let dir = workspace.root.path().to_string_lossy().into_owned();
    let output = run(&["batch", &dir, "--progress"]);

    assert_eq!(output.status.code(), Some(0));
    let entries = json_lines(&output.stdout);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["status"], "OK");
    assert_eq!(entries[0]["func"], "Motor_Step");

    let progress = json_lines(&output.stderr);
    let last = progress.last().expect("progress event");
    assert_eq!(last["type"], "progress");
    assert_eq!(last["tool"], "lila");
    assert_eq!(last["processed"], 1);
}

#[test]
fn labels_lists_items_per_label() {
    let workspace = workspace();
    let testlog = workspace.testlog.to_string_lossy().into_owned();
    let output = run(&["labels", &testlog]);

    assert_eq!(output.status.code(), Some(0));
    let lines = json_lines(&output.stdout);
    let variable = lines
        .iter()
        .find(|line| line["label"] == "Variable")
        .expect("Variable label");
    assert_eq!(variable["items"][0]["item"], "speed");
    assert_eq!(variable["items"][0]["testcases"], serde_json::json!([1, 2]));
}

#[test]
fn missing_subcommand_exits_two() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn batch_filter_selects_testlogs_by_name() {
    let workspace = workspace();
    let source = workspace.path("src/motor/ctrl.c");
    workspace.write("orphan/Other.txt", &common::testlog_text(&source, "100%"));
    let dir = workspace.root.path().to_string_lossy().into_owned();

    let output = run(&["batch", &dir, "--filter", "^Other"]);
    assert_eq!(output.status.code(), Some(1));
    let entries = json_lines(&output.stdout);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["status"], "NG");

    let output = run(&["batch", &dir, "--filter", "("]);
    assert_eq!(output.status.code(), Some(2));
    let refusal: Value = serde_json::from_slice(&output.stdout).expect("refusal json");
    assert_eq!(refusal["refusal"]["code"], "E_BAD_INPUT");
}
