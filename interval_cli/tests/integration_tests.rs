//! Integration tests for the intervals binary.
//!
//! These tests verify end-to-end behavior including:
//! - Plan authoring through the editor commands
//! - Listing and timeline display
//! - Playback, skipping and session history
//! - Not-found and validation reporting

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temp data directory plus a config with instant countdowns and no audio
struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(
            dir.path().join("config.toml"),
            "[playback]\nstart_countdown_secs = 0\ntransition_countdown_secs = 0\n\n[audio]\nenabled = false\n",
        )
        .expect("Failed to write config");
        Self { dir }
    }

    fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    fn cli(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("intervals"));
        cmd.arg("--data-dir")
            .arg(self.data_dir())
            .arg("--config")
            .arg(self.dir.path().join("config.toml"));
        cmd
    }

    fn create(&self, args: &[&str]) -> String {
        let output = self
            .cli()
            .arg("create")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        id_after(&output, "✓ Created plan ")
    }

    fn add(&self, plan: &str, args: &[&str]) -> String {
        let output = self
            .cli()
            .arg("add")
            .arg(plan)
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        id_after(&output, "✓ Added item ")
    }
}

fn id_after(output: &[u8], prefix: &str) -> String {
    String::from_utf8_lossy(output)
        .lines()
        .find_map(|l| l.strip_prefix(prefix))
        .map(|id| id.trim().to_string())
        .expect("id in output")
}

fn history_path(data_dir: &Path) -> PathBuf {
    data_dir.join("sessions.jsonl")
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("intervals"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Interval workout timer"));
}

#[test]
fn test_list_empty() {
    let env = Env::new();
    env.cli()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No plans yet"));
}

#[test]
fn test_plan_from_template_is_listed() {
    let env = Env::new();

    env.cli()
        .arg("templates")
        .assert()
        .success()
        .stdout(predicate::str::contains("c25k-w1"));

    env.cli()
        .arg("new")
        .arg("c25k-w1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created plan"));

    env.cli()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Couch to 5K"))
        .stdout(predicate::str::contains("30:00"))
        .stdout(predicate::str::contains("18 intervals"));
}

#[test]
fn test_unknown_template() {
    let env = Env::new();
    env.cli()
        .arg("new")
        .arg("marathon")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found: template marathon"));
}

#[test]
fn test_author_reference_plan_and_show_timeline() {
    let env = Env::new();
    let plan = env.create(&[
        "--name",
        "Reference",
        "--warmup",
        "60",
        "--cooldown",
        "60",
        "--duration",
        "99",
    ]);

    // Replace the initial exercise with 2 x [run 30, rest 15]
    let set = env.add(&plan, &["set", "--repetitions", "2"]);
    env.add(
        &plan,
        &["--parent", &set, "exercise", "--type", "running", "--duration", "30"],
    );
    env.add(&plan, &["--parent", &set, "rest", "--duration", "15"]);

    let show = env
        .cli()
        .arg("show")
        .arg(&plan)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let first = id_after(&show, "  Running 99s Medium  [");
    let first = first.trim_end_matches(']').to_string();

    env.cli()
        .arg("remove")
        .arg(&plan)
        .arg(&first)
        .assert()
        .success();

    env.cli()
        .arg("show")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 3:30  (6 intervals)"))
        .stdout(predicate::str::contains("0:00-1:00  warmup"))
        .stdout(predicate::str::contains("1:00-1:30  run"))
        .stdout(predicate::str::contains("1:30-1:45  rest"))
        .stdout(predicate::str::contains("2:30-3:30  cooldown"));
}

#[test]
fn test_add_into_non_set_rejected() {
    let env = Env::new();
    let plan = env.create(&["--name", "Flat", "--duration", "30"]);
    let leaf = env.add(&plan, &["rest", "--duration", "10"]);

    env.cli()
        .arg("add")
        .arg(&plan)
        .arg("--parent")
        .arg(&leaf)
        .arg("rest")
        .arg("--duration")
        .arg("5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a set"));
}

#[test]
fn test_move_and_rename() {
    let env = Env::new();
    let plan = env.create(&["--name", "Order", "--duration", "30"]);
    let rest = env.add(&plan, &["rest", "--duration", "10"]);

    env.cli()
        .arg("move")
        .arg(&plan)
        .arg(&rest)
        .arg("up")
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved item"));

    env.cli()
        .arg("move")
        .arg(&plan)
        .arg(&rest)
        .arg("up")
        .assert()
        .success()
        .stdout(predicate::str::contains("already at the edge"));

    env.cli()
        .arg("rename")
        .arg(&plan)
        .arg("Reordered")
        .assert()
        .success();

    env.cli()
        .arg("show")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("Reordered"))
        .stdout(predicate::str::contains("1. 0:00-0:10  rest"));
}

#[test]
fn test_validation_error_reported() {
    let env = Env::new();
    env.cli()
        .arg("create")
        .arg("--name")
        .arg("  ")
        .arg("--duration")
        .arg("30")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation error"));

    env.cli()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No plans yet"));
}

#[test]
fn test_oversized_plan_rejected() {
    let env = Env::new();
    env.cli()
        .arg("create")
        .arg("--name")
        .arg("Forever")
        .arg("--warmup")
        .arg("1")
        .arg("--duration")
        .arg("4294967295")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation error"));

    let plan = env.create(&["--name", "Growing", "--duration", "60"]);
    env.cli()
        .arg("add")
        .arg(&plan)
        .arg("set")
        .arg("--repetitions")
        .arg("4294967295")
        .assert()
        .success();
    let show = env
        .cli()
        .arg("show")
        .arg(&plan)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let set_id = id_after(&show, "  Set x4294967295  [");
    let set_id = set_id.trim_end_matches(']');
    env.cli()
        .arg("add")
        .arg(&plan)
        .arg("--parent")
        .arg(set_id)
        .arg("rest")
        .arg("--duration")
        .arg("100000")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation error"));

    env.cli()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Growing"))
        .stdout(predicate::str::contains("1:00"));
}

#[test]
fn test_missing_plan_reported_not_found() {
    let env = Env::new();
    for cmd in ["show", "play", "delete"] {
        env.cli()
            .arg(cmd)
            .arg("does-not-exist")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not found: plan does-not-exist"));
    }
}

#[test]
fn test_delete_plan() {
    let env = Env::new();
    let plan = env.create(&["--name", "Doomed", "--duration", "30"]);

    env.cli()
        .arg("delete")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted plan"));

    env.cli().arg("show").arg(&plan).assert().failure();
}

#[test]
fn test_play_to_completion_records_history() {
    let env = Env::new();
    let plan = env.create(&["--name", "Tiny", "--duration", "1"]);

    env.cli()
        .arg("play")
        .arg(&plan)
        .arg("--silent")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout complete!"))
        .stdout(predicate::str::contains("1 completed, 0 skipped"));

    let history = fs::read_to_string(history_path(&env.data_dir())).expect("history file");
    assert_eq!(history.lines().count(), 1);
    let record: serde_json::Value = serde_json::from_str(history.lines().next().unwrap()).unwrap();
    assert_eq!(record["plan_id"], plan.as_str());
    assert_eq!(record["completed"], true);
    assert_eq!(record["total_elapsed_ms"], 1000);

    env.cli()
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tiny"))
        .stdout(predicate::str::contains("completed"));
}

#[test]
fn test_play_skip_warmup() {
    let env = Env::new();
    let plan = env.create(&["--name", "Skippy", "--warmup", "30", "--duration", "1"]);

    env.cli()
        .arg("play")
        .arg(&plan)
        .arg("--silent")
        .write_stdin("s\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 completed, 1 skipped"));
}

#[test]
fn test_history_window_out_of_range() {
    let env = Env::new();
    env.cli()
        .arg("history")
        .arg("--days")
        .arg("999999999999999")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation error"));

    env.cli()
        .arg("history")
        .arg("--days=-1")
        .assert()
        .failure();
}

#[test]
fn test_history_empty() {
    let env = Env::new();
    env.cli()
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No sessions"));
}
