//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_tasktrack"))
        .args(args)
        .env("TASKTRACK_DATA_DIR", data_dir)
        .env_remove("TASKTRACK_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("stdout is not JSON")
}

fn create(data_dir: &Path, title: &str) -> String {
    let task = run_json(data_dir, &["task", "create", title]);
    task["id"].as_str().unwrap().to_string()
}

#[test]
fn test_task_create_list_get() {
    let dir = TempDir::new().unwrap();
    let task = run_json(
        dir.path(),
        &["task", "create", "Write report", "--priority", "High"],
    );
    assert_eq!(task["title"], "Write report");
    assert_eq!(task["priority"], "High");
    assert_eq!(task["category"], "None");
    assert_eq!(task["status"], "pending");

    create(dir.path(), "Second");
    let list = run_json(dir.path(), &["task", "list"]);
    let titles: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"Second") && titles.contains(&"Write report"));

    let id = task["id"].as_str().unwrap();
    let fetched = run_json(dir.path(), &["task", "get", id]);
    assert_eq!(fetched["id"], task["id"]);
}

#[test]
fn test_task_complete_advances_streak() {
    let dir = TempDir::new().unwrap();
    for date in ["2024-03-04", "2024-03-05", "2024-03-06"] {
        let id = create(dir.path(), "daily");
        let out = run_json(
            dir.path(),
            &["task", "complete", &id, "--simulated-date", date],
        );
        assert_eq!(out["task"]["status"], "completed");
    }

    let streak = run_json(dir.path(), &["streak", "show"]);
    assert_eq!(streak["currentStreak"], 2);
    assert_eq!(streak["lastCompletionDate"], "2024-03-06");
    assert_eq!(streak["streakDays"], "1,2");
}

#[test]
fn test_streak_complete_same_day_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let args = [
        "streak",
        "complete",
        "--simulated-date",
        "2024-03-04T08:00:00Z",
    ];
    let first = run_json(dir.path(), &args);
    let second = run_json(
        dir.path(),
        &["streak", "complete", "--simulated-date", "2024-03-04T22:00:00Z"],
    );
    assert_eq!(first, second);
    assert_eq!(first["currentStreak"], 0);
}

#[test]
fn test_users_are_isolated() {
    let dir = TempDir::new().unwrap();
    run_json(dir.path(), &["--user", "alice", "task", "create", "mine"]);
    let bob = run_json(dir.path(), &["--user", "bob", "task", "list"]);
    assert_eq!(bob.as_array().unwrap().len(), 0);
    let default_user = run_json(dir.path(), &["task", "list"]);
    assert_eq!(default_user.as_array().unwrap().len(), 0);
}

#[test]
fn test_stats_productivity_and_counts() {
    let dir = TempDir::new().unwrap();
    let id = create(dir.path(), "done");
    run_json(
        dir.path(),
        &["task", "complete", &id, "--simulated-date", "2024-01-17T09:00:00Z"],
    );
    run_json(
        dir.path(),
        &["task", "create", "late", "--due", "2024-01-01"],
    );

    let monthly = run_json(
        dir.path(),
        &["stats", "productivity", "--view", "monthly", "--simulated-date", "2024-06-15"],
    );
    assert_eq!(
        monthly,
        serde_json::json!([1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0])
    );

    let counts = run_json(
        dir.path(),
        &["stats", "counts", "--simulated-date", "2024-06-15"],
    );
    assert_eq!(counts["completed"], 1);
    assert_eq!(counts["missed"], 1);
    assert_eq!(counts["deleted"], 0);
}

#[test]
fn test_invalid_view_mode_fails() {
    let dir = TempDir::new().unwrap();
    let (stdout, stderr, code) =
        run_cli(dir.path(), &["stats", "productivity", "--view", "yearly"]);
    assert_ne!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.contains("yearly"));
}

#[test]
fn test_deleted_task_cannot_be_updated() {
    let dir = TempDir::new().unwrap();
    let id = create(dir.path(), "temporary");
    let deleted = run_json(dir.path(), &["task", "delete", &id]);
    assert_eq!(deleted["status"], "deleted");

    let (_, stderr, code) = run_cli(dir.path(), &["task", "update", &id, "--title", "again"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: Task not found"));

    let list = run_json(dir.path(), &["task", "list"]);
    assert!(list.as_array().unwrap().is_empty());
}

#[test]
fn test_config_get_set_reset() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "user.default_id"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "local");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "user.default_id", "carol"]);
    assert_eq!(code, 0);
    create(dir.path(), "owned by carol");
    let carol = run_json(dir.path(), &["--user", "carol", "task", "list"]);
    assert_eq!(carol.as_array().unwrap().len(), 1);

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "storage.busy_timeout_ms", "soon"]);
    assert_ne!(code, 0);

    let (_, _, code) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let listed = run_json(dir.path(), &["config", "list"]);
    assert_eq!(listed["user"]["default_id"], "local");
}

#[test]
fn test_log_filter_writes_events_to_stderr() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_tasktrack"))
        .args(["streak", "show"])
        .env("TASKTRACK_DATA_DIR", dir.path())
        .env("TASKTRACK_LOG", "debug")
        .output()
        .expect("Failed to execute CLI command");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("opening store"), "stderr: {stderr}");
    let streak: Value = serde_json::from_slice(&output.stdout).expect("stdout is not JSON");
    assert_eq!(streak["currentStreak"], 0);
}
