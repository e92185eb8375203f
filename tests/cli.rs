//! Runs the `todo` binary against temporary databases.

#![allow(missing_docs, unused_results)]

use std::path::Path;
use std::process::{Command, Output};

fn todo(home: &Path, db: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_todo"))
        .env("HOME", home)
        .env_remove("TODO_DB_PATH")
        .env_remove("RUST_LOG")
        .arg("-f")
        .arg(db)
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

fn setup() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("data").join("todo.db");
    (dir, db)
}

#[test]
fn add_update_complete_show() {
    let (dir, db) = setup();
    let home = dir.path();

    let out = todo(home, &db, &["add", "hello world"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.starts_with("Task has been added successfully.\n"));
    assert!(text.contains("1 | hello world (Created At: 1 mins ago, Updated At: )"));

    let out = todo(home, &db, &["update", "-i", "1", "-t", "hello japan"]);
    assert_eq!(stdout(&out), "The text of task 1 has changed to \"hello japan\".\n");

    let out = todo(home, &db, &["show", "-a"]);
    assert!(stdout(&out).contains("1 | hello japan (Created At: 1 mins ago, Updated At: 1 mins ago)"));

    let out = todo(home, &db, &["complete", "1"]);
    assert_eq!(stdout(&out), "Task 1 complete.\n");

    assert_eq!(stdout(&todo(home, &db, &["show"])), "No task exist.\n");
    assert!(stdout(&todo(home, &db, &["show", "-c"])).starts_with("1 | hello japan"));
}

#[test]
fn ids_continue_from_highest() {
    let (dir, db) = setup();
    for text in ["a", "b", "c"] {
        todo(dir.path(), &db, &["add", text]);
    }
    todo(dir.path(), &db, &["delete", "2"]);
    let out = todo(dir.path(), &db, &["add", "d"]);
    assert!(stdout(&out).contains("4 | d"));
    assert!(!stdout(&out).contains("2 | b"));
}

#[test]
fn delete_reports_success() {
    let (dir, db) = setup();
    todo(dir.path(), &db, &["add", "gone soon"]);
    let out = todo(dir.path(), &db, &["delete", "1"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "Task 1 is deleted successfully.\n");
}

#[test]
fn missing_id_exits_two() {
    let (dir, db) = setup();
    for args in [
        &["delete", "42"][..],
        &["complete", "42"][..],
        &["update", "-i", "42", "-t", "x"][..],
    ] {
        let out = todo(dir.path(), &db, args);
        assert_eq!(out.status.code(), Some(2));
        assert_eq!(stderr(&out).trim_end(), "This id of task not exist.");
        assert!(stdout(&out).is_empty());
    }
}

#[test]
fn init_clears_tasks() {
    let (dir, db) = setup();
    todo(dir.path(), &db, &["add", "old"]);
    let out = todo(dir.path(), &db, &["--init"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "Todo list initialized successfully.\n");
    assert_eq!(stdout(&todo(dir.path(), &db, &["show", "-a"])), "No task exist.\n");
}

#[test]
fn usage_error_exits_two() {
    let (dir, db) = setup();
    let out = todo(dir.path(), &db, &["delete", "not-a-number"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn unopenable_database_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file, not dir").unwrap();
    let out = todo(dir.path(), &blocker.join("todo.db"), &["show"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Failed to execute todo command..."));
}

#[test]
fn no_arguments_prints_help() {
    let dir = tempfile::tempdir().unwrap();
    let out = Command::new(env!("CARGO_BIN_EXE_todo"))
        .env("HOME", dir.path())
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(stdout(&out).contains("Usage"));
}

#[test]
fn database_path_from_env() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("env.db");
    let out = Command::new(env!("CARGO_BIN_EXE_todo"))
        .env("HOME", dir.path())
        .env("TODO_DB_PATH", &db)
        .args(["add", "from env"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(db.exists());
}

#[test]
fn database_path_from_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("configured.db");
    let settings_dir = dir.path().join(".todo");
    std::fs::create_dir_all(&settings_dir).unwrap();
    std::fs::write(
        settings_dir.join("settings.json"),
        format!(r#"{{"database": {{"path": "{}"}}}}"#, db.display()),
    )
    .unwrap();

    let out = Command::new(env!("CARGO_BIN_EXE_todo"))
        .env("HOME", dir.path())
        .env_remove("TODO_DB_PATH")
        .args(["add", "configured"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(db.exists());
}

#[test]
fn broken_settings_file_keeps_env_database_path() {
    let dir = tempfile::tempdir().unwrap();
    let settings_dir = dir.path().join(".todo");
    std::fs::create_dir_all(&settings_dir).unwrap();
    std::fs::write(settings_dir.join("settings.json"), "{broken").unwrap();
    let db = dir.path().join("env.db");

    let out = Command::new(env!("CARGO_BIN_EXE_todo"))
        .env("HOME", dir.path())
        .env("TODO_DB_PATH", &db)
        .env_remove("RUST_LOG")
        .args(["add", "x"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(db.exists());
    assert!(!settings_dir.join("todo.db").exists());
}
