#![allow(deprecated)] // cargo_bin! macro doesn't exist yet in assert_cmd 2.1

use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn wt(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("wt").unwrap();
    cmd.arg("--root").arg(root).arg("--json");
    cmd.env_remove("WT_ROOT").env_remove("RUST_LOG");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

fn save(root: &Path, name: &str, entries: &str) {
    wt(root)
        .args(["save", name])
        .write_stdin(entries)
        .assert()
        .success();
}

#[test]
fn test_save_from_stdin_then_list() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("WordTables");

    let outcome = stdout_json(
        wt(&root)
            .args(["save", "第1课"])
            .write_stdin(r#"[{"japanese":"猫","chinese":"猫","part_of_speech":"名词"}]"#),
    );
    assert_eq!(outcome["word_count"], 1);
    assert_eq!(outcome["replaced"], false);

    let list = stdout_json(wt(&root).arg("list"));
    assert_eq!(list["count"], 1);
    assert_eq!(list["sheets"][0]["Name"], "第1课");
    assert_eq!(list["sheets"][0]["WordCount"], 1);
    assert!(root.join("sheets_index.json").is_file());
}

#[test]
fn test_list_order() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let entry = r#"[{"japanese":"一","chinese":"一"}]"#;
    for name in ["apple", "sheet10", "sheet2"] {
        save(root, name, entry);
    }

    let list = stdout_json(wt(root).arg("list"));
    let names: Vec<_> = list["sheets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["Name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["sheet2", "sheet10", "apple"]);
}

#[test]
fn test_import_workbook() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("WordTables");
    let book = temp_dir.path().join("book.json");
    fs::write(
        &book,
        r#"[
            {"sheet": "N5", "words": [{"japanese":"猫","chinese":"猫"},{"japanese":"犬","chinese":"狗"}]},
            {"sheet": "N4", "words": [{"japanese":"走る","chinese":"跑","part_of_speech":"动词"}]},
            {"sheet": "Blank", "words": []}
        ]"#,
    )
    .unwrap();

    let summary = stdout_json(wt(&root).arg("import").arg(&book));

    assert_eq!(summary["created"], 2);
    assert_eq!(summary["overwritten"], 0);
    assert_eq!(summary["total_words"], 3);
    assert_eq!(summary["skipped_empty"][0], "Blank");

    let words = stdout_json(wt(&root).args(["words", "N4"]));
    assert_eq!(words["words"][0]["japanese"], "走る");
    assert_eq!(words["words"][0]["part_of_speech"], "动词");
}

#[test]
fn test_exists_exit_codes() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    save(root, "N5", r#"[{"japanese":"猫","chinese":"猫"}]"#);

    wt(root).args(["exists", "N5"]).assert().success();
    let output = wt(root).args(["exists", "N1"]).assert().code(3).get_output().stderr.clone();

    let error: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(error["error"]["code"], "SHEET_NOT_FOUND");
}

#[test]
fn test_invalid_sheet_name_is_validation_error() {
    let temp_dir = TempDir::new().unwrap();

    wt(temp_dir.path())
        .args(["save", ".."])
        .write_stdin("[]")
        .assert()
        .code(4);
}

#[test]
fn test_malformed_input_is_rejected() {
    let temp_dir = TempDir::new().unwrap();

    wt(temp_dir.path())
        .args(["save", "N5"])
        .write_stdin("{not json")
        .assert()
        .code(4);
    assert!(!temp_dir.path().join("N5").exists());
}

#[test]
fn test_status_reports_first_word() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    let empty = stdout_json(wt(root).arg("status"));
    assert_eq!(empty["has_sheets"], false);

    save(root, "Lesson 2", r#"[{"japanese":"二","chinese":"二"}]"#);
    save(root, "Lesson 10", r#"[{"japanese":"十","chinese":"十"}]"#);

    let status = stdout_json(wt(root).arg("status"));
    assert_eq!(status["has_sheets"], true);
    assert_eq!(status["sheet_count"], 2);
    assert_eq!(status["first_sheet"], "Lesson 2");
    assert_eq!(status["first_word"]["japanese"], "二");
}

#[test]
fn test_refresh_recovers_from_corrupt_index() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    save(root, "N5", r#"[{"japanese":"猫","chinese":"猫"}]"#);
    fs::write(root.join("sheets_index.json"), "[{broken").unwrap();

    let list = stdout_json(wt(root).arg("list"));
    assert_eq!(list["count"], 1);

    let refreshed = stdout_json(wt(root).arg("refresh"));
    assert_eq!(refreshed["count"], 1);
}

#[test]
fn test_delete_all_requires_confirmation() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    save(root, "N5", r#"[{"japanese":"猫","chinese":"猫"}]"#);

    wt(root).arg("delete-all").assert().code(4);
    assert!(root.join("N5").exists());

    let report = stdout_json(wt(root).args(["delete-all", "--yes"]));
    assert_eq!(report["removed_dirs"], 1);
    assert_eq!(report["index_removed"], true);
    assert!(!root.join("N5").exists());

    let list = stdout_json(wt(root).arg("list"));
    assert_eq!(list["count"], 0);
}

#[test]
fn test_version_json() {
    let temp_dir = TempDir::new().unwrap();
    let version = stdout_json(wt(temp_dir.path()).arg("version"));
    assert_eq!(version["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_completions_for_bash() {
    let output = Command::cargo_bin("wt")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let script = String::from_utf8(output).unwrap();
    assert!(script.contains("delete-all"));
}
