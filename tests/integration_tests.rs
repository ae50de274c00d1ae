//! Integration tests for the QAT CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to get a qat command isolated from the user's own configuration
fn qat(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("qat").unwrap();
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".xdg"))
        .env("QAT_AUTHOR", "Test Runner")
        .env_remove("QAT_DATABASE")
        .env_remove("QAT_LOG");
    cmd
}

/// Helper to create a workspace with one project, file and user
fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    qat(tmp.path()).arg("init").assert().success();
    qat(tmp.path())
        .args(["project", "add", "--code", "WEB", "--name", "Website"])
        .assert()
        .success();
    qat(tmp.path())
        .args(["project", "add", "--code", "API", "--name", "Backend"])
        .assert()
        .success();
    qat(tmp.path())
        .args(["file", "add", "test-case", "--project", "WEB", "--name", "Smoke"])
        .assert()
        .success();
    qat(tmp.path())
        .args(["user", "add", "--email", "qa@example.com", "--name", "QA"])
        .assert()
        .success();
    tmp
}

fn write_file(tmp: &TempDir, name: &str, contents: &str) -> String {
    fs::write(tmp.path().join(name), contents).unwrap();
    name.to_string()
}

fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "invalid JSON ({}): {}",
            e,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

const CASES: &str = "projectCode,testCaseIdCode,title,priority,testCaseFileName,author,createdDate\n\
                     WEB,TC-1,Login works,high,smoke,qa@example.com,44197\n\
                     web,TC-2,Logout works,Low,,,2024-01-15\n";

// ============================================================================
// Workspace
// ============================================================================

#[test]
fn test_init_creates_workspace() {
    let tmp = TempDir::new().unwrap();
    qat(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized QAT workspace"));

    assert!(tmp.path().join(".qat/config.yaml").exists());
    assert!(tmp.path().join(".qat/qat.db").exists());
}

#[test]
fn test_init_twice_is_reported() {
    let tmp = TempDir::new().unwrap();
    qat(tmp.path()).arg("init").assert().success();
    qat(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_outside_workspace_fail() {
    let tmp = TempDir::new().unwrap();
    qat(tmp.path())
        .args(["project", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a QAT workspace"));
}

#[test]
fn test_workspace_flag_from_other_directory() {
    let tmp = setup_workspace();
    let elsewhere = TempDir::new().unwrap();

    qat(elsewhere.path())
        .args(["project", "list", "--workspace"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Website"));
}

// ============================================================================
// Reference data
// ============================================================================

#[test]
fn test_project_list_json() {
    let tmp = setup_workspace();
    let projects = json_output(qat(tmp.path()).args(["project", "list", "--format", "json"]));

    let codes: Vec<&str> = projects
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes.len(), 2);
    assert!(codes.contains(&"WEB"));
    assert!(codes.contains(&"API"));
}

#[test]
fn test_duplicate_project_code_rejected() {
    let tmp = setup_workspace();
    qat(tmp.path())
        .args(["project", "add", "--code", "web", "--name", "Again"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot create project"));
}

#[test]
fn test_file_add_requires_known_project() {
    let tmp = setup_workspace();
    qat(tmp.path())
        .args(["file", "add", "defect", "--project", "NOPE", "--name", "Sprint 1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No project matches 'NOPE'"));
}

// ============================================================================
// Import
// ============================================================================

#[test]
fn test_import_template() {
    let tmp = TempDir::new().unwrap();
    qat(tmp.path())
        .args(["import", "defect", "--template"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "projectCode,defectIdCode,title,",
        ));
}

#[test]
fn test_import_creates_then_updates() {
    let tmp = setup_workspace();
    let file = write_file(&tmp, "cases.csv", CASES);

    let first = json_output(qat(tmp.path()).args(["import", "test-case", &file, "--format", "json"]));
    assert_eq!(first["success"], true);
    assert_eq!(first["data"]["summary"]["created"], 2);
    assert_eq!(first["data"]["summary"]["failed"], 0);
    assert_eq!(first["data"]["created"][0]["mode"], "created");
    assert_eq!(first["data"]["created"][0]["row"], 2);

    let second = json_output(qat(tmp.path()).args(["import", "test-case", &file, "--format", "json"]));
    assert_eq!(second["data"]["created"][0]["mode"], "updated");
    assert_eq!(second["data"]["created"][0]["id"], first["data"]["created"][0]["id"]);

    let cases = json_output(qat(tmp.path()).args(["test-case", "list", "--format", "json"]));
    let cases = cases.as_array().unwrap();
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0]["testCaseIdCode"], "TC-1");
    assert_eq!(cases[0]["priority"], "High");
    assert_eq!(cases[0]["createdDate"], "2021-01-01T00:00:00Z");
}

#[test]
fn test_import_human_output() {
    let tmp = setup_workspace();
    let file = write_file(&tmp, "cases.csv", CASES);

    qat(tmp.path())
        .args(["import", "test-case", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("Row 2: created"))
        .stdout(predicate::str::contains("Import Summary"));
}

#[test]
fn test_import_failed_rows_set_exit_status() {
    let tmp = setup_workspace();
    let file = write_file(
        &tmp,
        "cases.csv",
        "projectCode,testCaseIdCode,title\n\
         WEB,TC-1,One\n\
         NOPE,TC-2,Two\n\
         API,TC-3,Three\n",
    );

    qat(tmp.path())
        .args(["import", "test-case", &file])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Row 3: Invalid project reference 'NOPE'",
        ))
        .stderr(predicate::str::contains("1 failed row(s)"));

    let summary = json_output(qat(tmp.path()).args([
        "import",
        "test-case",
        &file,
        "--allow-failures",
        "--format",
        "json",
    ]));
    assert_eq!(summary["data"]["summary"]["created"], 2);
    assert_eq!(summary["data"]["failed"][0]["row"], 3);
}

#[test]
fn test_import_cross_project_file_rejected() {
    let tmp = setup_workspace();
    let files = json_output(qat(tmp.path()).args(["file", "list", "test-case", "--format", "json"]));
    let smoke_id = files[0]["id"].as_i64().unwrap();

    let file = write_file(
        &tmp,
        "cases.csv",
        &format!(
            "projectCode,testCaseIdCode,title,testCaseFileId\nAPI,TC-1,One,{}\n",
            smoke_id
        ),
    );
    let summary = json_output(qat(tmp.path()).args([
        "import",
        "test-case",
        &file,
        "--allow-failures",
        "--format",
        "json",
    ]));
    assert_eq!(
        summary["data"]["failed"][0]["errors"][0],
        format!(
            "Test case file {} belongs to project 'WEB', not 'API'",
            smoke_id
        )
    );
}

#[test]
fn test_import_dry_run_writes_nothing() {
    let tmp = setup_workspace();
    let file = write_file(&tmp, "cases.csv", CASES);

    qat(tmp.path())
        .args(["import", "test-case", &file, "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would create"));

    let cases = json_output(qat(tmp.path()).args(["test-case", "list", "--format", "json"]));
    assert!(cases.as_array().unwrap().is_empty());
}

#[test]
fn test_import_json_defects() {
    let tmp = setup_workspace();
    let file = write_file(
        &tmp,
        "defects.json",
        r#"[
            {"projectCode": "API", "defectIdCode": "D-1", "title": "500 on login",
             "severity": "critical", "status": "open", "reportedDate": 45292,
             "assignedTo": "qa@example.com", "inputData": {"user": "bob"}}
        ]"#,
    );

    qat(tmp.path())
        .args(["import", "defect", &file])
        .assert()
        .success();

    let defects = json_output(qat(tmp.path()).args([
        "defect",
        "list",
        "--severity",
        "critical",
        "--format",
        "json",
    ]));
    let defect = &defects[0];
    assert_eq!(defect["defectIdCode"], "D-1");
    assert_eq!(defect["status"], "Open");
    assert_eq!(defect["inputData"]["user"], "bob");
    assert!(defect["assignedToId"].is_number());
}

#[test]
fn test_import_unknown_extension_needs_format_flag() {
    let tmp = setup_workspace();
    let file = write_file(&tmp, "cases.txt", CASES);

    qat(tmp.path())
        .args(["import", "test-case", &file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--format-in"));

    qat(tmp.path())
        .args(["import", "test-case", &file, "--format-in", "csv"])
        .assert()
        .success();
}

#[test]
fn test_import_is_audited() {
    let tmp = setup_workspace();
    let file = write_file(&tmp, "cases.csv", CASES);
    qat(tmp.path())
        .args(["import", "test-case", &file])
        .assert()
        .success();

    let entries = json_output(qat(tmp.path()).args(["audit", "list", "--format", "json"]));
    let latest = &entries[0];
    assert_eq!(latest["action"], "import");
    assert_eq!(latest["actor"], "Test Runner");
    assert_eq!(latest["entityKind"], "test-case");
    assert_eq!(latest["detail"]["created"], 2);
}

#[test]
fn test_import_summary_survives_audit_failure() {
    let tmp = setup_workspace();
    let file = write_file(&tmp, "cases.csv", CASES);

    let conn = rusqlite::Connection::open(tmp.path().join(".qat/qat.db")).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER audit_log_locked BEFORE INSERT ON audit_log \
         BEGIN SELECT RAISE(ABORT, 'audit log locked'); END;",
    )
    .unwrap();
    drop(conn);

    let summary = json_output(qat(tmp.path()).args(["import", "test-case", &file, "--format", "json"]));
    assert_eq!(summary["data"]["summary"]["created"], 2);

    qat(tmp.path())
        .args(["import", "test-case", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("Import Summary"))
        .stderr(predicate::str::contains("audit log"));

    let cases = json_output(qat(tmp.path()).args(["test-case", "list", "--format", "json"]));
    assert_eq!(cases.as_array().unwrap().len(), 2);
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_round_trips_as_updates() {
    let tmp = setup_workspace();
    let file = write_file(&tmp, "cases.csv", CASES);
    qat(tmp.path())
        .args(["import", "test-case", &file])
        .assert()
        .success();

    qat(tmp.path())
        .args(["export", "test-case", "-o", "exported.csv"])
        .assert()
        .success();

    let exported = fs::read_to_string(tmp.path().join("exported.csv")).unwrap();
    assert!(exported.contains("WEB,TC-1,Login works"));
    assert!(exported.contains("Smoke"));
    assert!(exported.contains("qa@example.com"));

    let summary = json_output(qat(tmp.path()).args([
        "import",
        "test-case",
        "exported.csv",
        "--format",
        "json",
    ]));
    let modes: Vec<&str> = summary["data"]["created"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["mode"].as_str().unwrap())
        .collect();
    assert_eq!(modes, vec!["updated", "updated"]);
}

#[test]
fn test_export_xlsx() {
    let tmp = setup_workspace();
    let file = write_file(&tmp, "cases.csv", CASES);
    qat(tmp.path())
        .args(["import", "test-case", &file])
        .assert()
        .success();

    qat(tmp.path())
        .args(["export", "test-case", "--project", "WEB", "-o", "cases.xlsx"])
        .assert()
        .success();

    let bytes = fs::read(tmp.path().join("cases.xlsx")).unwrap();
    assert_eq!(&bytes[..2], b"PK");

    let summary = json_output(qat(tmp.path()).args([
        "import",
        "test-case",
        "cases.xlsx",
        "--format",
        "json",
    ]));
    assert_eq!(summary["data"]["summary"]["failed"], 0);
    let modes: Vec<&str> = summary["data"]["created"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["mode"].as_str().unwrap())
        .collect();
    assert_eq!(modes, vec!["updated", "updated"]);
}

// ============================================================================
// Misc
// ============================================================================

#[test]
fn test_completions() {
    let tmp = TempDir::new().unwrap();
    qat(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("qat"));
}

#[test]
fn test_config_show_uses_environment_author() {
    let tmp = setup_workspace();
    qat(tmp.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Test Runner"));
}
