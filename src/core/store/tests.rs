//! Store tests against an in-memory database

use chrono::{TimeZone, Utc};
use serde_json::json;

use super::*;
use crate::core::entity::{DefectStatus, Priority, Severity};
use crate::entities::{DefectDraft, EntityKind, TestCaseDraft};

fn test_case_draft(project_id: i64, code: &str) -> TestCaseDraft {
    TestCaseDraft {
        project_id,
        test_case_id_code: code.to_string(),
        title: "Login works".to_string(),
        description: None,
        module: Some("auth".to_string()),
        preconditions: None,
        steps: Some("1. open\n2. log in".to_string()),
        expected_result: None,
        priority: Some(Priority::High),
        severity: None,
        complexity: None,
        status: None,
        estimated_minutes: Some(15),
        test_data: Some(json!({"user": "alice"})),
        file_id: None,
        author_id: None,
        created_date: Some(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()),
    }
}

fn defect_draft(project_id: i64, code: &str) -> DefectDraft {
    DefectDraft {
        project_id,
        defect_id_code: code.to_string(),
        title: "Crash on save".to_string(),
        description: None,
        module: None,
        steps_to_reproduce: None,
        expected_result: None,
        actual_result: None,
        environment: Some("staging".to_string()),
        severity: Some(Severity::Critical),
        priority: None,
        status: Some(DefectStatus::Open),
        test_case_id_code: None,
        input_data: None,
        file_id: None,
        assigned_to_id: None,
        reported_by_id: None,
        reported_date: None,
        due_date: None,
        resolved_date: None,
    }
}

#[test]
fn test_schema_is_idempotent() {
    let mut store = Store::open_in_memory().unwrap();
    store.init_schema().unwrap();
    store.init_schema().unwrap();
}

#[test]
fn test_open_on_disk_creates_parent_directories() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested/dir/qa.db");
    let mut store = Store::open(&path).unwrap();
    store.create_project("WEB", "Website", None).unwrap();
    drop(store);

    let store = Store::open(&path).unwrap();
    assert_eq!(store.list_projects().unwrap().len(), 1);
}

#[test]
fn test_project_code_is_unique_case_insensitively() {
    let mut store = Store::open_in_memory().unwrap();
    store.create_project("WEB", "Website", None).unwrap();
    assert!(store.create_project("web", "Other", None).is_err());
}

#[test]
fn test_parent_files_scoped_by_kind_and_project() {
    let mut store = Store::open_in_memory().unwrap();
    let web = store.create_project("WEB", "Website", None).unwrap();
    let api = store.create_project("API", "Backend", None).unwrap();

    store
        .create_parent_file(EntityKind::TestCase, web.id, "Smoke")
        .unwrap();
    store
        .create_parent_file(EntityKind::TestCase, api.id, "Smoke")
        .unwrap();
    store
        .create_parent_file(EntityKind::Defect, web.id, "Sprint 1")
        .unwrap();

    assert_eq!(
        store
            .list_parent_files(EntityKind::TestCase, None)
            .unwrap()
            .len(),
        2
    );
    let web_defect_files = store
        .list_parent_files(EntityKind::Defect, Some(web.id))
        .unwrap();
    assert_eq!(web_defect_files.len(), 1);
    assert_eq!(web_defect_files[0].kind, EntityKind::Defect);

    // Same name twice in one project is rejected
    assert!(store
        .create_parent_file(EntityKind::TestCase, web.id, "smoke")
        .is_err());
}

#[test]
fn test_test_case_insert_update_round_trip() {
    let mut store = Store::open_in_memory().unwrap();
    let project = store.create_project("WEB", "Website", None).unwrap();

    let draft = test_case_draft(project.id, "TC-1");
    let id = store.insert_test_case(&draft).unwrap();
    assert_eq!(store.find_test_case_id(project.id, "TC-1").unwrap(), Some(id));
    assert_eq!(store.find_test_case_id(project.id, "TC-2").unwrap(), None);

    let stored = store.get_test_case(id).unwrap().unwrap();
    assert_eq!(stored.fields, draft);

    // Full-field update clears fields left empty
    let mut changed = test_case_draft(project.id, "TC-1");
    changed.title = "Login still works".to_string();
    changed.module = None;
    changed.test_data = None;
    store.update_test_case(id, &changed).unwrap();

    let stored = store.get_test_case(id).unwrap().unwrap();
    assert_eq!(stored.fields.title, "Login still works");
    assert_eq!(stored.fields.module, None);
    assert_eq!(stored.fields.test_data, None);
    assert!(stored.updated_at >= stored.created_at);
}

#[test]
fn test_natural_key_is_unique() {
    let mut store = Store::open_in_memory().unwrap();
    let project = store.create_project("WEB", "Website", None).unwrap();

    store.insert_defect(&defect_draft(project.id, "D-1")).unwrap();
    let err = store
        .insert_defect(&defect_draft(project.id, "D-1"))
        .unwrap_err();
    assert!(err.to_string().contains("UNIQUE constraint failed"));
}

#[test]
fn test_update_missing_row_fails() {
    let mut store = Store::open_in_memory().unwrap();
    let project = store.create_project("WEB", "Website", None).unwrap();
    assert!(store
        .update_defect(42, &defect_draft(project.id, "D-1"))
        .is_err());
}

#[test]
fn test_list_defects_filters() {
    let mut store = Store::open_in_memory().unwrap();
    let web = store.create_project("WEB", "Website", None).unwrap();
    let api = store.create_project("API", "Backend", None).unwrap();

    store.insert_defect(&defect_draft(web.id, "D-1")).unwrap();
    let mut closed = defect_draft(web.id, "D-2");
    closed.status = Some(DefectStatus::Closed);
    store.insert_defect(&closed).unwrap();
    store.insert_defect(&defect_draft(api.id, "D-1")).unwrap();

    let all = store.list_defects(&TargetFilter::default()).unwrap();
    assert_eq!(all.len(), 3);

    let web_open = store
        .list_defects(&TargetFilter {
            project_id: Some(web.id),
            status: Some("Open".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(web_open.len(), 1);
    assert_eq!(web_open[0].fields.defect_id_code, "D-1");
}

#[test]
fn test_audit_log_newest_first() {
    let mut store = Store::open_in_memory().unwrap();
    store
        .record_audit("alice", "create", "project", Some(1), &json!({"code": "WEB"}))
        .unwrap();
    store
        .record_audit("bob", "import", "defect", None, &json!({"created": 3}))
        .unwrap();

    let entries = store.list_audit(10).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].actor, "bob");
    assert_eq!(entries[0].detail["created"], 3);
    assert_eq!(entries[1].entity_id, Some(1));

    assert_eq!(store.list_audit(1).unwrap().len(), 1);
}

#[test]
fn test_format_timestamp_uses_millis_and_z() {
    let dt = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(format_timestamp(&dt), "2021-01-01T00:00:00.000Z");
}

#[test]
fn test_corrupt_stored_timestamp_is_an_error() {
    let mut store = Store::open_in_memory().unwrap();
    store.create_project("WEB", "Website", None).unwrap();
    store
        .conn
        .execute("UPDATE projects SET created_at = 'yesterday'", [])
        .unwrap();

    let err = store.list_projects().unwrap_err();
    assert!(matches!(
        err,
        StoreError::Sqlite(rusqlite::Error::FromSqlConversionFailure(4, _, _))
    ));
}
