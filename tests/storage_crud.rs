//! Storage CRUD tests with real `SQLite` (no mocks).
//!
//! Covers project resolution, `create_issue`, `get_issue`, `update_issue`,
//! and `delete_issue`, including the key-presence rule for `open`.

mod common;

use common::{fixtures, test_db, test_db_with_dir};
use std::thread::sleep;
use std::time::Duration;
use trackd::model::IssuePatch;
use trackd::storage::SqliteStorage;

// ============================================================================
// PROJECT DIRECTORY
// ============================================================================

#[test]
fn resolve_or_create_returns_same_project_for_same_name() {
    let mut storage = test_db();
    let first = storage.resolve_or_create_project("apitest").unwrap();
    let second = storage.resolve_or_create_project("apitest").unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.name, "apitest");
}

#[test]
fn distinct_names_get_distinct_projects() {
    let mut storage = test_db();
    let a = storage.resolve_or_create_project("alpha").unwrap();
    let b = storage.resolve_or_create_project("beta").unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn find_project_does_not_create() {
    let storage = test_db();
    assert!(storage.find_project("never-seen").unwrap().is_none());
}

// ============================================================================
// CREATE / GET
// ============================================================================

#[test]
fn create_issue_roundtrip() {
    let mut storage = test_db();
    let project = storage.resolve_or_create_project("apitest").unwrap();

    let created = storage
        .create_issue(&project.id, &fixtures::full_draft("full"))
        .unwrap();

    let retrieved = storage.get_issue(&created.id).unwrap().expect("issue exists");
    assert_eq!(retrieved, created);
    assert_eq!(retrieved.project_id, project.id);
    assert_eq!(retrieved.assigned_to, "test_assigned_to");
    assert_eq!(retrieved.status_text, "test_status_text");
}

#[test]
fn create_issue_defaults_optional_fields_and_open() {
    let mut storage = test_db();
    let project = storage.resolve_or_create_project("apitest").unwrap();

    let issue = storage
        .create_issue(&project.id, &fixtures::draft("minimal"))
        .unwrap();

    assert!(issue.open);
    assert_eq!(issue.assigned_to, "");
    assert_eq!(issue.status_text, "");
    assert_eq!(issue.created_at, issue.updated_at);
}

#[test]
fn created_ids_are_unique() {
    let mut storage = test_db();
    let project = storage.resolve_or_create_project("apitest").unwrap();

    let a = storage
        .create_issue(&project.id, &fixtures::draft("same title"))
        .unwrap();
    let b = storage
        .create_issue(&project.id, &fixtures::draft("same title"))
        .unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn get_missing_issue_is_none() {
    let storage = test_db();
    assert!(
        storage
            .get_issue("5f4e3d2c1b0a998877665544")
            .unwrap()
            .is_none()
    );
}

// ============================================================================
// UPDATE
// ============================================================================

#[test]
fn update_overwrites_only_supplied_fields() {
    let mut storage = test_db();
    let project = storage.resolve_or_create_project("apitest").unwrap();
    let issue = storage
        .create_issue(&project.id, &fixtures::full_draft("before"))
        .unwrap();

    let patch = IssuePatch {
        issue_title: Some("after".to_string()),
        status_text: Some("in review".to_string()),
        open_supplied: true,
        ..Default::default()
    };
    let updated = storage.update_issue(&issue.id, &patch).unwrap();

    assert_eq!(updated.issue_title, "after");
    assert_eq!(updated.status_text, "in review");
    // Untouched fields survive.
    assert_eq!(updated.issue_text, issue.issue_text);
    assert_eq!(updated.created_by, issue.created_by);
    assert_eq!(updated.assigned_to, "test_assigned_to");
}

#[test]
fn supplied_open_key_closes_issue() {
    let mut storage = test_db();
    let project = storage.resolve_or_create_project("apitest").unwrap();
    let issue = storage
        .create_issue(&project.id, &fixtures::draft("closing"))
        .unwrap();

    let updated = storage.update_issue(&issue.id, &fixtures::close_patch()).unwrap();
    assert!(!updated.open);
}

#[test]
fn absent_open_key_reopens_issue() {
    let mut storage = test_db();
    let project = storage.resolve_or_create_project("apitest").unwrap();
    let issue = storage
        .create_issue(&project.id, &fixtures::draft("reopening"))
        .unwrap();

    storage.update_issue(&issue.id, &fixtures::close_patch()).unwrap();

    let patch = IssuePatch {
        status_text: Some("back again".to_string()),
        ..Default::default()
    };
    let updated = storage.update_issue(&issue.id, &patch).unwrap();
    assert!(updated.open);
}

#[test]
fn update_advances_updated_at() {
    let mut storage = test_db();
    let project = storage.resolve_or_create_project("apitest").unwrap();
    let issue = storage
        .create_issue(&project.id, &fixtures::draft("timestamps"))
        .unwrap();

    // Stored timestamps have millisecond precision.
    sleep(Duration::from_millis(5));

    let updated = storage.update_issue(&issue.id, &fixtures::close_patch()).unwrap();
    assert!(updated.updated_at > issue.updated_at);
    assert_eq!(updated.created_at, issue.created_at);
}

#[test]
fn repeated_update_is_observably_idempotent() {
    let mut storage = test_db();
    let project = storage.resolve_or_create_project("apitest").unwrap();
    let issue = storage
        .create_issue(&project.id, &fixtures::draft("idempotent"))
        .unwrap();

    let patch = IssuePatch {
        issue_title: Some("patched".to_string()),
        open_supplied: true,
        ..Default::default()
    };
    let once = storage.update_issue(&issue.id, &patch).unwrap();
    let twice = storage.update_issue(&issue.id, &patch).unwrap();

    assert_eq!(once.issue_title, twice.issue_title);
    assert_eq!(once.issue_text, twice.issue_text);
    assert_eq!(once.open, twice.open);
    assert_eq!(once.assigned_to, twice.assigned_to);
    assert_eq!(once.status_text, twice.status_text);
}

#[test]
fn update_missing_issue_fails_collapsed() {
    let mut storage = test_db();
    let err = storage
        .update_issue("5f4e3d2c1b0a998877665544", &fixtures::close_patch())
        .unwrap_err();
    assert_eq!(err.to_string(), "could not update");
}

// ============================================================================
// DELETE
// ============================================================================

#[test]
fn delete_removes_issue_permanently() {
    let mut storage = test_db();
    let project = storage.resolve_or_create_project("apitest").unwrap();
    let issue = storage
        .create_issue(&project.id, &fixtures::draft("doomed"))
        .unwrap();

    storage.delete_issue(&issue.id).unwrap();
    assert!(storage.get_issue(&issue.id).unwrap().is_none());
}

#[test]
fn double_delete_fails_collapsed() {
    let mut storage = test_db();
    let project = storage.resolve_or_create_project("apitest").unwrap();
    let issue = storage
        .create_issue(&project.id, &fixtures::draft("doomed"))
        .unwrap();

    storage.delete_issue(&issue.id).unwrap();
    let err = storage.delete_issue(&issue.id).unwrap_err();
    assert_eq!(err.to_string(), "could not delete");
}

// ============================================================================
// PERSISTENCE ACROSS REOPEN
// ============================================================================

#[test]
fn data_survives_reopen() {
    let (mut storage, dir) = test_db_with_dir();
    let project = storage.resolve_or_create_project("apitest").unwrap();
    let issue = storage
        .create_issue(&project.id, &fixtures::draft("persistent"))
        .unwrap();
    drop(storage);

    let reopened = SqliteStorage::open(&dir.path().join("trackd.db")).unwrap();
    let retrieved = reopened.get_issue(&issue.id).unwrap().expect("issue exists");
    assert_eq!(retrieved.issue_title, "persistent");
    assert_eq!(
        reopened.find_project("apitest").unwrap().unwrap().id,
        project.id
    );
}
