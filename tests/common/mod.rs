#![allow(dead_code)]

pub mod fixtures;

use std::sync::Once;
use tempfile::TempDir;
use trackd::api::{self, AppState};
use trackd::storage::SqliteStorage;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(trackd::logging::init_test_logging);
}

pub fn test_db() -> SqliteStorage {
    init_test_logging();
    SqliteStorage::open_memory().expect("Failed to create test database")
}

pub fn test_db_with_dir() -> (SqliteStorage, TempDir) {
    init_test_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("trackd.db");
    let storage = SqliteStorage::open(&db_path).expect("Failed to create test database");
    (storage, dir)
}

/// In-process router over a fresh in-memory database.
pub fn test_app() -> axum::Router {
    init_test_logging();
    api::router(AppState::new(
        SqliteStorage::open_memory().expect("Failed to create test database"),
    ))
}
