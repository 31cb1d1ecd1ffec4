//! trackd: a minimal issue-tracking REST API over `SQLite`.
//!
//! Issues are created, listed, partially updated, and deleted under a
//! project named in the URL path. The crate splits into a project
//! directory plus issue store ([`storage`]), the HTTP surface ([`api`]),
//! and the supporting model, validation, and utility modules.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;
pub mod util;
pub mod validation;

pub use error::{Result, TrackerError};
pub use model::{Issue, IssueDraft, IssuePatch, Project};
pub use storage::{IssueFilter, SqliteStorage};
