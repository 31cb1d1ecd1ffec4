//! Core data types for `trackd`.
//!
//! This module defines the fundamental types used throughout the application:
//! - `Project` - A named grouping that scopes a set of issues
//! - `Issue` - The tracked work item
//! - `IssueDraft` - Input for issue creation
//! - `IssuePatch` - Partial update applied to an existing issue

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named grouping that scopes a set of issues.
///
/// Created lazily on the first successful issue creation for a
/// previously-unseen name. Never updated or deleted through the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    /// Unique ID (24-character token).
    pub id: String,

    /// Human-readable name, used as the URL path segment.
    pub name: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// The primary issue entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    /// Unique ID (24-character token), immutable.
    pub id: String,

    /// Owning project, set at creation and never changed.
    pub project_id: String,

    /// Title, required non-empty at creation.
    pub issue_title: String,

    /// Body text, required non-empty at creation.
    pub issue_text: String,

    /// Creator, required non-empty at creation.
    pub created_by: String,

    /// Assignee, defaults to the empty string.
    #[serde(default)]
    pub assigned_to: String,

    /// Free-form status note, defaults to the empty string.
    #[serde(default)]
    pub status_text: String,

    /// Open/closed state, defaults to true at creation.
    pub open: bool,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp, advanced on every mutation.
    pub updated_at: DateTime<Utc>,
}

/// Validated input for issue creation.
///
/// Required-field checks happen in [`crate::validation`] before a draft
/// reaches storage; optional fields default to the empty string there.
#[derive(Debug, Clone, Default)]
pub struct IssueDraft {
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
}

/// Fields to change on an existing issue.
///
/// Each string field follows a uniform rule: it overwrites the stored value
/// only when supplied non-empty (builders normalize empty strings to
/// `None`). The `open` flag does not follow that rule: the legacy contract
/// closes the issue whenever the request carried *any* value under the
/// `open` key, and reopens it whenever the key was absent, so the patch
/// records key presence rather than a boolean.
#[derive(Debug, Clone, Default)]
pub struct IssuePatch {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    /// True when the request body contained an `open` key, whatever its value.
    pub open_supplied: bool,
}

impl IssuePatch {
    /// A patch with no string fields and no `open` key is rejected upstream
    /// with "no update field(s) sent".
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.issue_title.is_none()
            && self.issue_text.is_none()
            && self.created_by.is_none()
            && self.assigned_to.is_none()
            && self.status_text.is_none()
            && !self.open_supplied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_issue() -> Issue {
        Issue {
            id: "5f4e3d2c1b0a998877665544".to_string(),
            project_id: "aabbccddeeff001122334455".to_string(),
            issue_title: "Test Issue".to_string(),
            issue_text: "Something broke".to_string(),
            created_by: "alice".to_string(),
            assigned_to: String::new(),
            status_text: String::new(),
            open: true,
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            updated_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn issue_serialization_keeps_empty_strings() {
        let issue = sample_issue();
        let json = serde_json::to_string(&issue).unwrap();
        assert!(json.contains("\"issue_title\":\"Test Issue\""));
        assert!(json.contains("\"assigned_to\":\"\""));
        assert!(json.contains("\"status_text\":\"\""));
        assert!(json.contains("\"open\":true"));
    }

    #[test]
    fn issue_deserialize_defaults_optional_strings() {
        let json = r#"{
            "id": "5f4e3d2c1b0a998877665544",
            "project_id": "aabbccddeeff001122334455",
            "issue_title": "Test",
            "issue_text": "Body",
            "created_by": "alice",
            "open": true,
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        }"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.assigned_to, "");
        assert_eq!(issue.status_text, "");
    }

    #[test]
    fn empty_patch_is_empty() {
        assert!(IssuePatch::default().is_empty());
    }

    #[test]
    fn open_key_alone_makes_patch_non_empty() {
        let patch = IssuePatch {
            open_supplied: true,
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn string_field_makes_patch_non_empty() {
        let patch = IssuePatch {
            status_text: Some("in review".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
