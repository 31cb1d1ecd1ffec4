//! Shared test fixtures.

use trackd::model::{IssueDraft, IssuePatch};

/// A draft with all required fields set and no optional ones.
pub fn draft(title: &str) -> IssueDraft {
    IssueDraft {
        issue_title: title.to_string(),
        issue_text: "test_text".to_string(),
        created_by: "test_creator".to_string(),
        assigned_to: None,
        status_text: None,
    }
}

/// A draft with every field populated.
pub fn full_draft(title: &str) -> IssueDraft {
    IssueDraft {
        issue_title: title.to_string(),
        issue_text: "test_text".to_string(),
        created_by: "test_creator".to_string(),
        assigned_to: Some("test_assigned_to".to_string()),
        status_text: Some("test_status_text".to_string()),
    }
}

/// A patch that only closes the issue (bare `open` key).
pub fn close_patch() -> IssuePatch {
    IssuePatch {
        open_supplied: true,
        ..Default::default()
    }
}
