//! Validation helpers for `trackd`.
//!
//! These routines enforce the request contract and return structured
//! errors without touching storage. Messages are exact wire text.

use crate::error::{Result, TrackerError};
use crate::model::{IssueDraft, IssuePatch};

/// Validate an issue draft: `issue_title`, `issue_text`, and `created_by`
/// must all be present and non-empty.
///
/// # Errors
///
/// Returns `Validation("required field(s) missing")` when any required
/// field is missing or empty.
pub fn validate_draft(draft: &IssueDraft) -> Result<()> {
    if draft.issue_title.is_empty() || draft.issue_text.is_empty() || draft.created_by.is_empty() {
        return Err(TrackerError::validation("required field(s) missing"));
    }
    Ok(())
}

/// Require a non-empty `_id` from a request body.
///
/// # Errors
///
/// Returns `Validation("missing _id")` when the id is absent or empty.
pub fn require_id(id: Option<&str>) -> Result<&str> {
    match id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(TrackerError::validation("missing _id")),
    }
}

/// Reject a patch that carries nothing to change.
///
/// # Errors
///
/// Returns `Validation("no update field(s) sent")` when every string field
/// is absent and the `open` key was not supplied.
pub fn require_update_fields(patch: &IssuePatch) -> Result<()> {
    if patch.is_empty() {
        return Err(TrackerError::validation("no update field(s) sent"));
    }
    Ok(())
}

/// Drop empty strings so patches follow the uniform
/// set-if-present-and-non-empty rule.
#[must_use]
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
