//! Request and response shapes for the issues API.
//!
//! Every issue leaves the API with all nine visible fields, even when some
//! are empty strings. Errors are served in-body with HTTP 200.

use crate::error::TrackerError;
use crate::model::{Issue, IssueDraft, IssuePatch};
use crate::util::time::format_timestamp;
use crate::validation::non_empty;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// POST body: required and optional creation fields.
///
/// Everything is optional at the parse stage; required-ness is enforced by
/// `validation::validate_draft` so a missing field and an empty field fail
/// the same way.
#[derive(Debug, Default, Deserialize)]
pub struct CreateRequest {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
}

impl CreateRequest {
    /// Turn the raw body into a draft (still unvalidated).
    #[must_use]
    pub fn into_draft(self) -> IssueDraft {
        IssueDraft {
            issue_title: self.issue_title.unwrap_or_default(),
            issue_text: self.issue_text.unwrap_or_default(),
            created_by: self.created_by.unwrap_or_default(),
            assigned_to: self.assigned_to,
            status_text: self.status_text,
        }
    }
}

/// PUT body: target id plus the patch fields.
///
/// `open` captures key *presence*: the legacy contract closes the issue for
/// any supplied value (including `false`), so the deserializer must
/// distinguish "key absent" from every possible value, `null` included.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRequest {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    #[serde(default, deserialize_with = "present_value")]
    pub open: Option<Value>,
}

impl UpdateRequest {
    /// Build the patch, normalizing empty strings to absent.
    #[must_use]
    pub fn to_patch(&self) -> IssuePatch {
        IssuePatch {
            issue_title: non_empty(self.issue_title.clone()),
            issue_text: non_empty(self.issue_text.clone()),
            created_by: non_empty(self.created_by.clone()),
            assigned_to: non_empty(self.assigned_to.clone()),
            status_text: non_empty(self.status_text.clone()),
            open_supplied: self.open.is_some(),
        }
    }
}

/// Wraps any present value (even `null`) in `Some`; `#[serde(default)]`
/// keeps an absent key as `None`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// DELETE body: just the target id.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteRequest {
    #[serde(rename = "_id")]
    pub id: Option<String>,
}

/// The nine-field issue object served by GET and POST.
#[derive(Debug, Serialize)]
pub struct IssueBody {
    #[serde(rename = "_id")]
    pub id: String,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
    pub open: bool,
    pub created_on: String,
    pub updated_on: String,
}

impl From<&Issue> for IssueBody {
    fn from(issue: &Issue) -> Self {
        Self {
            id: issue.id.clone(),
            issue_title: issue.issue_title.clone(),
            issue_text: issue.issue_text.clone(),
            created_by: issue.created_by.clone(),
            assigned_to: issue.assigned_to.clone(),
            status_text: issue.status_text.clone(),
            open: issue.open,
            created_on: format_timestamp(issue.created_at),
            updated_on: format_timestamp(issue.updated_at),
        }
    }
}

/// Success marker for PUT and DELETE.
#[derive(Debug, Serialize)]
pub struct ResultBody {
    pub result: &'static str,
    #[serde(rename = "_id")]
    pub id: String,
}

/// In-body error shape. `_id` is echoed back only for the error kinds the
/// legacy contract echoes it for.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ErrorBody {
    /// Convert an error, echoing the supplied id when the contract calls
    /// for it ("no update field(s) sent", "could not update",
    /// "could not delete").
    #[must_use]
    pub fn from_error(err: &TrackerError, supplied_id: Option<&str>) -> Self {
        let echo = match err {
            TrackerError::NotFound { .. } => true,
            TrackerError::Validation { message } => message == "no update field(s) sent",
            _ => false,
        };
        Self {
            error: err.to_string(),
            id: echo.then(|| supplied_id.unwrap_or_default().to_string()),
        }
    }
}
