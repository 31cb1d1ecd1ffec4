//! HTTP API: one resource path, four methods.
//!
//! `/api/issues/{project}` — GET lists with exact-match filters, POST
//! creates, PUT partially updates, DELETE removes. Every response is JSON
//! with HTTP 200; logical failures are signaled in-body.

pub mod wire;

use crate::error::{NotFoundOp, NotFoundReason, Result, TrackerError};
use crate::storage::{IssueFilter, SqliteStorage};
use crate::util::id;
use crate::util::time::parse_filter_date;
use crate::validation;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use wire::{CreateRequest, DeleteRequest, ErrorBody, IssueBody, ResultBody, UpdateRequest};

/// Shared application state: the storage backend behind a mutex, one
/// operation per request.
#[derive(Clone)]
pub struct AppState {
    storage: Arc<Mutex<SqliteStorage>>,
}

impl AppState {
    #[must_use]
    pub fn new(storage: SqliteStorage) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }
}

/// Build the application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/issues/{project}",
            get(list_issues_handler)
                .post(create_issue_handler)
                .put(update_issue_handler)
                .delete(delete_issue_handler),
        )
        .with_state(state)
}

/// Convert a handler error into the in-body JSON error shape (HTTP 200).
fn error_response(err: &TrackerError, supplied_id: Option<&str>) -> Response {
    match err {
        TrackerError::NotFound { op, reason } => {
            debug!(op = op.message(), reason = reason.as_str(), "request failed");
        }
        TrackerError::Validation { message } => {
            debug!(message = %message, "request rejected");
        }
        other => {
            tracing::error!(error = %other, "request failed");
        }
    }
    Json(ErrorBody::from_error(err, supplied_id)).into_response()
}

/// Build an [`IssueFilter`] from raw query parameters.
///
/// Unknown keys and empty values are ignored (`?assigned_to=` narrows
/// nothing); `open` must parse as a boolean and the two date keys as dates.
fn filter_from_query(params: &HashMap<String, String>) -> Result<IssueFilter> {
    let mut filter = IssueFilter::default();
    for (key, value) in params {
        if value.is_empty() {
            continue;
        }
        match key.as_str() {
            "_id" => filter.id = Some(value.clone()),
            "issue_title" => filter.issue_title = Some(value.clone()),
            "issue_text" => filter.issue_text = Some(value.clone()),
            "created_by" => filter.created_by = Some(value.clone()),
            "assigned_to" => filter.assigned_to = Some(value.clone()),
            "status_text" => filter.status_text = Some(value.clone()),
            "open" => filter.open = Some(parse_open(value)?),
            "created_on" => filter.created_on = Some(parse_filter_date(value, "created_on")?),
            "updated_on" => filter.updated_on = Some(parse_filter_date(value, "updated_on")?),
            _ => {}
        }
    }
    Ok(filter)
}

fn parse_open(value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(TrackerError::validation(format!(
            "invalid value for open: {other}"
        ))),
    }
}

async fn list_issues_handler(
    State(state): State<AppState>,
    Path(project): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match try_list(&state, &project, &params).await {
        Ok(issues) => Json(issues).into_response(),
        Err(err) => error_response(&err, None),
    }
}

async fn try_list(
    state: &AppState,
    project_name: &str,
    params: &HashMap<String, String>,
) -> Result<Vec<IssueBody>> {
    let storage = state.storage.lock().await;

    // Unknown project is an empty list, not an error, even when the query
    // string would not parse.
    let Some(project) = storage.find_project(project_name)? else {
        return Ok(vec![]);
    };

    let filter = filter_from_query(params)?;
    let issues = storage.list_issues(&project.id, &filter)?;
    Ok(issues.iter().map(IssueBody::from).collect())
}

async fn create_issue_handler(
    State(state): State<AppState>,
    Path(project): Path<String>,
    body: Bytes,
) -> Response {
    let req: CreateRequest = serde_json::from_slice(&body).unwrap_or_default();
    match try_create(&state, &project, req).await {
        Ok(issue) => Json(issue).into_response(),
        Err(err) => error_response(&err, None),
    }
}

async fn try_create(
    state: &AppState,
    project_name: &str,
    req: CreateRequest,
) -> Result<IssueBody> {
    let draft = req.into_draft();
    validation::validate_draft(&draft)?;

    let mut storage = state.storage.lock().await;
    // Two independent writes: a project created here survives even if the
    // issue insert below fails.
    let project = storage.resolve_or_create_project(project_name)?;
    let issue = storage.create_issue(&project.id, &draft)?;
    Ok(IssueBody::from(&issue))
}

async fn update_issue_handler(
    State(state): State<AppState>,
    Path(project): Path<String>,
    body: Bytes,
) -> Response {
    let req: UpdateRequest = serde_json::from_slice(&body).unwrap_or_default();
    let supplied_id = req.id.clone();
    match try_update(&state, &project, &req).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => error_response(&err, supplied_id.as_deref()),
    }
}

async fn try_update(
    state: &AppState,
    project_name: &str,
    req: &UpdateRequest,
) -> Result<ResultBody> {
    let issue_id = validation::require_id(req.id.as_deref())?.to_string();
    let patch = req.to_patch();
    validation::require_update_fields(&patch)?;

    let mut storage = state.storage.lock().await;
    if storage.find_project(project_name)?.is_none() {
        return Err(TrackerError::not_found(
            NotFoundOp::Update,
            NotFoundReason::ProjectMissing,
        ));
    }
    if !id::is_valid_id(&issue_id) {
        return Err(TrackerError::not_found(
            NotFoundOp::Update,
            NotFoundReason::MalformedId,
        ));
    }
    storage.update_issue(&issue_id, &patch)?;

    Ok(ResultBody {
        result: "successfully updated",
        id: issue_id,
    })
}

async fn delete_issue_handler(
    State(state): State<AppState>,
    Path(project): Path<String>,
    body: Bytes,
) -> Response {
    let req: DeleteRequest = serde_json::from_slice(&body).unwrap_or_default();
    let supplied_id = req.id.clone();
    match try_delete(&state, &project, &req).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => error_response(&err, supplied_id.as_deref()),
    }
}

async fn try_delete(
    state: &AppState,
    project_name: &str,
    req: &DeleteRequest,
) -> Result<ResultBody> {
    let issue_id = validation::require_id(req.id.as_deref())?.to_string();

    let mut storage = state.storage.lock().await;
    if storage.find_project(project_name)?.is_none() {
        return Err(TrackerError::not_found(
            NotFoundOp::Delete,
            NotFoundReason::ProjectMissing,
        ));
    }
    if !id::is_valid_id(&issue_id) {
        return Err(TrackerError::not_found(
            NotFoundOp::Delete,
            NotFoundReason::MalformedId,
        ));
    }
    storage.delete_issue(&issue_id)?;

    Ok(ResultBody {
        result: "successfully deleted",
        id: issue_id,
    })
}
