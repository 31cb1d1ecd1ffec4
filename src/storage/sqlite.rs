//! `SQLite` storage implementation.

use crate::error::{NotFoundOp, NotFoundReason, Result, TrackerError};
use crate::model::{Issue, IssueDraft, IssuePatch, Project};
use crate::storage::schema::apply_schema;
use crate::util::id;
use crate::util::time::{format_timestamp, parse_db_timestamp};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::time::Duration;

const ISSUE_COLUMNS: &str = "id, project_id, issue_title, issue_text, created_by, \
     assigned_to, status_text, open, created_at, updated_at";

/// SQLite-based storage backend.
///
/// Holds a single connection; callers serialize access (the HTTP layer puts
/// the storage behind a mutex, one operation per request).
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open a new connection to the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema
    /// application fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a new connection with an optional busy timeout (ms).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema
    /// application fails.
    pub fn open_with_timeout(path: &Path, lock_timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;
        if let Some(timeout) = lock_timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        }
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Run a mutation inside an immediate transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the closure or the commit fails. The transaction
    /// is rolled back on error.
    fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let result = f(&tx)?;
        tx.commit()?;
        tracing::debug!(op, "mutation committed");
        Ok(result)
    }

    // === Project directory ===

    /// Look up a project by exact name. Read-only.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn find_project(&self, name: &str) -> Result<Option<Project>> {
        Self::find_project_in(&self.conn, name)
    }

    fn find_project_in(conn: &Connection, name: &str) -> Result<Option<Project>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, created_at FROM projects WHERE name = ? ORDER BY created_at LIMIT 1",
        )?;
        let project = stmt
            .query_row([name], |row| {
                Ok(Project {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: parse_db_timestamp(&row.get::<_, String>(2)?),
                })
            })
            .optional()?;
        Ok(project)
    }

    /// Look up a project by name, creating it when absent.
    ///
    /// Lookup and insert run in one immediate transaction, so within this
    /// process a name never maps to two projects.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn resolve_or_create_project(&mut self, name: &str) -> Result<Project> {
        let name = name.to_string();
        self.mutate("resolve_or_create_project", |tx| {
            if let Some(existing) = Self::find_project_in(tx, &name)? {
                return Ok(existing);
            }

            let created_at = Utc::now();
            let project_id = id::generate(&name, created_at, |candidate| {
                record_exists(tx, "projects", candidate).unwrap_or(false)
            });

            tx.execute(
                "INSERT INTO projects (id, name, created_at) VALUES (?, ?, ?)",
                rusqlite::params![project_id, name, format_timestamp(created_at)],
            )?;

            tracing::info!(project = %name, id = %project_id, "created project");

            Ok(Project {
                id: project_id,
                name,
                created_at,
            })
        })
    }

    // === Issue store ===

    /// Create a new issue under the given project.
    ///
    /// The draft must already be validated; optional fields default to the
    /// empty string and `open` starts true. Both timestamps are set to the
    /// same instant.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_issue(&mut self, project_id: &str, draft: &IssueDraft) -> Result<Issue> {
        let now = Utc::now();
        let project_id = project_id.to_string();
        let draft = draft.clone();

        self.mutate("create_issue", |tx| {
            let issue_id = id::generate(&draft.issue_title, now, |candidate| {
                record_exists(tx, "issues", candidate).unwrap_or(false)
            });

            let issue = Issue {
                id: issue_id,
                project_id: project_id.clone(),
                issue_title: draft.issue_title.clone(),
                issue_text: draft.issue_text.clone(),
                created_by: draft.created_by.clone(),
                assigned_to: draft.assigned_to.clone().unwrap_or_default(),
                status_text: draft.status_text.clone().unwrap_or_default(),
                open: true,
                created_at: now,
                updated_at: now,
            };

            tx.execute(
                "INSERT INTO issues (
                    id, project_id, issue_title, issue_text, created_by,
                    assigned_to, status_text, open, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    issue.id,
                    issue.project_id,
                    issue.issue_title,
                    issue.issue_text,
                    issue.created_by,
                    issue.assigned_to,
                    issue.status_text,
                    i32::from(issue.open),
                    format_timestamp(issue.created_at),
                    format_timestamp(issue.updated_at),
                ],
            )?;

            Ok(issue)
        })
    }

    /// Get an issue by id.
    ///
    /// Lookup is unscoped: ownership is not checked here, matching the
    /// legacy contract for update and delete.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_issue(&self, issue_id: &str) -> Result<Option<Issue>> {
        let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = ?");
        let mut stmt = self.conn.prepare(&sql)?;
        let issue = stmt.query_row([issue_id], issue_from_row).optional()?;
        Ok(issue)
    }

    /// List issues belonging to a project, narrowed by exact-match filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_issues(&self, project_id: &str, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let mut sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE project_id = ?");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(project_id.to_string())];

        if let Some(ref id) = filter.id {
            sql.push_str(" AND id = ?");
            params.push(Box::new(id.clone()));
        }
        if let Some(ref title) = filter.issue_title {
            sql.push_str(" AND issue_title = ?");
            params.push(Box::new(title.clone()));
        }
        if let Some(ref text) = filter.issue_text {
            sql.push_str(" AND issue_text = ?");
            params.push(Box::new(text.clone()));
        }
        if let Some(ref created_by) = filter.created_by {
            sql.push_str(" AND created_by = ?");
            params.push(Box::new(created_by.clone()));
        }
        if let Some(ref assigned_to) = filter.assigned_to {
            sql.push_str(" AND assigned_to = ?");
            params.push(Box::new(assigned_to.clone()));
        }
        if let Some(ref status_text) = filter.status_text {
            sql.push_str(" AND status_text = ?");
            params.push(Box::new(status_text.clone()));
        }
        if let Some(open) = filter.open {
            sql.push_str(" AND open = ?");
            params.push(Box::new(i32::from(open)));
        }
        if let Some(created_on) = filter.created_on {
            sql.push_str(" AND created_at = ?");
            params.push(Box::new(format_timestamp(created_on)));
        }
        if let Some(updated_on) = filter.updated_on {
            sql.push_str(" AND updated_at = ?");
            params.push(Box::new(format_timestamp(updated_on)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
        let issues = stmt
            .query_map(params_refs.as_slice(), issue_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(issues)
    }

    /// Apply a partial update to an issue.
    ///
    /// String fields overwrite only when supplied; `open` is set from key
    /// presence (supplied closes, absent reopens); `updated_at` always
    /// advances.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` (collapsed to "could not update") when no issue
    /// with the id exists, or a database error if the update fails.
    pub fn update_issue(&mut self, issue_id: &str, patch: &IssuePatch) -> Result<Issue> {
        if self.get_issue(issue_id)?.is_none() {
            return Err(TrackerError::not_found(
                NotFoundOp::Update,
                NotFoundReason::IssueMissing,
            ));
        }

        let patch = patch.clone();
        let issue_id_owned = issue_id.to_string();
        self.mutate("update_issue", |tx| {
            let mut set_clauses: Vec<String> = vec![];
            let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![];

            let mut add_update = |field: &str, val: Box<dyn rusqlite::ToSql>| {
                set_clauses.push(format!("{field} = ?"));
                params.push(val);
            };

            if let Some(ref title) = patch.issue_title {
                add_update("issue_title", Box::new(title.clone()));
            }
            if let Some(ref text) = patch.issue_text {
                add_update("issue_text", Box::new(text.clone()));
            }
            if let Some(ref created_by) = patch.created_by {
                add_update("created_by", Box::new(created_by.clone()));
            }
            if let Some(ref assigned_to) = patch.assigned_to {
                add_update("assigned_to", Box::new(assigned_to.clone()));
            }
            if let Some(ref status_text) = patch.status_text {
                add_update("status_text", Box::new(status_text.clone()));
            }

            // Legacy rule: any supplied `open` value closes the issue, an
            // absent key reopens it. Key presence wins over the value.
            add_update("open", Box::new(i32::from(!patch.open_supplied)));

            set_clauses.push("updated_at = ?".to_string());
            params.push(Box::new(format_timestamp(Utc::now())));

            let sql = format!("UPDATE issues SET {} WHERE id = ?", set_clauses.join(", "));
            params.push(Box::new(issue_id_owned.clone()));

            let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
            tx.execute(&sql, params_refs.as_slice())?;

            Ok(())
        })?;

        self.get_issue(issue_id)?.ok_or_else(|| {
            TrackerError::not_found(NotFoundOp::Update, NotFoundReason::IssueMissing)
        })
    }

    /// Permanently remove an issue. Hard delete, no tombstone.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` (collapsed to "could not delete") when no issue
    /// with the id exists.
    pub fn delete_issue(&mut self, issue_id: &str) -> Result<()> {
        let issue_id = issue_id.to_string();
        self.mutate("delete_issue", |tx| {
            let deleted = tx.execute("DELETE FROM issues WHERE id = ?", [&issue_id])?;
            if deleted == 0 {
                return Err(TrackerError::not_found(
                    NotFoundOp::Delete,
                    NotFoundReason::IssueMissing,
                ));
            }
            Ok(())
        })
    }
}

fn record_exists(conn: &Connection, table: &str, record_id: &str) -> Result<bool> {
    // Table name is one of two internal constants, never caller input.
    let sql = format!("SELECT 1 FROM {table} WHERE id = ?");
    let found = conn
        .query_row(&sql, [record_id], |_| Ok(()))
        .optional()?
        .is_some();
    Ok(found)
}

fn issue_from_row(row: &rusqlite::Row) -> rusqlite::Result<Issue> {
    Ok(Issue {
        id: row.get(0)?,
        project_id: row.get(1)?,
        issue_title: row.get(2)?,
        issue_text: row.get(3)?,
        created_by: row.get(4)?,
        assigned_to: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        status_text: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        open: row.get::<_, i32>(7)? != 0,
        created_at: parse_db_timestamp(&row.get::<_, String>(8)?),
        updated_at: parse_db_timestamp(&row.get::<_, String>(9)?),
    })
}

/// Exact-match filter options for listing issues.
///
/// Fields mirror the recognized query keys; `created_on`/`updated_on` are
/// pre-parsed dates compared against the stored timestamps.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub id: Option<String>,
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
    pub created_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
}
