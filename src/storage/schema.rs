//! Database schema definitions.

use rusqlite::{Connection, Result};

/// The complete SQL schema for the trackd database.
///
/// Optional text fields use NOT NULL DEFAULT '' because the API contract
/// serves empty strings, never nulls.
pub const SCHEMA_SQL: &str = r"
    -- Projects table
    CREATE TABLE IF NOT EXISTS projects (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_projects_name ON projects(name);

    -- Issues table
    CREATE TABLE IF NOT EXISTS issues (
        id TEXT PRIMARY KEY,
        project_id TEXT NOT NULL,
        issue_title TEXT NOT NULL,
        issue_text TEXT NOT NULL,
        created_by TEXT NOT NULL,
        assigned_to TEXT NOT NULL DEFAULT '',
        status_text TEXT NOT NULL DEFAULT '',
        open INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        CHECK (length(issue_title) >= 1),
        CHECK (length(issue_text) >= 1),
        CHECK (length(created_by) >= 1),
        FOREIGN KEY (project_id) REFERENCES projects(id)
    );

    CREATE INDEX IF NOT EXISTS idx_issues_project_id ON issues(project_id);
    CREATE INDEX IF NOT EXISTS idx_issues_open ON issues(open);
    CREATE INDEX IF NOT EXISTS idx_issues_created_at ON issues(created_at);
    CREATE INDEX IF NOT EXISTS idx_issues_updated_at ON issues(updated_at);
";

/// Apply the schema to the database.
///
/// This uses `execute_batch` to run the entire DDL script.
/// It is idempotent because all statements use `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set journal mode to WAL for concurrency
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // Enable foreign keys
    conn.pragma_update(None, "foreign_keys", "ON")?;

    Ok(())
}
