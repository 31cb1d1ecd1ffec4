//! Error types and handling for `trackd`.
//!
//! The external API deliberately collapses several failure conditions into a
//! single message per operation ("could not update" / "could not delete"),
//! so `NotFound` keeps an internal [`NotFoundReason`] for diagnostics while
//! its `Display` output is the exact wire text.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - `Display` strings for `Validation` and `NotFound` are the exact JSON
//!   error bodies served by the API
//! - Supports `anyhow` integration for binary-level setup code

use thiserror::Error;

/// Which mutating operation a `NotFound` error belongs to.
///
/// The wire message depends only on the operation, never on the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundOp {
    Update,
    Delete,
}

impl NotFoundOp {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Update => "could not update",
            Self::Delete => "could not delete",
        }
    }
}

/// Why a lookup failed. Logged, never serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The project named in the URL does not exist.
    ProjectMissing,
    /// The supplied `_id` is not a 24-character word token.
    MalformedId,
    /// No issue with the supplied `_id` exists.
    IssueMissing,
}

impl NotFoundReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProjectMissing => "project_missing",
            Self::MalformedId => "malformed_id",
            Self::IssueMissing => "issue_missing",
        }
    }
}

/// Primary error type for `trackd` operations.
#[derive(Error, Debug)]
pub enum TrackerError {
    // === Caller input ===
    /// Caller-supplied input missing or malformed. The message is the exact
    /// wire text ("required field(s) missing", "missing _id",
    /// "no update field(s) sent").
    #[error("{message}")]
    Validation { message: String },

    /// Referenced project or issue does not exist, or the id failed the
    /// shape check. Conditions are collapsed into one message per operation.
    #[error("{}", .op.message())]
    NotFound {
        op: NotFoundOp,
        reason: NotFoundReason,
    },

    // === Infrastructure ===
    /// `SQLite` database error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Wrapped anyhow error for setup code.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrackerError {
    /// Create a validation error with an exact wire message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error for the given operation and reason.
    #[must_use]
    pub const fn not_found(op: NotFoundOp, reason: NotFoundReason) -> Self {
        Self::NotFound { op, reason }
    }

    /// Can the user fix this by changing the request?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::NotFound { .. })
    }
}

/// Result type using `TrackerError`.
pub type Result<T> = std::result::Result<T, TrackerError>;
