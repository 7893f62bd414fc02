//! Error types for gradebook operations.
//!
//! Core operations return [`GradebookResult`]; the binary and the interactive
//! shell wrap these in `anyhow` at their boundary.

use std::fmt;
use thiserror::Error;

/// Result type alias for gradebook operations
pub type GradebookResult<T> = Result<T, GradebookError>;

/// Which kind of named entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Course,
    Assignment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Course => f.write_str("course"),
            EntityKind::Assignment => f.write_str("assignment"),
        }
    }
}

/// Main error type for gradebook operations
#[derive(Error, Debug)]
pub enum GradebookError {
    /// A course or assignment with the same (case-insensitive) name exists
    #[error("{kind} '{name}' already exists")]
    DuplicateKey { kind: EntityKind, name: String },

    /// Referenced course or assignment is absent
    #[error("{kind} '{name}' not found")]
    NotFound { kind: EntityKind, name: String },

    /// The mutation would push a course's total weight past 100
    #[error(
        "total weight for '{course}' would be {total} (current {current} + requested {requested}), exceeding 100",
        total = .current + .requested
    )]
    CapacityExceeded {
        course: String,
        current: u32,
        requested: u32,
    },

    /// Name is empty after trimming
    #[error("{kind} name must not be empty")]
    EmptyName { kind: EntityKind },

    /// Name contains a line break or other control character
    #[error("{kind} name {name:?} must not contain control characters")]
    InvalidName { kind: EntityKind, name: String },

    /// Weight or grade outside 0..=100
    #[error("{field} must be between 0 and 100, got {value}")]
    OutOfRange { field: &'static str, value: i64 },

    /// Edit request does not select exactly one edit mode
    #[error("invalid edit: {0}")]
    InvalidEdit(String),

    /// Persistence file could not be parsed
    #[error("malformed gradebook file at line {line}: {message}")]
    MalformedFile { line: usize, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GradebookError {
    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        GradebookError::MalformedFile {
            line,
            message: message.into(),
        }
    }
}
