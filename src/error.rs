// File: ./src/error.rs
//! Error and warning types of the task-line codec and file operations.
use crate::model::DateKind;
use std::path::PathBuf;
use thiserror::Error;

/// Why a line could not be decoded as a task.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The line does not start with a `- [ ]` style checkbox marker.
    #[error("line is not a task")]
    NotATask,

    #[error("task line contains an embedded newline")]
    EmbeddedNewline,
}

/// Recoverable irregularities found while parsing. The first occurrence of a
/// repeated token is authoritative.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum Warning {
    #[error("more than one priority marker, the first one wins")]
    MultiplePriority,

    #[error("more than one {0} date, the first one wins")]
    MultipleDateToken(DateKind),

    #[error("more than one recurrence, the first one wins")]
    MultipleRecurrence,

    /// A reserved emoji without a usable value (e.g. `📅 tomorrow`).
    #[error("'{0}' is not followed by a valid value")]
    DanglingToken(char),
}

/// Failures of the file-store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum MutationError {
    /// No checkbox marker to operate on; the caller must not write back.
    #[error("line has no recognizable task marker")]
    MalformedLine,

    #[error("line {line} is out of range (file has {len} lines)")]
    LineOutOfRange { line: usize, len: usize },

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The value would not survive a parse/serialize round-trip.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The edited line cannot be written so that it reads back as intended,
    /// e.g. when removing a token would glue two text fragments into a new
    /// token.
    #[error("edit cannot be written without changing other fields")]
    Unrepresentable,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for MutationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(path) => MutationError::FileNotFound(path),
            other => MutationError::Store(other),
        }
    }
}

impl From<ParseError> for MutationError {
    fn from(_: ParseError) -> Self {
        MutationError::MalformedLine
    }
}

/// A name that does not map to any variant of a closed vocabulary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: '{name}'")]
pub struct UnknownNameError {
    pub kind: &'static str,
    pub name: String,
}

impl UnknownNameError {
    pub fn new(kind: &'static str, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
        }
    }
}
