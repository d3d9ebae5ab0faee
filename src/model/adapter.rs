// File: ./src/model/adapter.rs
//! Bridge to third-party task indexes.
//!
//! Query engines that already scanned the vault hand out pre-parsed list
//! items. When such a provider is present its records are turned into
//! [`Task`]s without running the parser; otherwise the file is parsed line by
//! line.
use crate::model::item::{DateKind, Task, TaskStatus};
use crate::model::parser::collapse_whitespace;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One task as reported by an external index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexedTask {
    pub path: PathBuf,
    /// Zero-based line number.
    pub line: usize,
    /// Raw line text, including the marker.
    pub text: String,
    /// Character between the checkbox brackets.
    pub status: char,
    pub completed: bool,
    #[serde(default)]
    pub tags: Vec<String>,

    /// Clean description with annotations removed, if the index computes one.
    pub description: Option<String>,

    pub created: Option<NaiveDate>,
    pub due: Option<NaiveDate>,
    pub scheduled: Option<NaiveDate>,
    pub start: Option<NaiveDate>,
    pub completion: Option<NaiveDate>,
}

/// Capability of an optional task index.
pub trait TaskIndexProvider: Send + Sync {
    /// Tasks of `path`, or `None` when the index has nothing for it (not
    /// installed, not ready, file not indexed).
    fn tasks_in(&self, path: &Path) -> Option<Vec<IndexedTask>>;
}

impl Task {
    /// Builds a task from an index record.
    ///
    /// Index records carry no priority, recurrence or generic properties, so
    /// those stay at their defaults. Callers that need them parse `text`.
    pub fn from_indexed(record: &IndexedTask) -> Self {
        let status = TaskStatus::from_marker_char(record.status).unwrap_or(if record.completed {
            TaskStatus::Done
        } else {
            TaskStatus::Todo
        });

        let description = record
            .description
            .as_deref()
            .map(collapse_whitespace)
            .unwrap_or_else(|| strip_marker(&record.text));

        let dates: BTreeMap<DateKind, NaiveDate> = [
            (DateKind::Created, record.created),
            (DateKind::Due, record.due),
            (DateKind::Scheduled, record.scheduled),
            (DateKind::Start, record.start),
            (DateKind::Completion, record.completion),
        ]
        .into_iter()
        .filter_map(|(k, d)| d.map(|d| (k, d)))
        .collect();

        let indent_len = record.text.len() - record.text.trim_start_matches([' ', '\t']).len();

        Task {
            status,
            description,
            dates,
            indent: record.text[..indent_len].to_string(),
            ..Task::default()
        }
    }
}

fn strip_marker(text: &str) -> String {
    match crate::model::parser::split_marker(text) {
        Some((_, _, rest)) => collapse_whitespace(rest),
        None => collapse_whitespace(text),
    }
}
