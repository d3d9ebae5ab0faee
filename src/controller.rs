// File: src/controller.rs
//! File-level task operations.
//!
//! Everything here is a read-modify-write of a whole file through an injected
//! [`FileStore`]. None of it is atomic across calls: two concurrent edits of
//! the same file race, and the last writer wins. Callers serialize edits per
//! file, or batch them through [`edit_many_in_file`].
use crate::error::{MutationError, StoreError};
use crate::model::parser::{TaskLine, is_task_line};
use crate::model::{Task, TaskEdit, TaskIndexProvider};
use crate::storage::FileStore;
use std::path::Path;

/// A task found in a file, with its zero-based line number and raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedTask {
    pub line: usize,
    pub raw: String,
    pub task: Task,
}

fn split_lines(content: &str) -> Vec<&str> {
    content.split('\n').collect()
}

/// Replaces line `line_number` of `path` with `new_line` and persists the
/// whole content.
pub fn update_task_in_file(
    store: &dyn FileStore,
    path: &Path,
    line_number: usize,
    new_line: &str,
) -> Result<(), MutationError> {
    if new_line.contains('\n') {
        return Err(MutationError::InvalidValue(
            "replacement spans several lines".to_string(),
        ));
    }
    let content = store.read(path)?;
    let mut lines = split_lines(&content);
    *line_at(&mut lines, line_number)? = new_line;
    store.modify(path, &lines.join("\n"))?;

    log::debug!("Updated line {} of {}", line_number, path.display());
    Ok(())
}

fn line_at<'l, 'c>(
    lines: &'l mut [&'c str],
    line_number: usize,
) -> Result<&'l mut &'c str, MutationError> {
    let len = lines.len();
    lines.get_mut(line_number).ok_or(MutationError::LineOutOfRange {
        line: line_number,
        len,
    })
}

/// Applies `edit` to one line of `path` with a single read and at most one
/// write. Nothing is written when the edit fails or changes nothing.
pub fn edit_task_in_file(
    store: &dyn FileStore,
    path: &Path,
    line_number: usize,
    edit: &TaskEdit,
) -> Result<String, MutationError> {
    let content = store.read(path)?;
    let mut lines = split_lines(&content);
    let current = line_at(&mut lines, line_number)?;

    let updated = edit.apply(current)?;
    if updated != *current {
        *current = &updated;
        store.modify(path, &lines.join("\n"))?;
        log::debug!("Edited line {} of {}", line_number, path.display());
    }
    Ok(updated)
}

/// Applies several edits with a single read and a single write.
///
/// A failing edit is reported and skipped; the remaining edits still apply.
/// Returns the per-line failures.
pub fn edit_many_in_file(
    store: &dyn FileStore,
    path: &Path,
    edits: &[(usize, TaskEdit)],
) -> Result<Vec<(usize, MutationError)>, MutationError> {
    let content = store.read(path)?;
    let mut lines: Vec<String> = split_lines(&content).into_iter().map(String::from).collect();
    let mut failures = Vec::new();
    let mut changed = false;

    for (line_number, edit) in edits {
        let Some(current) = lines.get_mut(*line_number) else {
            failures.push((
                *line_number,
                MutationError::LineOutOfRange {
                    line: *line_number,
                    len: content.split('\n').count(),
                },
            ));
            continue;
        };
        match edit.apply(current) {
            Ok(updated) => {
                if updated != *current {
                    *current = updated;
                    changed = true;
                }
            }
            Err(e) => {
                log::warn!("Skipping line {} of {}: {}", line_number, path.display(), e);
                failures.push((*line_number, e));
            }
        }
    }

    if changed {
        store.modify(path, &lines.join("\n"))?;
    }
    Ok(failures)
}

/// Appends a task to `path`, creating the file if needed.
///
/// `input` is what the user typed. A complete task line is stored as is;
/// anything else becomes the text of a new open task. Returns the line number
/// of the new task.
pub fn append_task(
    store: &dyn FileStore,
    path: &Path,
    input: &str,
) -> Result<usize, MutationError> {
    if input.contains('\n') {
        return Err(MutationError::InvalidValue(
            "task text spans several lines".to_string(),
        ));
    }
    let line = if is_task_line(input) {
        input.trim_end().to_string()
    } else {
        format!("- [ ] {}", input.trim())
    };

    if !store.exists(path) {
        store.create(path, &line)?;
        log::info!("Created {} with its first task", path.display());
        return Ok(0);
    }

    let content = store.read(path)?;
    let (new_content, line_number) = if content.is_empty() {
        (line, 0)
    } else if content.ends_with('\n') {
        let n = split_lines(&content).len() - 1;
        (format!("{}{}", content, line), n)
    } else {
        let n = split_lines(&content).len();
        (format!("{}\n{}", content, line), n)
    };
    store.modify(path, &new_content)?;
    Ok(line_number)
}

/// Lists the task lines of `path`. Completed and cancelled tasks are skipped
/// unless `include_completed` is set.
///
/// Lines that are not tasks are ignored; parse warnings are logged and never
/// abort the scan.
pub fn list_tasks(
    store: &dyn FileStore,
    path: &Path,
    include_completed: bool,
) -> Result<Vec<ListedTask>, StoreError> {
    let content = store.read(path)?;
    let mut tasks = Vec::new();

    for (line, raw) in content.split('\n').enumerate() {
        let Ok(task_line) = TaskLine::parse(raw) else {
            continue;
        };
        for w in task_line.warnings() {
            log::warn!("{}:{}: {}", path.display(), line + 1, w);
        }
        let task = task_line.task();
        if task.is_done() && !include_completed {
            continue;
        }
        tasks.push(ListedTask {
            line,
            raw: raw.to_string(),
            task,
        });
    }

    log::debug!("Found {} task(s) in {}", tasks.len(), path.display());
    Ok(tasks)
}

/// Task lookup that prefers an external index and falls back to parsing.
pub struct TaskSource<'a> {
    store: &'a dyn FileStore,
    index: Option<&'a dyn TaskIndexProvider>,
}

impl<'a> TaskSource<'a> {
    pub fn new(store: &'a dyn FileStore) -> Self {
        Self { store, index: None }
    }

    pub fn with_index(mut self, index: &'a dyn TaskIndexProvider) -> Self {
        self.index = Some(index);
        self
    }

    pub fn tasks(&self, path: &Path, include_completed: bool) -> Result<Vec<ListedTask>, StoreError> {
        if let Some(records) = self.index.and_then(|i| i.tasks_in(path)) {
            log::debug!("Using {} indexed task(s) for {}", records.len(), path.display());
            return Ok(records
                .iter()
                .map(|r| ListedTask {
                    line: r.line,
                    raw: r.text.clone(),
                    task: Task::from_indexed(r),
                })
                .filter(|t| include_completed || !t.task.is_done())
                .collect());
        }
        list_tasks(self.store, path, include_completed)
    }
}
