// File: ./src/model/mutator.rs
//! Single-field edits on raw task lines.
//!
//! Every edit clears its own channel (well-formed tokens and strays alike)
//! and writes the new value where the first token of that channel stood, so
//! applying the same edit twice yields the same line. Segments of other
//! channels keep their relative order.
use crate::error::MutationError;
use crate::model::item::{DateKind, Priority, Property, TaskStatus};
use crate::model::parser::{Segment, TaskLine, collapse_whitespace, scan_segments, split_marker};
use crate::model::token::{
    RECURRENCE_EMOJI, is_reserved_emoji, is_valid_property_key, is_valid_property_value,
};
use chrono::NaiveDate;

/// One semantic edit, as chosen by a UI or the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEdit {
    Status(TaskStatus),
    ToggleCompletion,
    Priority(Priority),
    Date(DateKind, Option<NaiveDate>),
    Recurrence(String),
    Property { key: String, value: String },
    RemoveProperty(String),
    Description(String),
    Normalize,
}

impl TaskEdit {
    pub fn apply(&self, line: &str) -> Result<String, MutationError> {
        match self {
            TaskEdit::Status(s) => set_status(line, *s),
            TaskEdit::ToggleCompletion => toggle_completion(line),
            TaskEdit::Priority(p) => set_priority(line, *p),
            TaskEdit::Date(kind, date) => set_date(line, *kind, *date),
            TaskEdit::Recurrence(phrase) => set_recurrence(line, phrase),
            TaskEdit::Property { key, value } => set_property(line, key, value),
            TaskEdit::RemoveProperty(key) => remove_property(line, key),
            TaskEdit::Description(text) => set_description(line, text),
            TaskEdit::Normalize => normalize(line),
        }
    }
}

fn parse_for_edit(line: &str) -> Result<TaskLine, MutationError> {
    TaskLine::parse(line).map_err(|_| MutationError::MalformedLine)
}

/// Renders an edited line so that it parses back to the same task.
///
/// Removing a token can leave a stray emoji next to text it now claims
/// (`📅⏫2024-01-01` minus the priority) or let a recurrence phrase run into
/// the following text. Each candidate is checked by re-parsing: the line as
/// edited, then without stray emoji, then in canonical order.
fn finish(task_line: TaskLine) -> Result<String, MutationError> {
    let intended = task_line.task();
    let reads_back = |line: &str| {
        TaskLine::parse(line).is_ok_and(|parsed| parsed.task() == intended)
    };

    let in_place = task_line.render();
    if reads_back(&in_place) {
        return Ok(in_place);
    }

    let mut without_strays = task_line;
    without_strays
        .segments
        .retain(|s| !matches!(s, Segment::Stray(_)));
    let line = without_strays.render();
    if reads_back(&line) {
        log::debug!("Dropped stray emoji to keep '{}' unambiguous", line);
        return Ok(line);
    }

    let line = TaskLine::from_task(&intended).render();
    if reads_back(&line) {
        log::debug!("Rewrote '{}' in canonical order", line);
        return Ok(line);
    }
    Err(MutationError::Unrepresentable)
}

/// Swaps the checkbox marker. The rest of the line is kept byte for byte.
pub fn set_status(line: &str, status: TaskStatus) -> Result<String, MutationError> {
    if line.contains('\n') {
        return Err(MutationError::MalformedLine);
    }
    let (indent, _, rest) = split_marker(line).ok_or(MutationError::MalformedLine)?;
    Ok(format!("{}{}{}", indent, status.marker(), rest))
}

/// Checkbox click: Todo becomes Done, Done becomes Todo. In-progress and
/// cancelled tasks are completed.
pub fn toggle_completion(line: &str) -> Result<String, MutationError> {
    let (_, current, _) = split_marker(line).ok_or(MutationError::MalformedLine)?;
    let next = match current {
        TaskStatus::Done => TaskStatus::Todo,
        _ => TaskStatus::Done,
    };
    set_status(line, next)
}

/// Drops every segment of one channel and puts `new` where the first
/// well-formed one stood, or at the end when there was none.
fn replace_channel(
    task_line: &mut TaskLine,
    in_channel: impl Fn(&Segment) -> bool,
    new: Option<Segment>,
) {
    let slot = task_line
        .segments
        .iter()
        .position(|s| in_channel(s) && !matches!(s, Segment::Stray(_)));

    let mut kept = Vec::with_capacity(task_line.segments.len() + 1);
    let mut insert_at = None;
    for (i, segment) in task_line.segments.drain(..).enumerate() {
        if Some(i) == slot {
            insert_at = Some(kept.len());
        }
        if !in_channel(&segment) {
            kept.push(segment);
        }
    }
    if let Some(new) = new {
        match insert_at {
            Some(at) => kept.insert(at, new),
            None => kept.push(new),
        }
    }
    task_line.segments = kept;
}

pub fn set_priority(line: &str, priority: Priority) -> Result<String, MutationError> {
    let mut task_line = parse_for_edit(line)?;
    let new = (priority != Priority::Normal).then_some(Segment::Priority(priority));
    replace_channel(&mut task_line, |s| matches!(s, Segment::Priority(_)), new);
    finish(task_line)
}

/// Sets or clears (`None`) one date channel. Tokens of other kinds are never
/// touched, even when they carry the same date.
pub fn set_date(
    line: &str,
    kind: DateKind,
    date: Option<NaiveDate>,
) -> Result<String, MutationError> {
    let mut task_line = parse_for_edit(line)?;
    let emoji = kind.emoji();
    replace_channel(
        &mut task_line,
        |s| match s {
            Segment::Date(k, _) => *k == kind,
            Segment::Stray(c) => *c == emoji,
            _ => false,
        },
        date.map(|d| Segment::Date(kind, d)),
    );
    finish(task_line)
}

/// Sets the recurrence phrase; an empty phrase removes the channel.
pub fn set_recurrence(line: &str, phrase: &str) -> Result<String, MutationError> {
    let phrase = collapse_whitespace(phrase);
    if phrase.chars().any(is_reserved_emoji) {
        return Err(MutationError::InvalidValue(format!(
            "recurrence '{}' contains a reserved emoji",
            phrase
        )));
    }
    if scan_segments(&phrase).iter().any(|s| !s.is_text()) {
        return Err(MutationError::InvalidValue(format!(
            "recurrence '{}' contains a property token",
            phrase
        )));
    }

    let mut task_line = parse_for_edit(line)?;
    replace_channel(
        &mut task_line,
        |s| match s {
            Segment::Recurrence(_) => true,
            Segment::Stray(c) => *c == RECURRENCE_EMOJI,
            _ => false,
        },
        (!phrase.is_empty()).then(|| Segment::Recurrence(phrase)),
    );
    finish(task_line)
}

/// Sets a generic `[key:value]` token. The first token with `key` is
/// updated where it stands; otherwise the token is appended.
///
/// Keys are case-sensitive and never routed to the typed channels:
/// `set_property(l, "due", ..)` writes a literal `[due:..]` token.
pub fn set_property(line: &str, key: &str, value: &str) -> Result<String, MutationError> {
    if !is_valid_property_key(key) {
        return Err(MutationError::InvalidValue(format!(
            "'{}' is not a valid property key",
            key
        )));
    }
    let value = value.trim();
    if !is_valid_property_value(value) {
        return Err(MutationError::InvalidValue(format!(
            "'{}' is not a valid property value",
            value
        )));
    }

    let mut task_line = parse_for_edit(line)?;
    let existing = task_line.segments.iter_mut().find_map(|s| match s {
        Segment::Property(p) if p.key == key => Some(p),
        _ => None,
    });
    match existing {
        Some(p) => p.value = value.to_string(),
        None => task_line
            .segments
            .push(Segment::Property(Property::new(key, value))),
    }
    finish(task_line)
}

/// Drops every `[key:..]` token.
pub fn remove_property(line: &str, key: &str) -> Result<String, MutationError> {
    let mut task_line = parse_for_edit(line)?;
    task_line
        .segments
        .retain(|s| !matches!(s, Segment::Property(p) if p.key == key));
    finish(task_line)
}

/// Replaces the free text of the line. Marker and tokens are kept.
pub fn set_description(line: &str, text: &str) -> Result<String, MutationError> {
    if text.contains('\n') {
        return Err(MutationError::InvalidValue(
            "description spans several lines".to_string(),
        ));
    }
    if scan_segments(text).iter().any(|s| !s.is_text()) {
        return Err(MutationError::InvalidValue(format!(
            "description '{}' contains task tokens",
            text
        )));
    }

    let mut task_line = parse_for_edit(line)?;
    task_line.segments.retain(|s| !s.is_text());
    task_line.segments.insert(0, Segment::Text(text.to_string()));
    finish(task_line)
}

/// Rewrites the line in canonical token order.
pub fn normalize(line: &str) -> Result<String, MutationError> {
    let task = parse_for_edit(line)?.task();
    finish(TaskLine::from_task(&task))
}
