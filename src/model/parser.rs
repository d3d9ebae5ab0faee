// File: ./src/model/parser.rs
//! Decoding of a single task line.
//!
//! A line is split into a checkbox marker and a flat list of [`Segment`]s.
//! Free text and tokens keep the order they had in the source, which lets the
//! mutators edit one channel and re-render the rest untouched. [`Task`] is the
//! typed projection of that list.
use crate::error::{ParseError, Warning};
use crate::model::item::{DateKind, Priority, Property, Task, TaskStatus};
use crate::model::token::{
    DATE_FORMAT, DATE_LEN, LIST_BULLET, RECURRENCE_EMOJI, VARIATION_SELECTOR, is_reserved_emoji,
    is_valid_property_key, is_valid_property_value,
};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Free text, stored raw. Whitespace is collapsed when rendering.
    Text(String),
    Priority(Priority),
    Date(DateKind, NaiveDate),
    Recurrence(String),
    Property(Property),
    /// A reserved emoji without a usable value. Kept so edits of other
    /// channels don't silently drop user text.
    Stray(char),
}

impl Segment {
    pub fn is_text(&self) -> bool {
        matches!(self, Segment::Text(_))
    }
}

/// A task line decomposed into its marker and ordered segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLine {
    pub indent: String,
    pub status: TaskStatus,
    pub segments: Vec<Segment>,
}

/// Result of [`parse_line`]: the task plus the irregularities met on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub task: Task,
    pub warnings: Vec<Warning>,
}

pub fn parse(raw: &str) -> Result<Task, ParseError> {
    Ok(TaskLine::parse(raw)?.task())
}

pub fn parse_line(raw: &str) -> Result<ParsedLine, ParseError> {
    let line = TaskLine::parse(raw)?;
    Ok(ParsedLine {
        task: line.task(),
        warnings: line.warnings(),
    })
}

pub fn is_task_line(raw: &str) -> bool {
    !raw.contains('\n') && split_marker(raw).is_some()
}

/// Splits `raw` into (indent, status, remainder after the marker).
///
/// The marker is `- [c]` with `c` one of the four status characters, followed
/// by whitespace or the end of the line. A bare `[ ]` is not a task.
pub(crate) fn split_marker(raw: &str) -> Option<(&str, TaskStatus, &str)> {
    let body = raw.trim_start_matches([' ', '\t']);
    let indent = &raw[..raw.len() - body.len()];

    let rest = body.strip_prefix(LIST_BULLET)?.strip_prefix(" [")?;
    let mut chars = rest.chars();
    let status = TaskStatus::from_marker_char(chars.next()?)?;
    let after = chars.as_str().strip_prefix(']')?;

    if !after.is_empty() && !after.starts_with(char::is_whitespace) {
        return None;
    }
    Some((indent, status, after))
}

impl TaskLine {
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        if raw.contains('\n') {
            return Err(ParseError::EmbeddedNewline);
        }
        let (indent, status, rest) = split_marker(raw).ok_or(ParseError::NotATask)?;
        Ok(Self {
            indent: indent.to_string(),
            status,
            segments: scan_segments(rest),
        })
    }

    /// Typed view of the line. Repeated tokens resolve to their first occurrence.
    pub fn task(&self) -> Task {
        let mut task = Task {
            status: self.status,
            indent: self.indent.clone(),
            ..Task::default()
        };
        let mut words = Vec::new();
        let mut priority = None;

        for segment in &self.segments {
            match segment {
                Segment::Text(t) => words.extend(t.split_whitespace()),
                Segment::Priority(p) => {
                    priority.get_or_insert(*p);
                }
                Segment::Date(kind, date) => {
                    task.dates.entry(*kind).or_insert(*date);
                }
                Segment::Recurrence(phrase) => {
                    task.recurrence.get_or_insert_with(|| phrase.clone());
                }
                Segment::Property(p) => task.properties.push(p.clone()),
                Segment::Stray(_) => {}
            }
        }

        task.description = words.join(" ");
        task.priority = priority.unwrap_or_default();
        task
    }

    pub fn warnings(&self) -> Vec<Warning> {
        let mut warnings = Vec::new();
        let mut seen_priority = false;
        let mut seen_dates = Vec::new();
        let mut seen_recurrence = false;

        let mut warn = |w: Warning| {
            if !warnings.contains(&w) {
                warnings.push(w);
            }
        };

        for segment in &self.segments {
            match segment {
                Segment::Priority(_) if seen_priority => warn(Warning::MultiplePriority),
                Segment::Priority(_) => seen_priority = true,
                Segment::Date(kind, _) if seen_dates.contains(kind) => {
                    warn(Warning::MultipleDateToken(*kind))
                }
                Segment::Date(kind, _) => seen_dates.push(*kind),
                Segment::Recurrence(_) if seen_recurrence => warn(Warning::MultipleRecurrence),
                Segment::Recurrence(_) => seen_recurrence = true,
                Segment::Stray(c) => warn(Warning::DanglingToken(*c)),
                Segment::Text(_) | Segment::Property(_) => {}
            }
        }
        warnings
    }

    /// Canonical segment list for a task: description, priority, dates in
    /// `DateKind` order, recurrence, properties.
    pub fn from_task(task: &Task) -> Self {
        let mut segments = vec![Segment::Text(task.description.clone())];
        if task.priority != Priority::Normal {
            segments.push(Segment::Priority(task.priority));
        }
        segments.extend(task.dates.iter().map(|(k, d)| Segment::Date(*k, *d)));
        if let Some(phrase) = &task.recurrence {
            segments.push(Segment::Recurrence(phrase.clone()));
        }
        segments.extend(task.properties.iter().cloned().map(Segment::Property));

        Self {
            indent: task.indent.clone(),
            status: task.status,
            segments,
        }
    }
}

/// Tokenizes the text after the checkbox marker.
///
/// Detection is substring based: an emoji glued to a word is still a token.
/// Everything that is not a token is collected as [`Segment::Text`].
pub fn scan_segments(rest: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while let Some(c) = rest[i..].chars().next() {
        let token_end = i + c.len_utf8();

        let matched = if let Some(p) = Priority::from_emoji(c) {
            Some((Segment::Priority(p), skip_selector(rest, token_end)))
        } else if let Some(kind) = DateKind::from_emoji(c) {
            let after = skip_selector(rest, token_end);
            Some(match date_at(rest, after) {
                Some((date, end)) => (Segment::Date(kind, date), end),
                None => (Segment::Stray(c), after),
            })
        } else if c == RECURRENCE_EMOJI {
            let after = skip_selector(rest, token_end);
            let end = recurrence_end(rest, after);
            let phrase = collapse_whitespace(&rest[after..end]);
            if phrase.is_empty() {
                Some((Segment::Stray(c), after))
            } else {
                Some((Segment::Recurrence(phrase), end))
            }
        } else if c == '[' {
            property_at(rest, i).map(|(p, end)| (Segment::Property(p), end))
        } else {
            None
        };

        match matched {
            Some((segment, end)) => {
                if text_start < i {
                    segments.push(Segment::Text(rest[text_start..i].to_string()));
                }
                segments.push(segment);
                i = end;
                text_start = end;
            }
            None => i = token_end,
        }
    }

    if text_start < rest.len() {
        segments.push(Segment::Text(rest[text_start..].to_string()));
    }
    segments
}

fn skip_selector(s: &str, i: usize) -> usize {
    if s[i..].starts_with(VARIATION_SELECTOR) {
        i + VARIATION_SELECTOR.len_utf8()
    } else {
        i
    }
}

/// A `YYYY-MM-DD` date after optional whitespace, with the index past it.
fn date_at(s: &str, from: usize) -> Option<(NaiveDate, usize)> {
    let start = from + (s[from..].len() - s[from..].trim_start().len());
    let candidate = s.get(start..start + DATE_LEN)?;
    if !is_date_shaped(candidate) {
        return None;
    }
    let date = NaiveDate::parse_from_str(candidate, DATE_FORMAT).ok()?;
    Some((date, start + DATE_LEN))
}

fn is_date_shaped(s: &str) -> bool {
    s.bytes().enumerate().all(|(i, b)| match i {
        4 | 7 => b == b'-',
        _ => b.is_ascii_digit(),
    })
}

/// The recurrence phrase runs until the next reserved emoji, the next
/// property token or the end of the line.
fn recurrence_end(s: &str, from: usize) -> usize {
    s[from..]
        .char_indices()
        .map(|(k, c)| (from + k, c))
        .find(|&(k, c)| is_reserved_emoji(c) || (c == '[' && property_at(s, k).is_some()))
        .map_or(s.len(), |(k, _)| k)
}

/// A `[key:value]` token starting at byte `i`, with the index past it.
///
/// Brackets whose value is blank or holds a reserved emoji are plain text, so
/// the tokens inside them are scanned as usual. Wiki links (`[[..]]`) and markdown links (`[..](..)`) are left alone.
fn property_at(s: &str, i: usize) -> Option<(Property, usize)> {
    if s[..i].ends_with('[') {
        return None;
    }
    let body = s[i..].strip_prefix('[')?;
    let close = body.find(']')?;
    let inner = &body[..close];
    if inner.contains('[') {
        return None;
    }
    let end = i + 1 + close + 1;
    if s[end..].starts_with('(') {
        return None;
    }

    let (key, value) = inner.split_once(':')?;
    if !is_valid_property_key(key) || !is_valid_property_value(value) {
        return None;
    }
    Some((Property::new(key, value.trim()), end))
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
