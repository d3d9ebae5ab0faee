// File: ./src/model/display.rs
use crate::model::item::{Task, TaskStatus};
use crate::model::parser::{Segment, TaskLine, collapse_whitespace};
use crate::model::token::{DATE_FORMAT, RECURRENCE_EMOJI};

pub trait TaskDisplay {
    fn to_line(&self) -> String;
    fn checkbox_symbol(&self) -> &'static str;
    fn format_metadata(&self) -> String;
}

/// Renders `task` as a canonical task line.
pub fn serialize(task: &Task) -> String {
    TaskLine::from_task(task).render()
}

impl TaskLine {
    /// Renders the marker followed by every non-empty segment, separated by
    /// single spaces.
    pub fn render(&self) -> String {
        let mut s = format!("{}{}", self.indent, self.status.marker());
        for segment in &self.segments {
            let part = segment.render();
            if !part.is_empty() {
                s.push(' ');
                s.push_str(&part);
            }
        }
        s
    }
}

impl Segment {
    pub fn render(&self) -> String {
        match self {
            Segment::Text(t) => collapse_whitespace(t),
            Segment::Priority(p) => p.emoji().map(String::from).unwrap_or_default(),
            Segment::Date(kind, date) => format!("{} {}", kind.emoji(), date.format(DATE_FORMAT)),
            Segment::Recurrence(phrase) => format!("{} {}", RECURRENCE_EMOJI, phrase),
            Segment::Property(p) => format!("[{}:{}]", p.key, p.value),
            Segment::Stray(c) => c.to_string(),
        }
    }
}

impl TaskDisplay for Task {
    fn to_line(&self) -> String {
        serialize(self)
    }

    fn checkbox_symbol(&self) -> &'static str {
        match self.status {
            TaskStatus::Done => "[✔]",
            TaskStatus::Cancelled => "[✘]",
            TaskStatus::InProgress => "[▶]",
            TaskStatus::Todo => "[ ]",
        }
    }

    /// Human readable summary of the metadata, e.g.
    /// `Priority: High | due: 2024-03-01 | every week | client: acme`.
    fn format_metadata(&self) -> String {
        let mut parts = vec![format!("Priority: {}", self.priority)];
        for (kind, date) in &self.dates {
            parts.push(format!("{}: {}", kind, date.format(DATE_FORMAT)));
        }
        if let Some(r) = &self.recurrence {
            parts.push(r.clone());
        }
        for p in &self.properties {
            parts.push(format!("{}: {}", p.key, p.value));
        }
        parts.join(" | ")
    }
}
