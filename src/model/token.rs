// File: ./src/model/token.rs
//! Token vocabulary of the task-line format.
//!
//! Every reserved channel is a single emoji code point. The table is a fixed
//! external contract shared with the Tasks plugin, so nothing here is
//! configurable.
use crate::model::item::{DateKind, Priority, TaskStatus};
use strum::IntoEnumIterator;

/// Optional emoji presentation selector some editors append (`⏬️`).
pub const VARIATION_SELECTOR: char = '\u{FE0F}';

pub const RECURRENCE_EMOJI: char = '🔁';

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of a `YYYY-MM-DD` token in bytes.
pub const DATE_LEN: usize = 10;

pub const LIST_BULLET: char = '-';

impl Priority {
    pub fn emoji(self) -> Option<char> {
        match self {
            Priority::Highest => Some('🔺'),
            Priority::High => Some('⏫'),
            Priority::Medium => Some('🔼'),
            Priority::Low => Some('🔽'),
            Priority::Lowest => Some('⏬'),
            Priority::Normal => None,
        }
    }

    pub fn from_emoji(c: char) -> Option<Self> {
        Priority::iter().find(|p| p.emoji() == Some(c))
    }
}

impl DateKind {
    pub fn emoji(self) -> char {
        match self {
            DateKind::Created => '➕',
            DateKind::Due => '📅',
            DateKind::Scheduled => '⏳',
            DateKind::Start => '🛫',
            DateKind::Completion => '✅',
            DateKind::Cancelled => '❌',
        }
    }

    pub fn from_emoji(c: char) -> Option<Self> {
        DateKind::iter().find(|k| k.emoji() == c)
    }
}

impl TaskStatus {
    /// Character between the brackets of the checkbox.
    pub fn marker_char(self) -> char {
        match self {
            TaskStatus::Todo => ' ',
            TaskStatus::Done => 'x',
            TaskStatus::InProgress => '/',
            TaskStatus::Cancelled => '-',
        }
    }

    pub fn from_marker_char(c: char) -> Option<Self> {
        match c {
            ' ' => Some(TaskStatus::Todo),
            'x' | 'X' => Some(TaskStatus::Done),
            '/' => Some(TaskStatus::InProgress),
            '-' => Some(TaskStatus::Cancelled),
            _ => None,
        }
    }

    /// Full checkbox marker, e.g. `- [x]`.
    pub fn marker(self) -> String {
        format!("{} [{}]", LIST_BULLET, self.marker_char())
    }
}

/// True for every emoji that opens a reserved token.
pub fn is_reserved_emoji(c: char) -> bool {
    c == RECURRENCE_EMOJI || Priority::from_emoji(c).is_some() || DateKind::from_emoji(c).is_some()
}

/// Keys accepted inside a `[key:value]` token.
pub fn is_valid_property_key(key: &str) -> bool {
    !key.is_empty()
        && !key
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ':' | '[' | ']') || is_reserved_emoji(c))
}

/// Values must hold something besides whitespace and never carry a
/// character that would end the token or start another one.
pub fn is_valid_property_value(value: &str) -> bool {
    !value.trim().is_empty()
        && !value
            .chars()
            .any(|c| matches!(c, '[' | ']' | '\n') || is_reserved_emoji(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emoji_tables_are_disjoint() {
        let mut seen = vec![RECURRENCE_EMOJI];
        for p in Priority::iter().filter_map(Priority::emoji) {
            assert!(!seen.contains(&p));
            seen.push(p);
        }
        for k in DateKind::iter() {
            assert!(!seen.contains(&k.emoji()));
            seen.push(k.emoji());
        }
        assert_eq!(seen.len(), 12);
    }

    #[test]
    fn marker_chars_round_trip() {
        for s in TaskStatus::iter() {
            assert_eq!(TaskStatus::from_marker_char(s.marker_char()), Some(s));
        }
        assert_eq!(TaskStatus::from_marker_char('X'), Some(TaskStatus::Done));
        assert_eq!(TaskStatus::from_marker_char('>'), None);
    }

    #[test]
    fn property_keys() {
        assert!(is_valid_property_key("client"));
        assert!(is_valid_property_key("due"));
        assert!(!is_valid_property_key(""));
        assert!(!is_valid_property_key("two words"));
        assert!(!is_valid_property_key("a:b"));
        assert!(is_valid_property_value(" spaced value "));
        assert!(!is_valid_property_value("x]"));
        assert!(!is_valid_property_value("  "));
        assert!(!is_valid_property_value("📅 2024-01-01"));
    }
}
