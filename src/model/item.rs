// File: ./src/model/item.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use strum::EnumIter;

use crate::error::UnknownNameError;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, Serialize, Deserialize, EnumIter)]
pub enum TaskStatus {
    #[default]
    Todo,
    Done,
    InProgress,
    Cancelled,
}

impl TaskStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Todo => write!(f, "Todo"),
            TaskStatus::Done => write!(f, "Done"),
            TaskStatus::InProgress => write!(f, "In progress"),
            TaskStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "todo" | "open" => Ok(TaskStatus::Todo),
            "done" | "complete" | "completed" => Ok(TaskStatus::Done),
            "inprogress" | "in-progress" | "doing" => Ok(TaskStatus::InProgress),
            "cancelled" | "canceled" => Ok(TaskStatus::Cancelled),
            _ => Err(UnknownNameError::new("status", s)),
        }
    }
}

/// Task priority. `Normal` is the implicit level of a line without a
/// priority emoji and is never written out.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, Serialize, Deserialize, EnumIter)]
pub enum Priority {
    Highest,
    High,
    Medium,
    Low,
    Lowest,
    #[default]
    Normal,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Highest => write!(f, "Highest"),
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
            Priority::Low => write!(f, "Low"),
            Priority::Lowest => write!(f, "Lowest"),
            Priority::Normal => write!(f, "Normal"),
        }
    }
}

impl FromStr for Priority {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "highest" => Ok(Priority::Highest),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            "lowest" => Ok(Priority::Lowest),
            "normal" | "none" | "" => Ok(Priority::Normal),
            _ => Err(UnknownNameError::new("priority", s)),
        }
    }
}

/// Semantic role of a date token. Declaration order is the order dates are
/// written in a canonical line.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
pub enum DateKind {
    Created,
    Due,
    Scheduled,
    Start,
    Completion,
    Cancelled,
}

impl DateKind {
    pub fn name(&self) -> &'static str {
        match self {
            DateKind::Created => "created",
            DateKind::Due => "due",
            DateKind::Scheduled => "scheduled",
            DateKind::Start => "start",
            DateKind::Completion => "done",
            DateKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DateKind {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(DateKind::Created),
            "due" => Ok(DateKind::Due),
            "scheduled" => Ok(DateKind::Scheduled),
            "start" => Ok(DateKind::Start),
            "done" | "completion" | "completed" => Ok(DateKind::Completion),
            "cancelled" | "canceled" => Ok(DateKind::Cancelled),
            _ => Err(UnknownNameError::new("date kind", s)),
        }
    }
}

/// A generic `[key:value]` token.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: String,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
pub struct Task {
    pub status: TaskStatus,
    pub description: String,
    pub priority: Priority,
    #[serde(default)]
    pub dates: BTreeMap<DateKind, NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,
    #[serde(default)]
    pub properties: Vec<Property>,

    /// Leading whitespace of nested list items, kept verbatim.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub indent: String,
}

impl Task {
    pub fn new(description: &str) -> Self {
        Self {
            description: description.split_whitespace().collect::<Vec<_>>().join(" "),
            ..Self::default()
        }
    }

    pub fn date(&self, kind: DateKind) -> Option<NaiveDate> {
        self.dates.get(&kind).copied()
    }

    /// First value stored under `key`.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }
}
