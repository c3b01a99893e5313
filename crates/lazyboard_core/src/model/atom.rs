//! Linked content item model.
//!
//! # Responsibility
//! - Define the canonical record a board node can host (task, note, event,
//!   project).
//! - Provide lifecycle helpers for soft-delete semantics.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another atom.
//! - `is_deleted` is the source of truth for tombstone state.
//! - `task_status` is only set on `AtomType::Task`.
//! - `event_end` should not be earlier than `event_start` when both are set.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every linked content item.
pub type AtomId = Uuid;

/// Content item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomType {
    /// Free-form markdown note.
    Note,
    /// Actionable task with status metadata.
    Task,
    /// Calendar event with optional start/end time.
    Event,
    /// Project entity; shown on boards through project-card nodes.
    Project,
}

impl AtomType {
    /// Stable storage value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Task => "task",
            Self::Event => "event",
            Self::Project => "project",
        }
    }

    /// Parses a storage value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "note" => Some(Self::Note),
            "task" => Some(Self::Task),
            "event" => Some(Self::Event),
            "project" => Some(Self::Project),
            _ => None,
        }
    }
}

/// Task lifecycle state for `AtomType::Task`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "todo" => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Validation failures for atom write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomValidationError {
    /// `task_status` set on a non-task atom.
    TaskStatusOnNonTask(AtomType),
    /// `event_end` precedes `event_start`.
    EventRangeInverted { start: i64, end: i64 },
}

impl Display for AtomValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskStatusOnNonTask(kind) => {
                write!(f, "task_status is only valid for tasks, got `{}`", kind.as_str())
            }
            Self::EventRangeInverted { start, end } => {
                write!(f, "event_end {end} is earlier than event_start {start}")
            }
        }
    }
}

impl Error for AtomValidationError {}

/// Canonical record for content hosted by board nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Atom {
    pub uuid: AtomId,
    #[serde(rename = "type")]
    pub kind: AtomType,
    /// Markdown body, or the title for projects and tasks.
    pub content: String,
    pub task_status: Option<TaskStatus>,
    /// Unix epoch milliseconds.
    pub event_start: Option<i64>,
    /// Unix epoch milliseconds. Should be >= `event_start` when set.
    pub event_end: Option<i64>,
    pub is_deleted: bool,
}

impl Atom {
    /// Creates a new atom with a generated stable ID.
    pub fn new(kind: AtomType, content: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), kind, content)
    }

    /// Creates a new atom with a caller-provided stable ID.
    pub fn with_id(uuid: AtomId, kind: AtomType, content: impl Into<String>) -> Self {
        Self {
            uuid,
            kind,
            content: content.into(),
            task_status: if kind == AtomType::Task {
                Some(TaskStatus::Todo)
            } else {
                None
            },
            event_start: None,
            event_end: None,
            is_deleted: false,
        }
    }

    /// Checks projection fields against `kind`.
    pub fn validate(&self) -> Result<(), AtomValidationError> {
        if self.task_status.is_some() && self.kind != AtomType::Task {
            return Err(AtomValidationError::TaskStatusOnNonTask(self.kind));
        }
        if let (Some(start), Some(end)) = (self.event_start, self.event_end) {
            if end < start {
                return Err(AtomValidationError::EventRangeInverted { start, end });
            }
        }
        Ok(())
    }

    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}
