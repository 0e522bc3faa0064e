// src/sql/mod.rs
//! SQL script writers. Everything renders into a `String`; callers write it out in
//! one go. Output carries no timestamps, so the same input gives byte-identical
//! scripts.
pub mod photos;
pub mod riders;
pub mod stage_results;
pub mod validate;

use std::fmt;

use crate::core::sanitize::sql_escape;

/// How a result row names its rider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RiderRef {
    /// Known roster id.
    Id(u32),
    /// Resolved in SQL by case-insensitive name, lowest id first.
    Name { first: String, last: String },
}

impl fmt::Display for RiderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiderRef::Id(id) => write!(f, "#{id}"),
            RiderRef::Name { first, last } => write!(f, "{first} {last}"),
        }
    }
}

/// One finished row for the `stage_results` table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageResultRow {
    pub stage: u32,
    pub rider: RiderRef,
    pub position: u32,
    pub time_seconds: Option<u32>,
    pub same_time_group: Option<u32>,
    /// Rendered as a `--` comment above the statement.
    pub note: Option<String>,
}

impl StageResultRow {
    pub fn new(stage: u32, rider: RiderRef, position: u32) -> Self {
        Self { stage, rider, position, time_seconds: None, same_time_group: None, note: None }
    }

    pub fn timed(mut self, time_seconds: Option<u32>, same_time_group: Option<u32>) -> Self {
        self.time_seconds = time_seconds;
        self.same_time_group = same_time_group;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

pub(crate) fn num_or_null(v: Option<u32>) -> String {
    v.map(|n| n.to_string()).unwrap_or_else(|| s!("NULL"))
}

/// `'it''s'`
pub(crate) fn quoted(s: &str) -> String {
    format!("'{}'", sql_escape(s))
}

/// Comment text on one line, so it cannot close itself or start a statement.
pub(crate) fn comment_text(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}
