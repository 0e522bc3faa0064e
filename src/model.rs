// src/model.rs
use std::fmt;

use crate::names::normalize_name;

/// A known rider from the reference roster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterEntry {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
}

impl RosterEntry {
    pub fn key(&self) -> NameKey {
        NameKey::new(&self.first_name, &self.last_name)
    }

    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

/// (first, last) after normalization. Lookup key only; several riders may share one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameKey {
    pub first: String,
    pub last: String,
}

impl NameKey {
    pub fn new(first: &str, last: &str) -> Self {
        Self { first: normalize_name(first), last: normalize_name(last) }
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first, self.last)
    }
}

/// One observed rider line from a results sheet, scrape or earlier import.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExternalRecord {
    pub position: u32,
    pub first_name: String,
    pub last_name: String,
    pub claimed_id: Option<u32>,
    /// Raw elapsed-time text, parsed later by `timing::parse_time`
    pub time: Option<String>,
    pub team: Option<String>,
}

impl ExternalRecord {
    pub fn new(position: u32, first_name: &str, last_name: &str) -> Self {
        Self {
            position,
            first_name: s!(first_name.trim()),
            last_name: s!(last_name.trim()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.claimed_id = Some(id);
        self
    }

    pub fn with_time(mut self, time: &str) -> Self {
        let t = time.trim();
        self.time = if t.is_empty() { None } else { Some(s!(t)) };
        self
    }

    pub fn with_team(mut self, team: &str) -> Self {
        let t = team.trim();
        self.team = if t.is_empty() { None } else { Some(s!(t)) };
        self
    }

    pub fn key(&self) -> NameKey {
        NameKey::new(&self.first_name, &self.last_name)
    }

    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

fn full_name(first: &str, last: &str) -> String {
    match (first.is_empty(), last.is_empty()) {
        (true, _) => s!(last),
        (_, true) => s!(first),
        _ => join!(first, " ", last),
    }
}
