// src/corrections.rs
//! Manual correction table for rider names seen in scanned / hand-typed result sheets.
//!
//! The rules are data. They are enumerated once into a [`CorrectionTable`] and consulted
//! by exact key; the reconciler never sees uncorrected names when a rule applies.
//!
//! Precedence for one record:
//! 1. a `Special` rule on the exact original (first, last) pair replaces both names
//!    and pins the rider id, nothing else is applied;
//! 2. otherwise `LastName` (keyed by original first + last), `FirstName` (keyed by
//!    original first) and `Pair` rules are applied to the original names.
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::csv::{self, non_empty};
use crate::error::{Error, Result};
use crate::model::ExternalRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Exact name pair → corrected pair and a known roster id
    Special { first: &'static str, last: &'static str, to_first: &'static str, to_last: &'static str, id: u32 },
    /// Garbled first name, whatever the last name
    FirstName { from: &'static str, to: &'static str },
    /// Last-name fix for one first name
    LastName { first: &'static str, from: &'static str, to: &'static str },
    /// First-name fix that only holds for one exact pair
    Pair { first: &'static str, last: &'static str, to_first: &'static str },
}

pub const BUILTIN: &[Rule] = &[
    // OCR damage: '+' and '&' read in place of letters
    Rule::FirstName { from: "Rem++", to: "Remco" },
    Rule::FirstName { from: "Primo+", to: "Primoz" },
    Rule::FirstName { from: "Thyme+", to: "Thymen" },
    Rule::FirstName { from: "Ro&", to: "Roel" },
    Rule::LastName { first: "Mathieu", from: "van der Po&", to: "van der Poel" },
    // Misspellings
    Rule::FirstName { from: "Staff", to: "Steff" },
    Rule::FirstName { from: "Bastion", to: "Bastien" },
    Rule::FirstName { from: "Einar", to: "Einer" },
    Rule::LastName { first: "Vito", from: "Brant", to: "Braet" },
    Rule::LastName { first: "Gregor", from: "Muehlberger", to: "Muhlberger" },
    Rule::LastName { first: "Frank", from: "van den Brook", to: "Van Den Broek" },
    Rule::Pair { first: "William", last: "Barta", to_first: "Will" },
    // Per-person remaps observed in earlier imports
    Rule::Special { first: "Mattis", last: "Cattaneo", to_first: "Mattia", to_last: "Cattaneo", id: 18 },
    Rule::Special { first: "Aurelian", last: "Paret-Peintre", to_first: "Aurelien", to_last: "Paret-Peintre", id: 126 },
    Rule::Special { first: "Edward", last: "Dunbar", to_first: "Eddie", to_last: "Dunbar", id: 98 },
    Rule::Special { first: "Lucas", last: "Plapp", to_first: "Luke", to_last: "Plapp", id: 102 },
    Rule::Special { first: "Sebastian", last: "Grignard", to_first: "Sebastien", to_last: "Grignard", id: 173 },
    Rule::Special { first: "Anders", last: "Halland Johannessen", to_first: "Anders Halland", to_last: "Johannessen", id: 182 },
    Rule::Special { first: "Anders", last: "Johannessen", to_first: "Anders Halland", to_last: "Johannessen", id: 182 },
    Rule::Special { first: "Tobias", last: "Johannessen", to_first: "Tobias Halland", to_last: "Johannessen", id: 177 },
    Rule::Special { first: "Jonas", last: "Abrahamson", to_first: "Jonas", to_last: "Abrahamsen", id: 178 },
    Rule::Special { first: "Niklas", last: "Maerkl", to_first: "Niklas", to_last: "Markl", id: 158 },
    // The roster itself carries this odd first name
    Rule::Special { first: "Enric", last: "Mas", to_first: "Enric Mondiale Team", to_last: "Mas", id: 113 },
    Rule::Special { first: "Søren", last: "Wærenskjold", to_first: "Soren", to_last: "Waerenskjold", id: 184 },
    Rule::Special { first: "Han", last: "van Wilder", to_first: "Ilan", to_last: "Van Wilder", id: 24 },
];

/// What the corrector did to one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Applied {
    Unchanged,
    /// Names changed, id untouched
    Typo,
    /// Names replaced and id pinned
    Special { id: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Correction {
    pub record: ExternalRecord,
    pub applied: Applied,
}

impl Correction {
    pub fn changed(&self) -> bool {
        self.applied != Applied::Unchanged
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Special {
    first: String,
    last: String,
    id: u32,
}

/// Rules keyed for exact lookup. Later rules with the same key replace earlier ones.
#[derive(Clone, Debug, Default)]
pub struct CorrectionTable {
    special: HashMap<(String, String), Special>,
    first: HashMap<String, String>,
    last: HashMap<(String, String), String>,
    pair: HashMap<(String, String), String>,
}

static BUILTIN_TABLE: OnceLock<CorrectionTable> = OnceLock::new();

impl CorrectionTable {
    /// The built-in table, enumerated once per process.
    pub fn builtin() -> &'static CorrectionTable {
        BUILTIN_TABLE.get_or_init(|| {
            let mut t = CorrectionTable::default();
            for rule in BUILTIN {
                t.add(*rule);
            }
            t
        })
    }

    /// Built-ins plus rules from `path` (see [`load_rules_file`]), or just the built-ins.
    pub fn with_extra(path: Option<&Path>) -> Result<CorrectionTable> {
        let mut t = Self::builtin().clone();
        if let Some(p) = path {
            let n = t.load_rules_file(p)?;
            logf!("{} extra correction rules read from {}", n, p.display());
        }
        Ok(t)
    }

    pub fn add(&mut self, rule: Rule) {
        match rule {
            Rule::Special { first, last, to_first, to_last, id } => {
                self.add_special(first, last, to_first, to_last, id)
            }
            Rule::FirstName { from, to } => {
                self.first.insert(s!(from), s!(to));
            }
            Rule::LastName { first, from, to } => {
                self.last.insert((s!(first), s!(from)), s!(to));
            }
            Rule::Pair { first, last, to_first } => {
                self.pair.insert((s!(first), s!(last)), s!(to_first));
            }
        }
    }

    fn add_special(&mut self, first: &str, last: &str, to_first: &str, to_last: &str, id: u32) {
        self.special.insert(
            (s!(first), s!(last)),
            Special { first: s!(to_first), last: s!(to_last), id },
        );
    }

    /// Append rules from a CSV with columns `kind,first,last,to_first,to_last,id`,
    /// where `kind` is `special`, `first`, `last` or `pair`. Returns the number added.
    /// Rows that do not form a valid rule are skipped.
    pub fn load_rules_file(&mut self, path: &Path) -> Result<usize> {
        #[derive(Deserialize)]
        struct RuleRow {
            kind: String,
            #[serde(default)]
            first: Option<String>,
            #[serde(default)]
            last: Option<String>,
            #[serde(default)]
            to_first: Option<String>,
            #[serde(default)]
            to_last: Option<String>,
            #[serde(default)]
            id: Option<String>,
        }

        let parsed = csv::read_path::<RuleRow>(path)?;
        let mut added = 0usize;
        for row in parsed.rows {
            let first = non_empty(row.first);
            let last = non_empty(row.last);
            let to_first = non_empty(row.to_first);
            let to_last = non_empty(row.to_last);
            let ok = match (row.kind.to_ascii_lowercase().as_str(), first, last) {
                ("special", Some(f), Some(l)) => {
                    let id = non_empty(row.id)
                        .ok_or_else(|| Error::invalid("correction id", format!("{f} {l}")))
                        .and_then(|v| v.parse::<u32>().map_err(|_| Error::invalid("correction id", v)));
                    match id {
                        Ok(id) => {
                            let tf = to_first.unwrap_or_else(|| f.clone());
                            let tl = to_last.unwrap_or_else(|| l.clone());
                            self.add_special(&f, &l, &tf, &tl, id);
                            true
                        }
                        Err(e) => { logw!("{}: {}", path.display(), e); false }
                    }
                }
                ("first", Some(f), _) => match to_first {
                    Some(to) => { self.first.insert(f, to); true }
                    None => false,
                },
                ("last", Some(f), Some(l)) => match to_last {
                    Some(to) => { self.last.insert((f, l), to); true }
                    None => false,
                },
                ("pair", Some(f), Some(l)) => match to_first {
                    Some(to) => { self.pair.insert((f, l), to); true }
                    None => false,
                },
                _ => false,
            };
            if ok { added += 1; } else { logd!("{}: unusable correction row skipped", path.display()); }
        }
        Ok(added)
    }

    /// Apply the table to one record. Never fails; unknown names pass through.
    pub fn apply(&self, rec: &ExternalRecord) -> Correction {
        let first = rec.first_name.trim();
        let last = rec.last_name.trim();
        let key = (s!(first), s!(last));

        if let Some(sp) = self.special.get(&key) {
            let mut record = rec.clone();
            record.first_name = sp.first.clone();
            record.last_name = sp.last.clone();
            record.claimed_id = Some(sp.id);
            return Correction { record, applied: Applied::Special { id: sp.id } };
        }

        let mut new_first = s!(first);
        let mut new_last = s!(last);
        if let Some(to) = self.last.get(&key) {
            new_last = to.clone();
        }
        if let Some(to) = self.first.get(first) {
            new_first = to.clone();
        }
        if let Some(to) = self.pair.get(&key) {
            new_first = to.clone();
        }

        if new_first == rec.first_name && new_last == rec.last_name {
            return Correction { record: rec.clone(), applied: Applied::Unchanged };
        }
        let mut record = rec.clone();
        record.first_name = new_first;
        record.last_name = new_last;
        Correction { record, applied: Applied::Typo }
    }

    pub fn len(&self) -> usize {
        self.special.len() + self.first.len() + self.last.len() + self.pair.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Characters that only appear in names through OCR damage.
pub fn has_garbled_chars(name: &str) -> bool {
    name.contains('+') || name.contains('&')
}
