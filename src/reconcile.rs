// src/reconcile.rs
//! Rider identity reconciliation: one external record against the roster index.
//!
//! Decision order (first that applies wins):
//! 1. claimed id known, names equal            → `MatchedByIdAndName`
//! 2. claimed id known, names differ           → `IdNameMismatch::NameDiffers`
//! 3. claimed id unknown, name in roster       → `IdNameMismatch::IdAbsent`
//! 4. no claimed id, name matches one entry    → `MatchedByNameOnly` (unambiguous)
//! 5. no claimed id, name matches several      → `MatchedByNameOnly` (ambiguous)
//! 6. otherwise                                → `Unmatched`
//!
//! Id evidence outranks name evidence, but an id pointing at a different name is
//! always a mismatch for a human to look at. Nothing here rewrites ids.
use crate::corrections::{Applied, CorrectionTable};
use crate::model::{ExternalRecord, RosterEntry};
use crate::roster::RosterIndex;

/// How one id is picked out of several same-name candidates.
pub const TIE_BREAK_POLICY: &str = "first listed in roster order";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchOutcome<'r> {
    MatchedByIdAndName { entry: &'r RosterEntry },
    /// One candidate: unambiguous. More: ambiguous, all kept for the report.
    MatchedByNameOnly { candidates: Vec<&'r RosterEntry> },
    IdNameMismatch(Mismatch<'r>),
    Unmatched { claimed_id: Option<u32> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mismatch<'r> {
    /// The claimed id exists but belongs to a rider with another name.
    /// `name_candidates` are roster entries matching the record's own name.
    NameDiffers {
        claimed_id: u32,
        entry: &'r RosterEntry,
        name_candidates: Vec<&'r RosterEntry>,
    },
    /// The claimed id is not in the roster, but the name is.
    IdAbsent {
        claimed_id: u32,
        candidates: Vec<&'r RosterEntry>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    MatchedByIdAndName,
    MatchedByNameOnly,
    IdNameMismatch,
    Unmatched,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::MatchedByIdAndName => "Matched by id + name",
            Category::MatchedByNameOnly => "Matched by name only",
            Category::IdNameMismatch => "Id mismatch",
            Category::Unmatched => "Not matched",
        }
    }
}

impl<'r> MatchOutcome<'r> {
    pub fn category(&self) -> Category {
        match self {
            MatchOutcome::MatchedByIdAndName { .. } => Category::MatchedByIdAndName,
            MatchOutcome::MatchedByNameOnly { .. } => Category::MatchedByNameOnly,
            MatchOutcome::IdNameMismatch(_) => Category::IdNameMismatch,
            MatchOutcome::Unmatched { .. } => Category::Unmatched,
        }
    }

    /// Several roster entries share the record's name.
    pub fn is_ambiguous(&self) -> bool {
        match self {
            MatchOutcome::MatchedByNameOnly { candidates } => candidates.len() > 1,
            MatchOutcome::IdNameMismatch(Mismatch::NameDiffers { name_candidates, .. }) => name_candidates.len() > 1,
            MatchOutcome::IdNameMismatch(Mismatch::IdAbsent { candidates, .. }) => candidates.len() > 1,
            _ => false,
        }
    }

    /// Id that may be used without review: id+name matches and name-only matches
    /// (ambiguous ones per [`TIE_BREAK_POLICY`]). Mismatches and misses give `None`.
    pub fn resolved_id(&self) -> Option<u32> {
        match self {
            MatchOutcome::MatchedByIdAndName { entry } => Some(entry.id),
            MatchOutcome::MatchedByNameOnly { candidates } => candidates.first().map(|e| e.id),
            _ => None,
        }
    }

    /// Id a correction pass would write: the resolved id, or for a mismatch the first
    /// roster entry carrying the record's name. Callers must report every proposal
    /// that differs from the claimed id.
    pub fn proposed_id(&self) -> Option<u32> {
        match self {
            MatchOutcome::IdNameMismatch(Mismatch::NameDiffers { name_candidates, .. }) => {
                name_candidates.first().map(|e| e.id)
            }
            MatchOutcome::IdNameMismatch(Mismatch::IdAbsent { candidates, .. }) => {
                candidates.first().map(|e| e.id)
            }
            other => other.resolved_id(),
        }
    }
}

/// Classify one (already corrected) record.
pub fn reconcile<'r>(rec: &ExternalRecord, roster: &'r RosterIndex) -> MatchOutcome<'r> {
    let key = rec.key();
    let by_name = roster.by_name(&key);

    match rec.claimed_id {
        Some(id) => match roster.by_id(id) {
            Some(entry) if entry.key() == key => MatchOutcome::MatchedByIdAndName { entry },
            Some(entry) => MatchOutcome::IdNameMismatch(Mismatch::NameDiffers {
                claimed_id: id,
                entry,
                name_candidates: by_name,
            }),
            None if !by_name.is_empty() => {
                MatchOutcome::IdNameMismatch(Mismatch::IdAbsent { claimed_id: id, candidates: by_name })
            }
            None => MatchOutcome::Unmatched { claimed_id: Some(id) },
        },
        None if !by_name.is_empty() => MatchOutcome::MatchedByNameOnly { candidates: by_name },
        None => MatchOutcome::Unmatched { claimed_id: None },
    }
}

/// One input record after correction and classification.
#[derive(Clone, Debug)]
pub struct Reconciled<'r> {
    /// As read from the source
    pub original: ExternalRecord,
    /// After the correction table (same as `original` when nothing applied)
    pub record: ExternalRecord,
    pub applied: Applied,
    pub outcome: MatchOutcome<'r>,
}

/// Correct (when a table is given) and classify every record, preserving input order.
pub fn reconcile_all<'r>(
    records: &[ExternalRecord],
    roster: &'r RosterIndex,
    table: Option<&CorrectionTable>,
) -> Vec<Reconciled<'r>> {
    records
        .iter()
        .map(|rec| {
            let (record, applied) = match table {
                Some(t) => {
                    let c = t.apply(rec);
                    (c.record, c.applied)
                }
                None => (rec.clone(), Applied::Unchanged),
            };
            let outcome = reconcile(&record, roster);
            logd!("pos {} {} -> {}", record.position, record.full_name(), outcome.category().label());
            Reconciled { original: rec.clone(), record, applied, outcome }
        })
        .collect()
}
