// src/report.rs
//! Console reports. Every renderer writes to any `io::Write` (stdout in the binary,
//! a buffer in tests) and never decides anything; the numbers come from `runner`.

use std::io::{self, Write};
use std::path::PathBuf;

use crate::config::consts::*;
use crate::config::options::DnfPolicy;
use crate::corrections::{has_garbled_chars, Applied};
use crate::input::Loaded;
use crate::model::RosterEntry;
use crate::reconcile::{Category, MatchOutcome, Mismatch, Reconciled, TIE_BREAK_POLICY};
use crate::roster::RosterIndex;
use crate::sql::stage_results::Duplicate;
use crate::sql::validate::Validation;
use crate::timing::TimeStatus;

type Out<'a> = &'a mut dyn Write;

pub fn banner(out: Out, title: &str) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "\n{rule}\n{title}\n{rule}")
}

/// Print at most `limit` items, then "... and N more".
pub fn preview<T>(
    out: Out,
    items: &[T],
    limit: usize,
    mut line: impl FnMut(&mut dyn Write, &T) -> io::Result<()>,
) -> io::Result<()> {
    for item in items.iter().take(limit) {
        line(&mut *out, item)?;
    }
    if items.len() > limit {
        writeln!(out, "  ... and {} more", items.len() - limit)?;
    }
    Ok(())
}

fn id_list(entries: &[&RosterEntry]) -> String {
    entries.iter().map(|e| e.id.to_string()).collect::<Vec<_>>().join(", ")
}

fn correction_note(r: &Reconciled<'_>) -> String {
    match r.applied {
        Applied::Unchanged => s!(),
        _ => format!(" (corrected from {})", r.original.full_name()),
    }
}

fn join_ids(ids: &[u32]) -> String {
    ids.iter().map(u32::to_string).collect::<Vec<_>>().join(", ")
}

fn opt_id(id: Option<u32>) -> String {
    id.map(|i| i.to_string()).unwrap_or_else(|| s!("none"))
}

/* ---------------- compare ---------------- */

pub fn compare(out: Out, roster: &RosterIndex, loaded: &Loaded, rows: &[Reconciled<'_>]) -> io::Result<()> {
    let of = |c: Category| rows.iter().filter(|r| r.outcome.category() == c).collect::<Vec<_>>();
    let by_id = of(Category::MatchedByIdAndName);
    let by_name = of(Category::MatchedByNameOnly);
    let mismatches = of(Category::IdNameMismatch);
    let unmatched = of(Category::Unmatched);
    let ambiguous: Vec<_> = rows.iter().filter(|r| r.outcome.is_ambiguous()).collect();
    let total = rows.len();

    writeln!(out, "Roster: {} riders ({} rows skipped)", roster.len(), roster.skipped())?;
    writeln!(out, "Results: {} riders from {} ({} rows skipped)", total, loaded.source.display(), loaded.skipped)?;

    banner(out, "COMPARISON RESULTS")?;
    writeln!(out, "{}: {}", Category::MatchedByIdAndName.label(), by_id.len())?;
    writeln!(out, "{}: {} ({} ambiguous)", Category::MatchedByNameOnly.label(), by_name.len(), ambiguous.len())?;
    writeln!(out, "{}: {}", Category::IdNameMismatch.label(), mismatches.len())?;
    writeln!(out, "{}: {}", Category::Unmatched.label(), unmatched.len())?;

    let matched = by_id.len() + by_name.len();
    let problems = mismatches.len() + unmatched.len();
    writeln!(out, "\nTotal: {total} riders")?;
    writeln!(out, "  - matched: {} ({})", matched, pct!(matched, total))?;
    writeln!(out, "  - problems: {} ({})", problems, pct!(problems, total))?;

    if !mismatches.is_empty() {
        banner(out, "ID MISMATCHES")?;
        preview(out, &mismatches, PREVIEW_MISMATCHES, |o, r| mismatch_lines(o, r))?;
    }

    if !unmatched.is_empty() {
        banner(out, "NOT MATCHED")?;
        preview(out, &unmatched, PREVIEW_UNMATCHED, |o, r| {
            let claimed = match r.outcome {
                MatchOutcome::Unmatched { claimed_id } => claimed_id,
                _ => None,
            };
            writeln!(
                o,
                "Pos {}: {}{} (id: {}) - name not in roster",
                r.record.position,
                r.record.full_name(),
                correction_note(r),
                opt_id(claimed)
            )
        })?;
    }

    if !ambiguous.is_empty() {
        banner(out, &format!("AMBIGUOUS NAMES (tie-break: {TIE_BREAK_POLICY})"))?;
        preview(out, &ambiguous, PREVIEW_MISMATCHES, |o, r| {
            let candidates = match &r.outcome {
                MatchOutcome::MatchedByNameOnly { candidates } => candidates.clone(),
                MatchOutcome::IdNameMismatch(Mismatch::NameDiffers { name_candidates, .. }) => name_candidates.clone(),
                MatchOutcome::IdNameMismatch(Mismatch::IdAbsent { candidates, .. }) => candidates.clone(),
                MatchOutcome::Unmatched { .. } | MatchOutcome::MatchedByIdAndName { .. } => Vec::new(),
            };
            writeln!(
                o,
                "Pos {}: {} -> id {} of [{}]",
                r.record.position,
                r.record.full_name(),
                opt_id(r.outcome.proposed_id()),
                id_list(&candidates)
            )
        })?;
    }

    if !by_id.is_empty() {
        banner(out, "EXAMPLES (id + name)")?;
        for r in by_id.iter().take(PREVIEW_EXAMPLES) {
            writeln!(out, "Pos {}: {} (id: {}) ok", r.record.position, r.record.full_name(), opt_id(r.outcome.resolved_id()))?;
        }
    }
    if !by_name.is_empty() {
        banner(out, "EXAMPLES (name only)")?;
        for r in by_name.iter().take(PREVIEW_EXAMPLES) {
            if let MatchOutcome::MatchedByNameOnly { candidates } = &r.outcome {
                if candidates.len() > 1 {
                    writeln!(out, "Pos {}: {} - {} roster matches", r.record.position, r.record.full_name(), candidates.len())?;
                } else if let Some(e) = candidates.first() {
                    writeln!(out, "Pos {}: {} -> {} (id: {}) ok", r.record.position, r.record.full_name(), e.full_name(), e.id)?;
                }
            }
        }
    }

    let garbled: Vec<_> = rows
        .iter()
        .filter(|r| has_garbled_chars(&r.record.first_name) || has_garbled_chars(&r.record.last_name))
        .collect();
    if !garbled.is_empty() {
        banner(out, "GARBLED NAMES")?;
        preview(out, &garbled, PREVIEW_UNMATCHED, |o, r| {
            writeln!(o, "Pos {}: {}", r.record.position, r.record.full_name())
        })?;
    }

    banner(out, "SUMMARY")?;
    writeln!(out, "Perfect match (id + name): {}", by_id.len())?;
    writeln!(out, "Match on name: {}", by_name.len())?;
    writeln!(out, "Problems: {}", mismatches.len())?;
    writeln!(out, "Not found: {}", unmatched.len())
}

fn mismatch_lines(o: &mut dyn Write, r: &Reconciled<'_>) -> io::Result<()> {
    writeln!(o, "\nPos {}: {}{}", r.record.position, r.record.full_name(), correction_note(r))?;
    match &r.outcome {
        MatchOutcome::IdNameMismatch(Mismatch::NameDiffers { claimed_id, entry, name_candidates }) => {
            writeln!(o, "  Issue: id {} belongs to another rider", claimed_id)?;
            writeln!(o, "  Roster: {} (id: {})", entry.full_name(), entry.id)?;
            writeln!(o, "  Name matches: {} found", name_candidates.len())?;
            for e in name_candidates {
                writeln!(o, "    - {} (id: {})", e.full_name(), e.id)?;
            }
        }
        MatchOutcome::IdNameMismatch(Mismatch::IdAbsent { claimed_id, candidates }) => {
            writeln!(o, "  Issue: id {} not in roster, name is", claimed_id)?;
            writeln!(o, "  Name matches: {} found", candidates.len())?;
            for e in candidates {
                writeln!(o, "    - {} (id: {})", e.full_name(), e.id)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/* ---------------- fix ---------------- */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdCorrection {
    pub position: u32,
    pub name: String,
    pub old_id: u32,
    pub new_id: u32,
    pub roster_name: String,
    /// Roster entries sharing the name; more than one means the tie-break picked.
    pub candidates: usize,
}

#[derive(Clone, Debug, Default)]
pub struct FixStats {
    pub out_path: PathBuf,
    pub total: usize,
    pub with_id: usize,
    pub names_corrected: usize,
    pub id_corrections: Vec<IdCorrection>,
    /// (position, name, id that was dropped)
    pub without_id: Vec<(u32, String, Option<u32>)>,
    pub skipped: usize,
}

pub fn fix(out: Out, st: &FixStats) -> io::Result<()> {
    banner(out, "RESULTS")?;
    writeln!(out, "Corrected CSV written: {}", st.out_path.display())?;
    if st.skipped > 0 {
        writeln!(out, "Input rows skipped: {}", st.skipped)?;
    }

    let without = st.total.saturating_sub(st.with_id);
    writeln!(out, "\nStatistics:")?;
    writeln!(out, "  - riders with rider_id: {} ({})", st.with_id, pct!(st.with_id, st.total))?;
    writeln!(out, "  - riders without rider_id: {} ({})", without, pct!(without, st.total))?;
    writeln!(out, "  - names corrected: {}", st.names_corrected)?;

    if !st.id_corrections.is_empty() {
        writeln!(out, "\n{} id corrections:", st.id_corrections.len())?;
        preview(out, &st.id_corrections, PREVIEW_CORRECTIONS, |o, c| {
            writeln!(o, "  Pos {}: {}", c.position, c.name)?;
            if c.candidates > 1 {
                writeln!(
                    o,
                    "     {} -> {} ({}; {} matches, {})",
                    c.old_id, c.new_id, c.roster_name, c.candidates, TIE_BREAK_POLICY
                )
            } else {
                writeln!(o, "     {} -> {} ({})", c.old_id, c.new_id, c.roster_name)
            }
        })?;
    }

    if !st.without_id.is_empty() {
        writeln!(out, "\n{} riders without rider_id:", st.without_id.len())?;
        preview(out, &st.without_id, PREVIEW_NO_ID, |o, (pos, name, dropped)| match dropped {
            Some(id) => writeln!(o, "  Pos {pos}: {name} (id {id} dropped)"),
            None => writeln!(o, "  Pos {pos}: {name}"),
        })?;
    }
    Ok(())
}

/* ---------------- stage scripts ---------------- */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NonFinisher {
    pub position: u32,
    pub name: String,
    pub status: TimeStatus,
}

/// (stage, position, name)
pub type StageRider = (u32, u32, String);

/// Row written with the id the tie-break picked out of `candidates`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmbiguousRider {
    pub stage: u32,
    pub position: u32,
    pub name: String,
    pub chosen: u32,
    pub candidates: Vec<u32>,
}

/// Row left out because its claimed id contradicts the roster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdConflict {
    pub stage: u32,
    pub position: u32,
    pub name: String,
    pub claimed_id: u32,
    /// Who the claimed id belongs to; `None` when the id is not in the roster.
    pub roster_name: Option<String>,
    /// Roster ids carrying the row's own name
    pub candidates: Vec<u32>,
}

#[derive(Clone, Debug, Default)]
pub struct ScriptStats {
    pub out_path: PathBuf,
    pub sources: Vec<String>,
    pub statements: usize,
    pub stages: Vec<u32>,
    pub finishers: usize,
    pub non_finishers: Vec<NonFinisher>,
    pub dnf_policy: Option<DnfPolicy>,
    pub time_groups: usize,
    pub names_corrected: usize,
    /// Rows left for the script to resolve by name
    pub by_name: Vec<StageRider>,
    pub ambiguous: Vec<AmbiguousRider>,
    pub id_conflicts: Vec<IdConflict>,
    /// Rows left out because the name is not in the roster
    pub unresolved: Vec<StageRider>,
    pub duplicates: Vec<Duplicate>,
    pub skipped: usize,
    /// (stage, reason)
    pub failed_stages: Vec<(u32, String)>,
}

pub fn script(out: Out, st: &ScriptStats) -> io::Result<()> {
    if !st.non_finishers.is_empty() || st.dnf_policy.is_some() {
        banner(out, "ANALYSIS")?;
        writeln!(out, "  finished: {}", st.finishers)?;
        writeln!(out, "  did not finish: {}", st.non_finishers.len())?;
        preview(out, &st.non_finishers, PREVIEW_NON_FINISHERS, |o, n| {
            let status = match n.status {
                TimeStatus::Unknown => "no time",
                s => s.code(),
            };
            writeln!(o, "    Pos {}: {} - {}", n.position, n.name, status)
        })?;
        if let Some(policy) = st.dnf_policy {
            let what = match policy {
                DnfPolicy::Skip => s!("left out (finishers only)"),
                DnfPolicy::NullTime => s!("included with NULL time_seconds"),
                DnfPolicy::Placeholder => format!("included at positions {DNF_POSITION_BASE}+"),
            };
            writeln!(out, "\n  Non-finishers are {what}")?;
        }
    }

    if !st.failed_stages.is_empty() {
        banner(out, "FAILED STAGES")?;
        for (stage, why) in &st.failed_stages {
            writeln!(out, "  Stage {stage}: {why}")?;
        }
    }

    if !st.duplicates.is_empty() {
        banner(out, "DUPLICATE RIDERS")?;
        preview(out, &st.duplicates, PREVIEW_MISMATCHES, |o, d| {
            writeln!(
                o,
                "  Stage {}: {} at positions {} and {}, kept {}",
                d.stage, d.rider, d.kept_position, d.dropped_position, d.kept_position
            )
        })?;
    }

    if !st.by_name.is_empty() {
        banner(out, "RESOLVED BY NAME IN SQL")?;
        preview(out, &st.by_name, PREVIEW_NO_ID, |o, (stage, pos, name)| {
            writeln!(o, "  Stage {stage} pos {pos}: {name}")
        })?;
    }

    if !st.ambiguous.is_empty() {
        banner(out, &format!("AMBIGUOUS NAMES (tie-break: {TIE_BREAK_POLICY})"))?;
        preview(out, &st.ambiguous, PREVIEW_MISMATCHES, |o, a| {
            writeln!(o, "  Stage {} pos {}: {} -> id {} of [{}]", a.stage, a.position, a.name, a.chosen, join_ids(&a.candidates))
        })?;
    }

    if !st.id_conflicts.is_empty() {
        banner(out, "ID MISMATCH (left out)")?;
        preview(out, &st.id_conflicts, PREVIEW_MISMATCHES, |o, c| {
            let owner = match &c.roster_name {
                Some(n) => format!("roster has {n}"),
                None => s!("not in roster"),
            };
            let by_name = match c.candidates.as_slice() {
                [] => s!("name not in roster"),
                ids => format!("name matches [{}]", join_ids(ids)),
            };
            writeln!(o, "  Stage {} pos {}: {} claims id {} ({}); {}", c.stage, c.position, c.name, c.claimed_id, owner, by_name)
        })?;
    }

    if !st.unresolved.is_empty() {
        banner(out, "NOT IN ROSTER (left out)")?;
        preview(out, &st.unresolved, PREVIEW_UNMATCHED, |o, (stage, pos, name)| {
            writeln!(o, "  Stage {stage} pos {pos}: {name}")
        })?;
    }

    banner(out, "RESULT")?;
    writeln!(out, "SQL script written: {}", st.out_path.display())?;
    if !st.sources.is_empty() {
        writeln!(out, "  - from: {}", st.sources.join(", "))?;
    }
    writeln!(out, "  - {} statements over {} stage(s)", st.statements, st.stages.len())?;
    writeln!(out, "  - {} riders with time, {} distinct time groups", st.finishers, st.time_groups)?;
    if st.names_corrected > 0 {
        writeln!(out, "  - {} names corrected", st.names_corrected)?;
    }
    if !st.ambiguous.is_empty() {
        writeln!(out, "  - {} ambiguous names written with the tie-break pick", st.ambiguous.len())?;
    }
    let left_out = st.id_conflicts.len() + st.unresolved.len();
    if left_out > 0 {
        writeln!(out, "  - {left_out} riders left out for review")?;
    }
    if st.skipped > 0 {
        writeln!(out, "  - {} input lines skipped", st.skipped)?;
    }
    writeln!(out, "\nNext step: run the SQL script in your database")
}

/* ---------------- photos ---------------- */

#[derive(Clone, Debug, Default)]
pub struct PhotoStats {
    pub out_path: PathBuf,
    /// Riders looked up
    pub total: usize,
    pub updated: usize,
    /// Roster rows that already had a photo
    pub with_photo: usize,
    pub skipped: usize,
    /// (rider id, name, reason)
    pub failed: Vec<(u32, String, String)>,
}

pub fn photos(out: Out, st: &PhotoStats) -> io::Result<()> {
    if !st.failed.is_empty() {
        banner(out, "NO PHOTO")?;
        preview(out, &st.failed, PREVIEW_UNMATCHED, |o, (id, name, why)| {
            writeln!(o, "  {name} (id {id}): {why}")
        })?;
    }

    banner(out, "RESULT")?;
    writeln!(out, "SQL script written: {}", st.out_path.display())?;
    writeln!(out, "  - photos found: {} of {} ({})", st.updated, st.total, pct!(st.updated, st.total))?;
    writeln!(out, "  - failed: {}", st.failed.len())?;
    if st.with_photo > 0 {
        writeln!(out, "  - {} riders already had a photo", st.with_photo)?;
    }
    if st.skipped > 0 {
        writeln!(out, "  - {} roster rows skipped", st.skipped)?;
    }
    writeln!(out, "\nNext step: run the SQL script in your database")
}

/* ---------------- riders / validate ---------------- */

pub fn riders(out: Out, out_path: &std::path::Path, count: usize, skipped: usize) -> io::Result<()> {
    writeln!(out, "Generated {} with {} riders", out_path.display(), count)?;
    if skipped > 0 {
        writeln!(out, "  - {skipped} rows skipped (no last name or unreadable)")?;
    }
    Ok(())
}

pub fn validation(out: Out, path: &std::path::Path, v: &Validation) -> io::Result<()> {
    if !v.issues.is_empty() {
        writeln!(out, "Issues found in {}:", path.display())?;
        for issue in &v.issues {
            writeln!(out, "   - {issue}")?;
        }
    } else if v.has_sql {
        writeln!(out, "SQL file is valid: {}", path.display())?;
        writeln!(out, "   - size: {} characters", v.chars)?;
        writeln!(out, "   - lines: {}", v.lines)?;
        writeln!(out, "   - contains SQL keywords")?;
    } else {
        writeln!(out, "File does not appear to contain SQL: {}", path.display())?;
    }
    Ok(())
}
