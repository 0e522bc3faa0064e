// src/sql/stage_results.rs
//! Upsert script for `stage_results`.
//!
//! Every statement selects its stage through `FROM stages s WHERE s.stage_number = N`,
//! so nothing is inserted when the stage row does not exist, and conflicts on
//! `(stage_id, rider_id)` update in place. Running a script twice leaves the same rows.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use super::{comment_text, num_or_null, quoted, RiderRef, StageResultRow};
use crate::names::normalize_name;

#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    /// Clear each stage's existing results before inserting.
    pub replace: bool,
    /// Append a per-stage count query.
    pub verify: bool,
}

/// A second row for the same rider in one stage; the better position was kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Duplicate {
    pub stage: u32,
    pub rider: RiderRef,
    pub kept_position: u32,
    pub dropped_position: u32,
}

#[derive(Clone, Debug, Default)]
pub struct Rendered {
    pub sql: String,
    pub statements: usize,
    pub stages: Vec<u32>,
    pub duplicates: Vec<Duplicate>,
}

#[derive(Clone, PartialEq, Eq, Hash)]
enum RiderKey {
    Id(u32),
    Name(String, String),
}

fn rider_key(r: &RiderRef) -> RiderKey {
    match r {
        RiderRef::Id(id) => RiderKey::Id(*id),
        RiderRef::Name { first, last } => RiderKey::Name(normalize_name(first), normalize_name(last)),
    }
}

/// Group rows per stage (ascending) keeping input order inside a stage, and keep
/// only the lowest position when a rider appears twice in the same stage.
pub fn dedup_rows(rows: &[StageResultRow]) -> (BTreeMap<u32, Vec<StageResultRow>>, Vec<Duplicate>) {
    let mut by_stage: BTreeMap<u32, Vec<StageResultRow>> = BTreeMap::new();
    let mut seen: HashMap<(u32, RiderKey), usize> = HashMap::new();
    let mut duplicates = Vec::new();

    for row in rows {
        let list = by_stage.entry(row.stage).or_default();
        match seen.get(&(row.stage, rider_key(&row.rider))) {
            Some(&i) => {
                let kept = &mut list[i];
                let (kept_position, dropped_position) = if row.position < kept.position {
                    let old = kept.position;
                    *kept = row.clone();
                    (row.position, old)
                } else {
                    (kept.position, row.position)
                };
                duplicates.push(Duplicate { stage: row.stage, rider: row.rider.clone(), kept_position, dropped_position });
            }
            None => {
                seen.insert((row.stage, rider_key(&row.rider)), list.len());
                list.push(row.clone());
            }
        }
    }
    for d in &duplicates {
        logw!(
            "stage {}: rider {} listed twice (positions {} and {}), keeping {}",
            d.stage, d.rider, d.kept_position, d.dropped_position, d.kept_position
        );
    }
    (by_stage, duplicates)
}

/// Render a complete script. `header` lines become leading `--` comments.
pub fn render_script(header: &[String], rows: &[StageResultRow], opts: &RenderOptions) -> Rendered {
    let (by_stage, duplicates) = dedup_rows(rows);
    let mut sql = String::new();
    let mut statements = 0usize;

    for line in header {
        let _ = writeln!(sql, "-- {}", comment_text(line));
    }
    sql.push_str("-- IMPORTANT: Make sure stages and riders are imported first\n");

    for (stage, stage_rows) in &by_stage {
        let _ = writeln!(sql, "\n-- Stage {stage} Results");
        let _ = writeln!(sql, "-- Total riders: {}\n", stage_rows.len());

        if opts.replace {
            let _ = writeln!(
                sql,
                "DELETE FROM stage_results WHERE stage_id = (SELECT id FROM stages WHERE stage_number = {stage});\n"
            );
        }
        for row in stage_rows {
            sql.push_str(&render_upsert(row));
            sql.push('\n');
            statements += 1;
        }
        if opts.verify {
            sql.push_str(&render_verify(*stage));
            sql.push('\n');
        }
    }

    Rendered { sql, statements, stages: by_stage.keys().copied().collect(), duplicates }
}

/// One idempotent upsert for one row.
pub fn render_upsert(row: &StageResultRow) -> String {
    let mut out = String::new();
    if let Some(note) = &row.note {
        let _ = writeln!(out, "-- {}", comment_text(note));
    }
    out.push_str("INSERT INTO stage_results (stage_id, rider_id, position, time_seconds, same_time_group)\n");

    let time = num_or_null(row.time_seconds);
    let group = num_or_null(row.same_time_group);
    match &row.rider {
        RiderRef::Id(id) => {
            let _ = writeln!(out, "SELECT s.id, {id}, {}, {time}, {group}", row.position);
            out.push_str("FROM stages s\n");
        }
        RiderRef::Name { first, last } => {
            let _ = writeln!(out, "SELECT s.id, r.id, {}, {time}, {group}", row.position);
            out.push_str("FROM stages s\n");
            out.push_str("CROSS JOIN LATERAL (\n");
            out.push_str("  SELECT id FROM riders\n");
            let _ = writeln!(
                out,
                "  WHERE LOWER(TRIM(first_name)) = LOWER({}) AND LOWER(TRIM(last_name)) = LOWER({})",
                quoted(first.trim()),
                quoted(last.trim())
            );
            out.push_str("  ORDER BY id\n  LIMIT 1\n) r\n");
        }
    }
    let _ = writeln!(out, "WHERE s.stage_number = {}", row.stage);
    out.push_str("ON CONFLICT (stage_id, rider_id) DO UPDATE SET\n");
    out.push_str("  position = EXCLUDED.position,\n");
    out.push_str("  time_seconds = EXCLUDED.time_seconds,\n");
    out.push_str("  same_time_group = EXCLUDED.same_time_group;\n");
    out
}

fn render_verify(stage: u32) -> String {
    format!(
        "-- Verify stage {stage}\n\
         SELECT\n  \
           COUNT(*) AS total_results,\n  \
           COUNT(DISTINCT rider_id) AS unique_riders,\n  \
           COUNT(DISTINCT same_time_group) AS time_groups,\n  \
           COUNT(*) FILTER (WHERE time_seconds IS NULL) AS without_time\n\
         FROM stage_results\n\
         WHERE stage_id = (SELECT id FROM stages WHERE stage_number = {stage});\n"
    )
}
