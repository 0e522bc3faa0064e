// src/runner.rs
//! One function per job. Each loads its inputs, builds the output fully in memory,
//! writes it with a single `fs::write`, and prints its report to `out`.
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::config::consts::{DEFAULT_CSV_SQL, DEFAULT_FETCH_SQL, DEFAULT_FIXED_CSV, DEFAULT_IMPORT_SQL,
                            DEFAULT_PHOTOS_SQL, DEFAULT_RIDERS_SQL, DEFAULT_STAGE_SQL, DNF_POSITION_BASE,
                            PHOTO_JPEG_QUALITY};
use crate::config::options::*;
use crate::core::net::{HttpSource, PageSource};
use crate::corrections::{Applied, CorrectionTable};
use crate::error::{Error, Result};
use crate::file::{display_name, resolve_out_path, write_output};
use crate::input;
use crate::model::{ExternalRecord, RosterEntry};
use crate::photo::to_data_url;
use crate::progress::Progress;
use crate::reconcile::{reconcile_all, MatchOutcome, Mismatch};
use crate::report::{self, AmbiguousRider, FixStats, IdConflict, IdCorrection, NonFinisher, PhotoStats, ScriptStats};
use crate::roster::RosterIndex;
use crate::specs;
use crate::sql::photos::{render_photos_script, PhotoUpdate};
use crate::sql::riders::render_riders_script;
use crate::sql::stage_results::{dedup_rows, render_script, Duplicate, RenderOptions};
use crate::sql::validate::validate_sql;
use crate::sql::{RiderRef, StageResultRow};
use crate::timing::{parse_time, same_time_groups, ParsedTime, TimeStatus};

/// Columns of the corrected stage CSV written by `fix`.
pub const FIXED_HEADERS: [&str; 6] = ["position", "first_name", "last_name", "rider_id", "team_name", "time_seconds"];

/// Summary of what was produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub files_written: Vec<PathBuf>,
    /// False when a validation job found problems.
    pub passed: bool,
}

impl RunSummary {
    fn wrote(path: PathBuf) -> Self {
        Self { files_written: vec![path], passed: true }
    }
}

/// Top-level runner: dispatch on the job and run it.
/// `progress` can be None (no updates) or Some(&mut impl Progress).
pub fn run(job: &Job, progress: Option<&mut dyn Progress>, out: &mut dyn Write) -> Result<RunSummary> {
    logd!("job: {}", job.name());
    match job {
        Job::Compare(o) => compare(o, out),
        Job::Fix(o) => fix(o, out),
        Job::Generate(o) => generate(o, out),
        Job::Import(o) => import(o, out),
        Job::Fetch(o) => {
            let mut source = HttpSource::new(o.timeout_secs);
            fetch(o, &mut source, progress, out)
        }
        Job::CsvSql(o) => csv_sql(o, out),
        Job::RidersSql(o) => riders_sql(o, out),
        Job::Photos(o) => {
            let mut source = HttpSource::new(o.timeout_secs);
            photos(o, &mut source, progress, out)
        }
        Job::Validate(o) => validate(o, out),
    }
}

fn out_path(user: &Path, default: &str) -> PathBuf {
    resolve_out_path(user, &display_name(Path::new(default)))
}

/* ---------------- identity resolution ---------------- */

/// A corrected record and the rider reference it will be written with.
struct Resolved {
    original: ExternalRecord,
    record: ExternalRecord,
    /// `None`: the roster could not identify the rider.
    rider: Option<RiderRef>,
    corrected: bool,
    review: Option<Review>,
}

/// Roster evidence a human has to look at.
enum Review {
    /// Several entries share the name; the tie-break picked the written id.
    Ambiguous { candidates: Vec<u32> },
    /// The claimed id contradicts the roster; the row is left out.
    IdConflict { claimed_id: u32, roster_name: Option<String>, candidates: Vec<u32> },
}

fn entry_ids(entries: &[&RosterEntry]) -> Vec<u32> {
    entries.iter().map(|e| e.id).collect()
}

fn review_of(outcome: &MatchOutcome<'_>) -> Option<Review> {
    match outcome {
        MatchOutcome::MatchedByNameOnly { candidates } if candidates.len() > 1 => {
            Some(Review::Ambiguous { candidates: entry_ids(candidates) })
        }
        MatchOutcome::IdNameMismatch(Mismatch::NameDiffers { claimed_id, entry, name_candidates }) => {
            Some(Review::IdConflict {
                claimed_id: *claimed_id,
                roster_name: Some(entry.full_name()),
                candidates: entry_ids(name_candidates),
            })
        }
        MatchOutcome::IdNameMismatch(Mismatch::IdAbsent { claimed_id, candidates }) => {
            Some(Review::IdConflict { claimed_id: *claimed_id, roster_name: None, candidates: entry_ids(candidates) })
        }
        _ => None,
    }
}

/// With a roster: ids come from reconciliation (tie-break applies), everything else
/// is unresolved. Without one: claimed ids are trusted and the rest is looked up by
/// name in SQL. Known typos are corrected either way.
fn resolve_records(records: &[ExternalRecord], roster: Option<&RosterIndex>, table: &CorrectionTable) -> Vec<Resolved> {
    match roster {
        Some(roster) => reconcile_all(records, roster, Some(table))
            .into_iter()
            .map(|r| {
                let (id, review) = match r.applied {
                    Applied::Special { id } => (Some(id), None),
                    _ => (r.outcome.resolved_id(), review_of(&r.outcome)),
                };
                Resolved {
                    corrected: r.applied != Applied::Unchanged,
                    rider: id.map(RiderRef::Id),
                    review,
                    record: r.record,
                    original: r.original,
                }
            })
            .collect(),
        None => records
            .iter()
            .map(|rec| {
                let c = table.apply(rec);
                let rider = match c.record.claimed_id {
                    Some(id) => RiderRef::Id(id),
                    None => RiderRef::Name { first: c.record.first_name.clone(), last: c.record.last_name.clone() },
                };
                Resolved {
                    corrected: c.changed(),
                    rider: Some(rider),
                    review: None,
                    record: c.record,
                    original: rec.clone(),
                }
            })
            .collect(),
    }
}

/// Put anything about `r` that needs review into `st`. `None` leaves the row out.
fn checked_rider(st: &mut ScriptStats, stage: u32, name: String, r: &Resolved) -> Option<RiderRef> {
    let position = r.record.position;
    match (&r.review, &r.rider) {
        (Some(Review::Ambiguous { candidates }), Some(RiderRef::Id(chosen))) => {
            st.ambiguous.push(AmbiguousRider { stage, position, name, chosen: *chosen, candidates: candidates.clone() });
        }
        (Some(Review::IdConflict { claimed_id, roster_name, candidates }), _) => {
            st.id_conflicts.push(IdConflict {
                stage,
                position,
                name,
                claimed_id: *claimed_id,
                roster_name: roster_name.clone(),
                candidates: candidates.clone(),
            });
        }
        (_, None) => st.unresolved.push((stage, position, name)),
        _ => {}
    }
    r.rider.clone()
}

fn note_for(r: &Resolved, status: Option<&str>) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(s) = status {
        parts.push(s!(s));
    }
    if r.corrected {
        parts.push(format!("{} (corrected from {})", r.record.full_name(), r.original.full_name()));
    }
    (!parts.is_empty()).then(|| parts.join("; "))
}

/// Drop repeated riders, then number same-time groups per stage.
fn finalize(rows: Vec<StageResultRow>) -> (Vec<StageResultRow>, Vec<Duplicate>) {
    let (by_stage, dups) = dedup_rows(&rows);
    let mut out = Vec::with_capacity(rows.len());
    for (_, mut stage_rows) in by_stage {
        let times: Vec<Option<u32>> = stage_rows.iter().map(|r| r.time_seconds).collect();
        for (row, group) in stage_rows.iter_mut().zip(same_time_groups(&times)) {
            row.same_time_group = group;
        }
        out.extend(stage_rows);
    }
    (out, dups)
}

fn count_groups(rows: &[StageResultRow]) -> usize {
    rows.iter()
        .filter_map(|r| r.same_time_group.map(|g| (r.stage, g)))
        .collect::<HashSet<_>>()
        .len()
}

fn load_roster(path: Option<&Path>) -> Result<Option<RosterIndex>> {
    path.map(RosterIndex::load).transpose()
}

/* ---------------- compare ---------------- */

fn compare(o: &CompareOptions, out: &mut dyn Write) -> Result<RunSummary> {
    let roster = RosterIndex::load(&o.roster)?;
    let loaded = input::load_stage_csv(&o.results)?;
    let table = if o.correct { Some(CorrectionTable::with_extra(o.extra_corrections.as_deref())?) } else { None };

    let rows = reconcile_all(&loaded.records, &roster, table.as_ref());
    report::compare(out, &roster, &loaded, &rows)?;
    Ok(RunSummary { files_written: Vec::new(), passed: true })
}

/* ---------------- fix ---------------- */

fn candidate_count(outcome: &MatchOutcome<'_>) -> usize {
    match outcome {
        MatchOutcome::MatchedByNameOnly { candidates } => candidates.len(),
        MatchOutcome::IdNameMismatch(Mismatch::NameDiffers { name_candidates, .. }) => name_candidates.len(),
        MatchOutcome::IdNameMismatch(Mismatch::IdAbsent { candidates, .. }) => candidates.len(),
        MatchOutcome::MatchedByIdAndName { .. } | MatchOutcome::Unmatched { .. } => 1,
    }
}

fn fix(o: &FixOptions, out: &mut dyn Write) -> Result<RunSummary> {
    let roster = RosterIndex::load(&o.roster)?;
    let loaded = input::load_stage_csv(&o.results)?;
    let table = CorrectionTable::with_extra(o.extra_corrections.as_deref())?;
    let rows = reconcile_all(&loaded.records, &roster, Some(&table));

    let mut st = FixStats { total: rows.len(), skipped: loaded.skipped, ..Default::default() };
    let mut csv_rows = Vec::with_capacity(rows.len());

    for r in &rows {
        if r.applied != Applied::Unchanged {
            st.names_corrected += 1;
        }
        // Pinned ids from the correction table win over any proposal.
        let id = match r.applied {
            Applied::Special { id } => Some(id),
            _ => r.outcome.proposed_id(),
        };

        if let (Some(old), Some(new)) = (r.original.claimed_id, id) {
            if old != new {
                st.id_corrections.push(IdCorrection {
                    position: r.record.position,
                    name: r.original.full_name(),
                    old_id: old,
                    new_id: new,
                    roster_name: roster.by_id(new).map(|e| e.full_name()).unwrap_or_else(|| r.record.full_name()),
                    candidates: candidate_count(&r.outcome),
                });
            }
        }
        match id {
            Some(_) => st.with_id += 1,
            None => st.without_id.push((r.record.position, r.record.full_name(), r.original.claimed_id)),
        }

        csv_rows.push(vec![
            r.record.position.to_string(),
            r.record.first_name.clone(),
            r.record.last_name.clone(),
            id.map(|i| i.to_string()).unwrap_or_default(),
            r.record.team.clone().unwrap_or_default(),
            r.record.time.clone().unwrap_or_default(),
        ]);
    }

    let text = crate::csv::to_csv_string(&FIXED_HEADERS, &csv_rows)?;
    let path = write_output(&out_path(&o.out, DEFAULT_FIXED_CSV), &text)?;
    st.out_path = path.clone();
    report::fix(out, &st)?;
    Ok(RunSummary::wrote(path))
}

/* ---------------- generate ---------------- */

fn generate(o: &GenerateOptions, out: &mut dyn Write) -> Result<RunSummary> {
    let loaded = input::load_stage_csv_preferring(&o.input, o.fallback.as_deref())?;
    if loaded.records.is_empty() {
        return Err(Error::NoRecords(loaded.source.display().to_string()));
    }
    let roster = load_roster(o.roster.as_deref())?;
    let table = CorrectionTable::with_extra(o.extra_corrections.as_deref())?;

    let mut st = ScriptStats { sources: vec![display_name(&loaded.source)], skipped: loaded.skipped, ..Default::default() };
    let mut rows = Vec::with_capacity(loaded.records.len());

    for r in resolve_records(&loaded.records, roster.as_ref(), &table) {
        let pos = r.record.position;
        if r.corrected {
            st.names_corrected += 1;
        }
        let Some(rider) = checked_rider(&mut st, o.stage, r.record.full_name(), &r) else {
            continue;
        };
        if matches!(rider, RiderRef::Name { .. }) {
            st.by_name.push((o.stage, pos, r.record.full_name()));
        }

        let parsed = parse_time(r.record.time.as_deref().unwrap_or(""));
        let status = match parsed {
            ParsedTime::Seconds(_) => {
                st.finishers += 1;
                None
            }
            ParsedTime::NoTime(status) => {
                st.non_finishers.push(NonFinisher { position: pos, name: r.record.full_name(), status });
                Some(status.code())
            }
        };
        let row = StageResultRow::new(o.stage, rider, pos).timed(parsed.seconds(), None);
        rows.push(match note_for(&r, status) {
            Some(n) => row.with_note(n),
            None => row,
        });
    }

    let header = [
        format!("SQL Script to import Stage {} results from {}", o.stage, display_name(&loaded.source)),
        format!("Rows: {}", rows.len()),
    ];
    write_stage_script(&header, rows, o.replace, &out_path(&o.out, DEFAULT_STAGE_SQL), st, out)
}

/* ---------------- import ---------------- */

fn import(o: &ImportOptions, out: &mut dyn Write) -> Result<RunSummary> {
    let loaded = input::load_free_text_or_csv(&o.input, o.fallback.as_deref())?;
    let roster = load_roster(o.roster.as_deref())?;
    let table = CorrectionTable::with_extra(o.extra_corrections.as_deref())?;

    let mut st = ScriptStats {
        sources: vec![display_name(&loaded.source)],
        skipped: loaded.skipped,
        dnf_policy: Some(o.dnf),
        ..Default::default()
    };
    let mut rows = Vec::with_capacity(loaded.records.len());
    let mut placeholder = DNF_POSITION_BASE;

    for r in resolve_records(&loaded.records, roster.as_ref(), &table) {
        let pos = r.record.position;
        if r.corrected {
            st.names_corrected += 1;
        }
        let Some(rider) = checked_rider(&mut st, o.stage, r.record.full_name(), &r) else {
            continue;
        };

        match parse_time(r.record.time.as_deref().unwrap_or("")) {
            ParsedTime::Seconds(secs) => {
                st.finishers += 1;
                let row = StageResultRow::new(o.stage, rider, pos).timed(Some(secs), None);
                rows.push(match note_for(&r, None) {
                    Some(n) => row.with_note(n),
                    None => row,
                });
            }
            ParsedTime::NoTime(status) => {
                st.non_finishers.push(NonFinisher { position: pos, name: r.record.full_name(), status });
                let position = match o.dnf {
                    DnfPolicy::Skip => continue,
                    DnfPolicy::NullTime => pos,
                    DnfPolicy::Placeholder => {
                        placeholder += 1;
                        placeholder - 1
                    }
                };
                let code = match status {
                    TimeStatus::Unknown => s!("no time"),
                    other => s!(other.code()),
                };
                let note = if position == pos { code } else { format!("{code}, listed at {pos}") };
                let mut row = StageResultRow::new(o.stage, rider, position);
                row = match note_for(&r, Some(&note)) {
                    Some(n) => row.with_note(n),
                    None => row,
                };
                rows.push(row);
            }
        }
    }

    let header = [
        format!("SQL Script to import Stage {} results from {}", o.stage, display_name(&loaded.source)),
        format!(
            "Total riders: {} ({} finished, {} without time)",
            st.finishers + st.non_finishers.len(),
            st.finishers,
            st.non_finishers.len()
        ),
    ];
    write_stage_script(&header, rows, o.replace, &out_path(&o.out, DEFAULT_IMPORT_SQL), st, out)
}

fn write_stage_script(
    header: &[String],
    rows: Vec<StageResultRow>,
    replace: bool,
    path: &Path,
    mut st: ScriptStats,
    out: &mut dyn Write,
) -> Result<RunSummary> {
    let (rows, duplicates) = finalize(rows);
    let rendered = render_script(header, &rows, &RenderOptions { replace, verify: true });

    let path = write_output(path, &rendered.sql)?;
    st.out_path = path.clone();
    st.statements = rendered.statements;
    st.stages = rendered.stages;
    st.time_groups = count_groups(&rows);
    st.duplicates = duplicates;
    report::script(out, &st)?;
    Ok(RunSummary::wrote(path))
}

/* ---------------- fetch ---------------- */

/// Fetch every requested stage from `source`, pausing between requests.
/// A stage that fails to load or parse is logged and skipped; the rest go on.
pub fn fetch(
    o: &FetchOptions,
    source: &mut dyn PageSource,
    mut progress: Option<&mut dyn Progress>,
    out: &mut dyn Write,
) -> Result<RunSummary> {
    let roster = load_roster(o.roster.as_deref())?;
    let table = CorrectionTable::builtin();

    let mut st = ScriptStats::default();
    let mut rows = Vec::new();

    if let Some(p) = progress.as_deref_mut() {
        p.begin(o.stages.len());
    }

    for (i, &stage) in o.stages.iter().enumerate() {
        if i > 0 && o.pause_ms > 0 {
            thread::sleep(Duration::from_millis(o.pause_ms));
        }
        let url = o.stage_url(stage);
        if let Some(p) = progress.as_deref_mut() {
            p.log(&format!("Stage {stage}: {url}"));
        }

        let page = match specs::results::fetch(source, &url) {
            Ok(page) if !page.rows.is_empty() => page,
            Ok(_) => {
                logw!("stage {}: results table has no rider rows", stage);
                st.failed_stages.push((stage, s!("results table has no rider rows")));
                if let Some(p) = progress.as_deref_mut() {
                    p.item_done(stage, 0);
                }
                continue;
            }
            Err(e) => {
                loge!("stage {}: {}", stage, e);
                st.failed_stages.push((stage, e.to_string()));
                if let Some(p) = progress.as_deref_mut() {
                    p.item_done(stage, 0);
                }
                continue;
            }
        };
        st.skipped += page.skipped;
        st.sources.push(url);

        let times = specs::results::absolute_times(&page.rows);
        let records: Vec<ExternalRecord> = page
            .rows
            .iter()
            .map(|r| ExternalRecord::new(r.position, &r.first_name, &r.last_name).with_team(r.team.as_deref().unwrap_or("")))
            .collect();

        let mut taken = 0usize;
        for ((r, secs), scraped) in resolve_records(&records, roster.as_ref(), table).into_iter().zip(times).zip(&page.rows) {
            if r.corrected {
                st.names_corrected += 1;
            }
            let Some(rider) = checked_rider(&mut st, stage, scraped.display_name.clone(), &r) else {
                continue;
            };
            let status = scraped.status.map(|s| s.code());
            if status.is_none() && secs.is_some() {
                st.finishers += 1;
            }
            let row = StageResultRow::new(stage, rider, r.record.position).timed(secs, None);
            rows.push(match note_for(&r, status) {
                Some(n) => row.with_note(n),
                None => row,
            });
            taken += 1;
        }
        logf!("stage {}: {} results", stage, taken);
        if let Some(p) = progress.as_deref_mut() {
            p.item_done(stage, taken);
        }
    }
    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }

    // Sources are listed in the report, not in the script header.
    let header = [
        format!("SQL Script to import stage_results from {}", o.base_url.trim_end_matches('/')),
        format!("Stages requested: {}", o.stages.iter().map(u32::to_string).collect::<Vec<_>>().join(",")),
    ];
    write_stage_script(&header, rows, false, &out_path(&o.out, DEFAULT_FETCH_SQL), st, out)
}

/* ---------------- csv-sql ---------------- */

fn csv_sql(o: &CsvSqlOptions, out: &mut dyn Write) -> Result<RunSummary> {
    let (rows_in, skipped) = input::load_multi_stage_csv(&o.input)?;
    if rows_in.is_empty() {
        return Err(Error::NoRecords(o.input.display().to_string()));
    }

    // Times and groups are taken as given.
    let rows: Vec<StageResultRow> = rows_in
        .into_iter()
        .map(|r| {
            StageResultRow::new(r.stage, RiderRef::Name { first: r.first_name, last: r.last_name }, r.position)
                .timed(r.time_seconds, r.same_time_group)
        })
        .collect();

    let header = [
        s!("SQL Script to import stage_results from CSV"),
        format!("Generated from {}", display_name(&o.input)),
    ];
    let rendered = render_script(&header, &rows, &RenderOptions::default());
    let path = write_output(&out_path(&o.out, DEFAULT_CSV_SQL), &rendered.sql)?;

    let st = ScriptStats {
        out_path: path.clone(),
        sources: vec![display_name(&o.input)],
        statements: rendered.statements,
        finishers: rows.iter().filter(|r| r.time_seconds.is_some()).count(),
        time_groups: count_groups(&rows),
        stages: rendered.stages,
        duplicates: rendered.duplicates,
        skipped,
        ..Default::default()
    };
    report::script(out, &st)?;
    Ok(RunSummary::wrote(path))
}

/* ---------------- riders-sql ---------------- */

fn riders_sql(o: &RidersSqlOptions, out: &mut dyn Write) -> Result<RunSummary> {
    let (rows, skipped) = input::load_rider_sheet(&o.input)?;
    let sql = render_riders_script(&display_name(&o.input), &rows);
    let path = write_output(&out_path(&o.out, DEFAULT_RIDERS_SQL), &sql)?;
    report::riders(out, &path, rows.len(), skipped)?;
    Ok(RunSummary::wrote(path))
}

/* ---------------- photos ---------------- */

/// Look up, download and shrink a photo for every roster rider without one.
/// A rider whose lookup, download or decode fails is logged and skipped.
pub fn photos(
    o: &PhotosOptions,
    source: &mut dyn PageSource,
    mut progress: Option<&mut dyn Progress>,
    out: &mut dyn Write,
) -> Result<RunSummary> {
    let candidates = input::load_photo_candidates(&o.roster)?;
    let riders = match o.limit {
        Some(n) => &candidates.riders[..n.min(candidates.riders.len())],
        None => &candidates.riders[..],
    };
    logf!("{} riders without a photo", riders.len());

    let mut st = PhotoStats {
        total: riders.len(),
        with_photo: candidates.with_photo,
        skipped: candidates.skipped,
        ..Default::default()
    };
    let mut updates = Vec::new();

    if let Some(p) = progress.as_deref_mut() {
        p.begin(riders.len());
    }
    for (i, rider) in riders.iter().enumerate() {
        if i > 0 && o.pause_ms > 0 {
            thread::sleep(Duration::from_millis(o.pause_ms));
        }
        let name = rider.full_name();
        if let Some(p) = progress.as_deref_mut() {
            p.log(&format!("{name} (id {})", rider.id));
        }

        let failure = match photo_for(o, source, rider) {
            Ok(Some(data_url)) => {
                updates.push(PhotoUpdate { id: rider.id, name: name.clone(), data_url });
                None
            }
            Ok(None) => Some(s!("no image found")),
            Err(e) => Some(e.to_string()),
        };
        let done = match failure {
            Some(reason) => {
                logw!("{} (id {}): {}", name, rider.id, reason);
                st.failed.push((rider.id, name, reason));
                0
            }
            None => 1,
        };
        if let Some(p) = progress.as_deref_mut() {
            p.item_done(rider.id, done);
        }
    }
    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }

    let sql = render_photos_script(&display_name(&o.roster), &updates);
    let path = write_output(&out_path(&o.out, DEFAULT_PHOTOS_SQL), &sql)?;
    st.out_path = path.clone();
    st.updated = updates.len();
    report::photos(out, &st)?;
    Ok(RunSummary::wrote(path))
}

/// Data URL for one rider; `None` when no page has an image. The lookup tries the
/// full name first, then the last name alone.
fn photo_for(o: &PhotosOptions, source: &mut dyn PageSource, rider: &RosterEntry) -> Result<Option<String>> {
    let full = rider.full_name();
    let Some(image_url) = specs::wiki::find_image(source, &o.summary_url, &[full.as_str(), rider.last_name.as_str()]) else {
        return Ok(None);
    };
    logd!("{}: {}", full, image_url);

    let bytes = source.get_bytes(&image_url)?;
    let data_url = to_data_url(&bytes, o.size, PHOTO_JPEG_QUALITY)
        .map_err(|e| Error::Image { url: image_url, reason: e.to_string() })?;
    Ok(Some(data_url))
}

/* ---------------- validate ---------------- */

fn validate(o: &ValidateOptions, out: &mut dyn Write) -> Result<RunSummary> {
    let content = fs::read_to_string(&o.input).map_err(|source| Error::Read { path: o.input.clone(), source })?;
    let v = validate_sql(&content);
    report::validation(out, &o.input, &v)?;
    Ok(RunSummary { files_written: Vec::new(), passed: v.is_valid() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_row(stage: u32, id: u32, pos: u32, t: Option<u32>) -> StageResultRow {
        StageResultRow::new(stage, RiderRef::Id(id), pos).timed(t, None)
    }

    #[test]
    fn finalize_groups_after_dedup() {
        let rows = vec![
            id_row(1, 1, 1, Some(100)),
            id_row(1, 2, 2, Some(100)),
            id_row(1, 2, 5, Some(90)),
            id_row(1, 3, 3, Some(105)),
            id_row(1, 4, 4, None),
        ];
        let (rows, dups) = finalize(rows);
        assert_eq!(dups.len(), 1);
        let groups: Vec<Option<u32>> = rows.iter().map(|r| r.same_time_group).collect();
        // the dropped 90s row leaves no hole in the numbering
        assert_eq!(groups, vec![Some(1), Some(1), Some(2), None]);
        assert_eq!(count_groups(&rows), 2);
    }

    #[test]
    fn without_roster_claimed_ids_are_trusted() {
        let records = vec![
            ExternalRecord::new(1, "Jasper", "Philipsen").with_id(12),
            ExternalRecord::new(2, "Rem++", "Evenepoel"),
        ];
        let resolved = resolve_records(&records, None, CorrectionTable::builtin());
        assert_eq!(resolved[0].rider, Some(RiderRef::Id(12)));
        assert_eq!(
            resolved[1].rider,
            Some(RiderRef::Name { first: s!("Remco"), last: s!("Evenepoel") })
        );
        assert!(resolved[1].corrected);
        assert_eq!(
            note_for(&resolved[1], Some("DNF")).as_deref(),
            Some("DNF; Remco Evenepoel (corrected from Rem++ Evenepoel)")
        );
    }

    #[test]
    fn with_roster_unknown_riders_are_unresolved() {
        let roster = RosterIndex::from_entries(vec![RosterEntry {
            id: 7,
            first_name: s!("Jasper"),
            last_name: s!("Philipsen"),
        }]);
        let records = vec![ExternalRecord::new(1, "Jasper", "Philipsen"), ExternalRecord::new(2, "No", "Body")];
        let resolved = resolve_records(&records, Some(&roster), CorrectionTable::builtin());
        assert_eq!(resolved[0].rider, Some(RiderRef::Id(7)));
        assert_eq!(resolved[1].rider, None);
    }

    fn entry(id: u32, first: &str, last: &str) -> RosterEntry {
        RosterEntry { id, first_name: s!(first), last_name: s!(last) }
    }

    #[test]
    fn review_buckets_are_kept_apart() {
        let roster = RosterIndex::from_entries(vec![
            entry(3, "Tadej", "Pogacar"),
            entry(4, "Tim", "Merlier"),
            entry(5, "Tim", "Merlier"),
        ]);
        let records = vec![
            ExternalRecord::new(1, "Tim", "Merlier"),
            ExternalRecord::new(2, "Tadej", "Pogacar").with_id(4),
            ExternalRecord::new(3, "Tadej", "Pogacar").with_id(99),
            ExternalRecord::new(4, "No", "Body"),
        ];
        let mut st = ScriptStats::default();
        let riders: Vec<Option<RiderRef>> = resolve_records(&records, Some(&roster), CorrectionTable::builtin())
            .iter()
            .map(|r| checked_rider(&mut st, 1, r.record.full_name(), r))
            .collect();

        assert_eq!(riders, vec![Some(RiderRef::Id(4)), None, None, None]);
        assert_eq!(st.ambiguous.len(), 1);
        assert_eq!((st.ambiguous[0].chosen, st.ambiguous[0].candidates.clone()), (4, vec![4, 5]));
        assert_eq!(st.id_conflicts.len(), 2);
        assert_eq!(st.id_conflicts[0].roster_name.as_deref(), Some("Tim Merlier"));
        assert_eq!(st.id_conflicts[0].candidates, vec![3]);
        assert_eq!((st.id_conflicts[1].claimed_id, st.id_conflicts[1].roster_name.clone()), (99, None));
        assert_eq!(st.unresolved, vec![(1, 4, s!("No Body"))]);
    }
}
