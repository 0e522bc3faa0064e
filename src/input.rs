// src/input.rs
//! Input loaders: stage result CSVs, free-text result sheets, the full riders sheet,
//! and roster rows still missing a photo.
//! Loaders only shape rows into records; they never match or correct names.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::csv::{self, non_empty};
use crate::error::{Error, Result};
use crate::model::{ExternalRecord, RosterEntry};
use crate::timing::{parse_time, ParsedTime};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    FreeText,
}

/// Records read from one source, with the number of lines that were dropped.
#[derive(Clone, Debug)]
pub struct Loaded {
    pub records: Vec<ExternalRecord>,
    pub skipped: usize,
    pub source: PathBuf,
    pub format: InputFormat,
}

/* ---------------- Stage result CSV ---------------- */

#[derive(Deserialize)]
struct StageCsvRow {
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    rider_id: Option<String>,
    #[serde(default)]
    team_name: Option<String>,
    #[serde(default)]
    time_seconds: Option<String>,
}

/// `position,first_name,last_name[,rider_id][,team_name][,time_seconds]`
///
/// Rows without a positive position are skipped. A non-numeric `rider_id` counts as
/// no claimed id.
pub fn read_stage_csv<R: io::Read>(rdr: R, source_name: &str) -> Result<(Vec<ExternalRecord>, usize)> {
    let parsed = csv::read_from::<_, StageCsvRow>(rdr, source_name)?;
    let mut skipped = parsed.skipped;
    let mut records = Vec::with_capacity(parsed.rows.len());

    for row in parsed.rows {
        let position = non_empty(row.position).and_then(|p| p.parse::<u32>().ok()).filter(|p| *p > 0);
        let Some(position) = position else {
            skipped += 1;
            continue;
        };
        let mut rec = ExternalRecord::new(
            position,
            row.first_name.as_deref().unwrap_or(""),
            row.last_name.as_deref().unwrap_or(""),
        );
        if let Some(raw) = non_empty(row.rider_id) {
            match raw.parse::<u32>() {
                Ok(id) => rec.claimed_id = Some(id),
                Err(_) => logw!("{}: pos {}: ignoring invalid rider_id {:?}", source_name, position, raw),
            }
        }
        rec = rec
            .with_team(row.team_name.as_deref().unwrap_or(""))
            .with_time(row.time_seconds.as_deref().unwrap_or(""));
        records.push(rec);
    }
    Ok((records, skipped))
}

pub fn load_stage_csv(path: &Path) -> Result<Loaded> {
    let file = fs::File::open(path).map_err(|source| Error::Read { path: path.to_path_buf(), source })?;
    let (records, skipped) = read_stage_csv(file, &path.display().to_string())?;
    logf!("{} riders read from {}", records.len(), path.display());
    Ok(Loaded { records, skipped, source: path.to_path_buf(), format: InputFormat::Csv })
}

/// Read `preferred` when it exists, else `fallback`.
pub fn load_stage_csv_preferring(preferred: &Path, fallback: Option<&Path>) -> Result<Loaded> {
    match fallback {
        Some(fb) if !preferred.exists() => {
            logf!("{} not found, using {}", preferred.display(), fb.display());
            load_stage_csv(fb)
        }
        _ => load_stage_csv(preferred),
    }
}

/* ---------------- Free-text result sheets ---------------- */

/// One line-format attempt. `None` means "not this format"; the next one is tried.
pub type LineParser = fn(&str) -> Option<ExternalRecord>;

/// Tried in order for every line; first success wins.
pub const LINE_PARSERS: &[(&str, LineParser)] = &[
    ("comma", parse_comma_line),
    ("numbered", parse_numbered_line),
    ("tab", parse_tab_line),
];

/// `1,Jasper,Philipsen[,3:53:11]`
pub fn parse_comma_line(line: &str) -> Option<ExternalRecord> {
    parse_delimited(line, ',')
}

/// `1\tJasper\tPhilipsen[\t3:53:11]`
pub fn parse_tab_line(line: &str) -> Option<ExternalRecord> {
    parse_delimited(line, '\t')
}

fn parse_delimited(line: &str, sep: char) -> Option<ExternalRecord> {
    if !line.contains(sep) {
        return None;
    }
    let parts: Vec<&str> = line.split(sep).map(str::trim).collect();
    if parts.len() < 3 {
        return None;
    }
    let position: u32 = parts[0].parse().ok()?;
    let rec = ExternalRecord::new(position, parts[1], parts[2]).with_time(parts.get(3).copied().unwrap_or(""));
    Some(rec)
}

static NUMBERED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+)[.)]? +(.+?) +(\+?(?:\d+[:h] ?)?\d+[:m] ?\d+s?|DNF\*?|DNS\*?|DSQ|OTL)(?: |$)")
        .expect("static regex")
});

/// `1. Jasper Philipsen 3:53:11`, `12) Tim Merlier +0:05`, `3 Mathieu van der Poel DNF`.
/// Space separated only, so tab sheets fall through to the tab parser.
pub fn parse_numbered_line(line: &str) -> Option<ExternalRecord> {
    if line.contains('\t') {
        return None;
    }
    if let Some(c) = NUMBERED_LINE.captures(line) {
        let position: u32 = c.get(1)?.as_str().parse().ok()?;
        let (first, last) = split_name_words(c.get(2)?.as_str());
        return Some(ExternalRecord::new(position, &first, &last).with_time(c.get(3)?.as_str()));
    }

    // "<pos> <name words…> [time]" without a recognisable time pattern
    let parts: Vec<&str> = line.split(' ').filter(|p| !p.is_empty()).collect();
    if parts.len() < 2 {
        return None;
    }
    let position: u32 = parts[0].trim_end_matches(['.', ')']).parse().ok()?;
    let last_tok = parts[parts.len() - 1];
    let (name_parts, time) = match parse_time(last_tok) {
        ParsedTime::Seconds(_) if parts.len() > 2 => (&parts[1..parts.len() - 1], last_tok),
        ParsedTime::NoTime(status) if status != crate::timing::TimeStatus::Unknown && parts.len() > 2 => {
            (&parts[1..parts.len() - 1], last_tok)
        }
        _ => (&parts[1..], ""),
    };
    let (first, last) = split_name_words(&name_parts.join(" "));
    Some(ExternalRecord::new(position, &first, &last).with_time(time))
}

/// First word is the first name, the rest the last name.
fn split_name_words(name: &str) -> (String, String) {
    let mut words = name.split_whitespace();
    let first = words.next().unwrap_or("").to_string();
    let last = words.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// Parse a whole free-text sheet. Blank lines and `#` comments are ignored; lines no
/// parser accepts are counted as skipped.
pub fn parse_free_text(text: &str) -> (Vec<ExternalRecord>, usize) {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (n, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let hit = LINE_PARSERS.iter().find_map(|(name, parse)| parse(line).map(|r| (*name, r)));
        match hit {
            Some((name, rec)) => {
                logd!("line {}: {} format", n + 1, name);
                records.push(rec);
            }
            None => {
                logd!("line {}: no format matched: {:?}", n + 1, line);
                skipped += 1;
            }
        }
    }
    (records, skipped)
}

/// Read the free-text sheet at `input`; when it is missing or empty, read the
/// stage CSV at `fallback` instead. Zero usable records is an error.
pub fn load_free_text_or_csv(input: &Path, fallback: Option<&Path>) -> Result<Loaded> {
    let text = match fs::read_to_string(input) {
        Ok(t) if !t.trim().is_empty() => Some(t),
        Ok(_) => {
            logw!("{} is empty", input.display());
            None
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            logw!("{} not found", input.display());
            None
        }
        Err(source) => return Err(Error::Read { path: input.to_path_buf(), source }),
    };

    let loaded = match (text, fallback) {
        (Some(t), _) => {
            let (records, skipped) = parse_free_text(&t);
            logf!("{} riders parsed from {}", records.len(), input.display());
            Loaded { records, skipped, source: input.to_path_buf(), format: InputFormat::FreeText }
        }
        (None, Some(fb)) => {
            logf!("falling back to {}", fb.display());
            load_stage_csv(fb)?
        }
        (None, None) => {
            return Err(Error::Read {
                path: input.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "missing or empty, and no fallback given"),
            });
        }
    };

    if loaded.records.is_empty() {
        return Err(Error::NoRecords(loaded.source.display().to_string()));
    }
    Ok(loaded)
}

/* ---------------- Multi-stage results CSV ---------------- */

/// `stage_number,first_name,last_name,position,time_seconds,same_time_group`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiStageRow {
    pub stage: u32,
    pub first_name: String,
    pub last_name: String,
    pub position: u32,
    pub time_seconds: Option<u32>,
    pub same_time_group: Option<u32>,
}

#[derive(Deserialize)]
struct MultiStageCsvRow {
    #[serde(default)]
    stage_number: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    time_seconds: Option<String>,
    #[serde(default)]
    same_time_group: Option<String>,
}

pub fn load_multi_stage_csv(path: &Path) -> Result<(Vec<MultiStageRow>, usize)> {
    let parsed = csv::read_path::<MultiStageCsvRow>(path)?;
    let mut skipped = parsed.skipped;
    let mut rows = Vec::with_capacity(parsed.rows.len());

    for r in parsed.rows {
        let stage = non_empty(r.stage_number).and_then(|v| v.parse::<u32>().ok());
        let position = non_empty(r.position).and_then(|v| v.parse::<u32>().ok());
        let (Some(stage), Some(position)) = (stage, position) else {
            skipped += 1;
            continue;
        };
        rows.push(MultiStageRow {
            stage,
            first_name: r.first_name.unwrap_or_default().trim().to_string(),
            last_name: r.last_name.unwrap_or_default().trim().to_string(),
            position,
            time_seconds: non_empty(r.time_seconds).and_then(|v| parse_time(&v).seconds()),
            same_time_group: non_empty(r.same_time_group).and_then(|v| v.parse().ok()),
        });
    }
    Ok((rows, skipped))
}

/* ---------------- Full riders sheet ---------------- */

/// One row of the complete riders sheet used to seed the `riders` table.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RiderSheetRow {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub weight_kg: Option<String>,
    #[serde(default)]
    pub height_m: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Rows without a last name are skipped (the column is NOT NULL).
pub fn load_rider_sheet(path: &Path) -> Result<(Vec<RiderSheetRow>, usize)> {
    let parsed = csv::read_path::<RiderSheetRow>(path)?;
    let mut skipped = parsed.skipped;
    let rows: Vec<RiderSheetRow> = parsed
        .rows
        .into_iter()
        .filter(|r| {
            let keep = !r.last_name.trim().is_empty();
            if !keep { skipped += 1; }
            keep
        })
        .collect();
    Ok((rows, skipped))
}

/* ---------------- Roster rows without a photo ---------------- */

#[derive(Deserialize)]
struct PhotoRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    photo_url: Option<String>,
}

#[derive(Debug, Default)]
pub struct PhotoCandidates {
    /// Riders with an empty `photo_url`, by last name then first name
    pub riders: Vec<RosterEntry>,
    pub with_photo: usize,
    pub skipped: usize,
}

/// Roster riders that still need a photo. Rows without a numeric id are skipped.
pub fn load_photo_candidates(path: &Path) -> Result<PhotoCandidates> {
    let parsed = csv::read_path::<PhotoRow>(path)?;
    let mut out = PhotoCandidates { skipped: parsed.skipped, ..Default::default() };

    for row in parsed.rows {
        if non_empty(row.photo_url).is_some() {
            out.with_photo += 1;
            continue;
        }
        let Some(id) = non_empty(row.id).and_then(|v| v.parse::<u32>().ok()) else {
            out.skipped += 1;
            continue;
        };
        out.riders.push(RosterEntry { id, first_name: s!(row.first_name.trim()), last_name: s!(row.last_name.trim()) });
    }
    out.riders.sort_by(|a, b| (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name)));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_csv_skips_bad_positions_and_ids() {
        let text = "position,first_name,last_name,rider_id,team_name,time_seconds\n\
                    1,Jasper,Philipsen,12,Alpecin,13991\n\
                    x,Bad,Position,,,\n\
                    0,Zero,Position,,,\n\
                    2,Biniam,Girmay,abc,,3:53:11\n";
        let (recs, skipped) = read_stage_csv(text.as_bytes(), "mem").unwrap();
        assert_eq!(skipped, 2);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].claimed_id, Some(12));
        assert_eq!(recs[0].team.as_deref(), Some("Alpecin"));
        assert_eq!(recs[1].claimed_id, None);
        assert_eq!(recs[1].time.as_deref(), Some("3:53:11"));
    }

    #[test]
    fn comma_line() {
        let r = parse_comma_line("1, Jasper , Philipsen, 3:53:11").unwrap();
        assert_eq!((r.position, r.first_name.as_str(), r.last_name.as_str()), (1, "Jasper", "Philipsen"));
        assert_eq!(r.time.as_deref(), Some("3:53:11"));
        assert!(parse_comma_line("Philipsen, Jasper, 3:53:11").is_none());
        assert!(parse_comma_line("1 Jasper Philipsen").is_none());
    }

    #[test]
    fn numbered_line_variants() {
        let r = parse_numbered_line("1. Jasper Philipsen 3:53:11").unwrap();
        assert_eq!((r.position, r.last_name.as_str()), (1, "Philipsen"));
        assert_eq!(r.time.as_deref(), Some("3:53:11"));

        let r = parse_numbered_line("3) Mathieu van der Poel DNF").unwrap();
        assert_eq!(r.last_name, "van der Poel");
        assert_eq!(r.time.as_deref(), Some("DNF"));

        let r = parse_numbered_line("12 Tim Merlier +0:05").unwrap();
        assert_eq!(r.time.as_deref(), Some("+0:05"));

        let r = parse_numbered_line("7. Remco Evenepoel").unwrap();
        assert_eq!(r.last_name, "Evenepoel");
        assert_eq!(r.time, None);

        assert!(parse_numbered_line("Jasper Philipsen 3:53:11").is_none());
        assert!(parse_numbered_line("1\tJasper\tPhilipsen\t3:53:11").is_none());
    }

    #[test]
    fn tab_line() {
        let r = parse_tab_line("4\tAnders Halland\tJohannessen\t13991").unwrap();
        assert_eq!(r.first_name, "Anders Halland");
        assert_eq!(r.last_name, "Johannessen");
    }

    #[test]
    fn free_text_tries_formats_in_order() {
        let text = "# stage 1\n\
                    1,Jasper,Philipsen,3:53:11\n\
                    2. Biniam Girmay 3:53:11\n\
                    3\tAnders Halland\tJohannessen\t3:53:15\n\
                    \n\
                    nonsense line\n";
        let (recs, skipped) = parse_free_text(text);
        assert_eq!(recs.len(), 3);
        assert_eq!(skipped, 1);
        assert_eq!(recs[1].last_name, "Girmay");
        assert_eq!(recs[2].first_name, "Anders Halland");
    }

    #[test]
    fn free_text_falls_back_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("uitslag.txt");
        let csv_path = dir.path().join("fallback.csv");
        fs::write(&txt, "   \n").unwrap();
        fs::write(&csv_path, "position,first_name,last_name,time_seconds\n1,Jasper,Philipsen,13991\n").unwrap();

        let loaded = load_free_text_or_csv(&txt, Some(&csv_path)).unwrap();
        assert_eq!(loaded.format, InputFormat::Csv);
        assert_eq!(loaded.records.len(), 1);

        let missing = dir.path().join("nope.txt");
        let loaded = load_free_text_or_csv(&missing, Some(&csv_path)).unwrap();
        assert_eq!(loaded.source, csv_path);

        assert!(matches!(load_free_text_or_csv(&missing, None), Err(Error::Read { .. })));
    }

    #[test]
    fn free_text_without_riders_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("uitslag.txt");
        fs::write(&txt, "nothing useful here\n").unwrap();
        assert!(matches!(load_free_text_or_csv(&txt, None), Err(Error::NoRecords(_))));
    }

    #[test]
    fn multi_stage_rows() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("multi.csv");
        fs::write(
            &p,
            "stage_number,first_name,last_name,position,time_seconds,same_time_group\n\
             1,Jasper,Philipsen,1,12345,1\n\
             1,Tim,Merlier,3,,\n\
             x,Bad,Row,1,,\n",
        )
        .unwrap();
        let (rows, skipped) = load_multi_stage_csv(&p).unwrap();
        assert_eq!(skipped, 1);
        assert_eq!(rows[0].time_seconds, Some(12345));
        assert_eq!(rows[1].same_time_group, None);
    }

    #[test]
    fn photo_candidates_skip_riders_with_a_photo() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("riders.csv");
        fs::write(
            &p,
            "id,first_name,last_name,photo_url\n\
             3,Tadej,Pogacar,\n\
             1,Jasper,Philipsen,\"data:image/jpeg;base64,AAAA\"\n\
             x,No,Id,\n\
             2,Remco,Evenepoel,\n",
        )
        .unwrap();
        let c = load_photo_candidates(&p).unwrap();
        let ids: Vec<u32> = c.riders.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!((c.with_photo, c.skipped), (1, 1));
    }
}
