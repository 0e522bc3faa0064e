// src/specs/results.rs
//! Stage result page: `/race/<race>/<year>/stage-N[-itt]/result`.
//!
//! Columns taken from each row: position, rider display name (split into first/last),
//! team, time text. Times on the page are the winner's absolute time followed by gaps
//! (`+0:05`, `,,` or empty for "same time"); `absolute_times` turns them into seconds.

use crate::core::html::{self, first_href, opener_lc, row_cells, strip_tags, tag_blocks_ci};
use crate::core::net::PageSource;
use crate::error::{Error, Result};
use crate::names::split_display_name;
use crate::timing::{parse_time, ParsedTime, TimeStatus};

/// One rider row as printed on the page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScrapedRow {
    pub position: u32,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub team: Option<String>,
    /// Raw time cell text; `None` when the row has no time cell.
    pub time_text: Option<String>,
    /// Set when the row is marked DNF/DNS/DSQ/OTL.
    pub status: Option<TimeStatus>,
}

#[derive(Clone, Debug, Default)]
pub struct StagePage {
    pub rows: Vec<ScrapedRow>,
    /// Rows dropped for having fewer than two cells or no rider name.
    pub skipped: usize,
}

/// Fetch and parse one stage page.
pub fn fetch(source: &mut dyn PageSource, url: &str) -> Result<StagePage> {
    let doc = source.get(url)?;
    parse_doc(&doc).ok_or_else(|| Error::NoResultsTable(s!(url)))
}

/// Parse a results page. `None` when the page has no table at all.
pub fn parse_doc(doc: &str) -> Option<StagePage> {
    let tables = tag_blocks_ci(doc, "<table", "</table>");
    // Prefer the table marked as results; otherwise the first table on the page.
    let table = tables
        .iter()
        .copied()
        .find(|t| {
            let op = opener_lc(t);
            op.contains("results") && (op.contains("class=") || op.contains("id="))
        })
        .or_else(|| tables.first().copied())?;

    let mut page = StagePage::default();
    let body_rows = tag_blocks_ci(table, "<tr", "</tr>");

    // first row is the header
    for (idx, tr) in body_rows.iter().skip(1).enumerate() {
        match parse_row(tr, idx as u32 + 1) {
            Some(row) => page.rows.push(row),
            None => page.skipped += 1,
        }
    }
    if page.skipped > 0 {
        logd!("results table: {} row(s) skipped", page.skipped);
    }
    Some(page)
}

fn parse_row(tr: &str, index: u32) -> Option<ScrapedRow> {
    let cells = row_cells(tr);
    if cells.len() < 2 {
        return None;
    }
    let texts: Vec<String> = cells.iter().map(|c| strip_tags(c)).collect();

    let display_name = rider_name(&cells, &texts)?;
    let (first_name, last_name) = split_display_name(&display_name);

    let team = cells
        .iter()
        .find(|c| first_href(c).is_some_and(|h| h.contains("team/")))
        .map(|c| strip_tags(c))
        .filter(|t| !t.is_empty());

    let status = texts.iter().find_map(|t| TimeStatus::from_token(t));

    // Position cell: digits, or a status code for non-finishers.
    let position = texts
        .first()
        .and_then(|t| t.parse::<u32>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(index);

    let time_text = time_cell(&cells, &texts);

    Some(ScrapedRow { position, display_name, first_name, last_name, team, time_text, status })
}

/// Rider link text, or the first cell that reads like a name.
fn rider_name(cells: &[&str], texts: &[String]) -> Option<String> {
    for (cell, text) in cells.iter().zip(texts) {
        let Some(href) = first_href(cell) else { continue };
        if href.contains("rider/") || href.contains("cyclist") {
            // anchor text only, ignoring flags and badges around it
            let anchor = html::tag_blocks_ci(cell, "<a", "</a>")
                .into_iter()
                .find(|a| first_href(a).is_some_and(|h| h.contains("rider/") || h.contains("cyclist")))
                .map(strip_tags)
                .unwrap_or_else(|| text.clone());
            if !anchor.is_empty() {
                return Some(anchor);
            }
        }
    }
    texts
        .iter()
        .find(|t| t.chars().count() > 3 && !t.chars().all(|c| c.is_ascii_digit()) && !looks_like_time(t))
        .cloned()
}

/// A cell with class `time`, else the first cell whose text reads as a clock time.
fn time_cell(cells: &[&str], texts: &[String]) -> Option<String> {
    let by_class = cells
        .iter()
        .zip(texts)
        .find(|(c, _)| opener_lc(c).contains("time"))
        .map(|(_, t)| first_time_token(t));
    if let Some(t) = by_class {
        return Some(t);
    }
    texts.iter().find(|t| looks_like_time(t)).map(|t| first_time_token(t))
}

fn looks_like_time(t: &str) -> bool {
    t.contains(':') && (t.starts_with('+') || matches!(parse_time(t), ParsedTime::Seconds(_)))
}

/// Time cells sometimes repeat the value in a hidden span ("0:05 0:05").
fn first_time_token(t: &str) -> String {
    t.split(' ').next().unwrap_or("").to_string()
}

/// Absolute finishing time per row, in seconds.
///
/// The first timed row is the winner's absolute time. Later rows hold a gap
/// (`+0:05`, or a bare clock value smaller than the winner's) that is added to it;
/// a row with an empty or `,,` time finished with the previous rider. Rows with a
/// status get `None`.
pub fn absolute_times(rows: &[ScrapedRow]) -> Vec<Option<u32>> {
    let mut out = Vec::with_capacity(rows.len());
    let mut winner: Option<u32> = None;
    let mut previous: Option<u32> = None;

    for row in rows {
        if row.status.is_some() {
            out.push(None);
            continue;
        }
        let text = row.time_text.as_deref().map(str::trim).unwrap_or("");
        let same_as_previous = text.is_empty() || text.chars().all(|c| c == ',');

        let secs = if same_as_previous {
            previous
        } else {
            match (parse_time(text).seconds(), winner) {
                (None, _) => None,
                (Some(s), None) => {
                    winner = Some(s);
                    Some(s)
                }
                (Some(gap), Some(w)) if text.starts_with('+') || gap < w => w.checked_add(gap),
                (Some(s), Some(_)) => Some(s),
            }
        };

        if secs.is_some() {
            previous = secs;
        }
        out.push(secs);
    }
    out
}
