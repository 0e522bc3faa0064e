// src/timing.rs
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Why a rider has no time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeStatus {
    /// Did not finish
    Dnf,
    /// Did not start
    Dns,
    /// Disqualified
    Dsq,
    /// Outside time limit
    Otl,
    /// Token could not be read as a time
    Unknown,
}

impl TimeStatus {
    pub fn code(self) -> &'static str {
        match self {
            TimeStatus::Dnf => "DNF",
            TimeStatus::Dns => "DNS",
            TimeStatus::Dsq => "DSQ",
            TimeStatus::Otl => "OTL",
            TimeStatus::Unknown => "unknown",
        }
    }

    /// Exact status token, case-insensitive, trailing `*` allowed ("dnf*").
    pub fn from_token(token: &str) -> Option<TimeStatus> {
        let t = token.trim().trim_end_matches('*').trim().to_ascii_uppercase();
        match t.as_str() {
            "DNF" => Some(TimeStatus::Dnf),
            "DNS" => Some(TimeStatus::Dns),
            "DSQ" => Some(TimeStatus::Dsq),
            "OTL" => Some(TimeStatus::Otl),
            _ => None,
        }
    }
}

impl fmt::Display for TimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParsedTime {
    Seconds(u32),
    NoTime(TimeStatus),
}

impl ParsedTime {
    pub fn seconds(self) -> Option<u32> {
        match self {
            ParsedTime::Seconds(s) => Some(s),
            ParsedTime::NoTime(_) => None,
        }
    }
}

static HMS_LETTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d+)h\s*(\d+)m\s*(\d+)s$").expect("static regex"));

/// Parse an elapsed-time token to whole seconds.
///
/// Accepts `H:MM:SS`, `MM:SS`, plain seconds and `XhYmZs`; a leading `+` (gap marker)
/// is dropped. Status tokens give `NoTime(status)`; anything else gives
/// `NoTime(Unknown)`. Never fails hard.
pub fn parse_time(token: &str) -> ParsedTime {
    let t = token.trim();
    if let Some(status) = TimeStatus::from_token(t) {
        return ParsedTime::NoTime(status);
    }
    let t = t.strip_prefix('+').unwrap_or(t).trim();

    parse_seconds(t)
        .map(ParsedTime::Seconds)
        .unwrap_or(ParsedTime::NoTime(TimeStatus::Unknown))
}

fn parse_seconds(t: &str) -> Option<u32> {
    if t.is_empty() {
        return None;
    }
    if t.bytes().all(|b| b.is_ascii_digit()) {
        return t.parse().ok();
    }
    if t.contains(':') {
        let parts: Vec<u32> = t.split(':').map(|p| p.trim().parse::<u32>()).collect::<Result<_, _>>().ok()?;
        return match parts.as_slice() {
            [h, m, s] => hms(*h, *m, *s),
            [m, s] => hms(0, *m, *s),
            _ => None,
        };
    }
    let caps = HMS_LETTERS.captures(t)?;
    let n = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    hms(n(1)?, n(2)?, n(3)?)
}

fn hms(h: u32, m: u32, s: u32) -> Option<u32> {
    let total = h as u64 * 3600 + m as u64 * 60 + s as u64;
    u32::try_from(total).ok()
}

/// Dense rank of each time: equal times share a group, groups count up from 1 in
/// ascending time order, `None` times get no group.
///
/// `[100, 100, 105, None]` → `[1, 1, 2, None]`
pub fn same_time_groups(times: &[Option<u32>]) -> Vec<Option<u32>> {
    let distinct: Vec<u32> = times.iter().flatten().copied().collect::<BTreeSet<_>>().into_iter().collect();
    times
        .iter()
        .map(|t| t.and_then(|v| distinct.binary_search(&v).ok().map(|i| i as u32 + 1)))
        .collect()
}
