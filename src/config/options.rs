// src/config/options.rs
use std::path::PathBuf;
use std::str::FromStr;

use super::consts::*;

/// What to do with riders that have no finishing time (DNF, DNS, …).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DnfPolicy {
    /// Finishers only
    #[default]
    Skip,
    /// Include with NULL time (keeps them in statistics)
    NullTime,
    /// Include with positions 999, 1000, …
    Placeholder,
}

impl FromStr for DnfPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" | "1" => Ok(DnfPolicy::Skip),
            "null" | "2" => Ok(DnfPolicy::NullTime),
            "placeholder" | "3" => Ok(DnfPolicy::Placeholder),
            other => Err(format!("unknown DNF policy: {other} (skip | null | placeholder)")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompareOptions {
    pub roster: PathBuf,
    pub results: PathBuf,
    /// Run the known-typo corrector before matching
    pub correct: bool,
    pub extra_corrections: Option<PathBuf>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            roster: PathBuf::from(DEFAULT_ROSTER),
            results: PathBuf::from(DEFAULT_STAGE_CSV),
            correct: false,
            extra_corrections: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixOptions {
    pub roster: PathBuf,
    pub results: PathBuf,
    pub out: PathBuf,
    pub extra_corrections: Option<PathBuf>,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            roster: PathBuf::from(DEFAULT_ROSTER),
            results: PathBuf::from(DEFAULT_STAGE_CSV),
            out: PathBuf::from(DEFAULT_FIXED_CSV),
            extra_corrections: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Preferred input (usually the output of `fix`)
    pub input: PathBuf,
    /// Read when `input` does not exist
    pub fallback: Option<PathBuf>,
    /// When set, riders are reconciled in-process instead of trusting claimed ids
    pub roster: Option<PathBuf>,
    pub extra_corrections: Option<PathBuf>,
    pub stage: u32,
    pub out: PathBuf,
    /// Prefix a DELETE of the stage's existing results
    pub replace: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_FIXED_CSV),
            fallback: Some(PathBuf::from(DEFAULT_STAGE_CSV)),
            roster: None,
            extra_corrections: None,
            stage: 1,
            out: PathBuf::from(DEFAULT_STAGE_SQL),
            replace: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportOptions {
    /// Free-text results (comma, numbered-line or tab separated)
    pub input: PathBuf,
    /// CSV read when `input` is missing or empty
    pub fallback: Option<PathBuf>,
    pub roster: Option<PathBuf>,
    pub extra_corrections: Option<PathBuf>,
    pub stage: u32,
    pub out: PathBuf,
    pub dnf: DnfPolicy,
    pub replace: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_FREE_TEXT),
            fallback: Some(PathBuf::from(DEFAULT_STAGE_CSV)),
            roster: None,
            extra_corrections: None,
            stage: 1,
            out: PathBuf::from(DEFAULT_IMPORT_SQL),
            dnf: DnfPolicy::Skip,
            replace: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchOptions {
    pub base_url: String,
    pub stages: Vec<u32>,
    pub itt_stages: Vec<u32>,
    pub roster: Option<PathBuf>,
    pub out: PathBuf,
    pub pause_ms: u64,
    pub timeout_secs: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            base_url: s!(RESULTS_BASE_URL),
            stages: (1..=STAGE_COUNT).collect(),
            itt_stages: ITT_STAGES.to_vec(),
            roster: None,
            out: PathBuf::from(DEFAULT_FETCH_SQL),
            pause_ms: REQUEST_PAUSE_MS,
            timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

impl FetchOptions {
    /// Results page for one stage; time trials live under `stage-N-itt`.
    pub fn stage_url(&self, stage: u32) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.itt_stages.contains(&stage) {
            format!("{base}/stage-{stage}-itt/result")
        } else {
            format!("{base}/stage-{stage}/result")
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvSqlOptions {
    pub input: PathBuf,
    pub out: PathBuf,
}

impl Default for CsvSqlOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_STAGE_CSV),
            out: PathBuf::from(DEFAULT_CSV_SQL),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RidersSqlOptions {
    pub input: PathBuf,
    pub out: PathBuf,
}

impl Default for RidersSqlOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_RIDERS_FULL),
            out: PathBuf::from(DEFAULT_RIDERS_SQL),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhotosOptions {
    /// Roster CSV with `id,first_name,last_name[,photo_url]`; riders with a photo are left alone
    pub roster: PathBuf,
    pub out: PathBuf,
    pub summary_url: String,
    /// Width and height of the stored image, in pixels
    pub size: u32,
    /// Stop after this many riders
    pub limit: Option<usize>,
    pub pause_ms: u64,
    pub timeout_secs: u64,
}

impl Default for PhotosOptions {
    fn default() -> Self {
        Self {
            roster: PathBuf::from(DEFAULT_ROSTER),
            out: PathBuf::from(DEFAULT_PHOTOS_SQL),
            summary_url: s!(WIKI_SUMMARY_URL),
            size: PHOTO_SIZE,
            limit: None,
            pause_ms: PHOTO_PAUSE_MS,
            timeout_secs: PHOTO_TIMEOUT_SECS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidateOptions {
    pub input: PathBuf,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self { input: PathBuf::from(DEFAULT_STAGE_SQL) }
    }
}

/// One batch job with its options. Each run executes exactly one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Job {
    Compare(CompareOptions),
    Fix(FixOptions),
    Generate(GenerateOptions),
    Import(ImportOptions),
    Fetch(FetchOptions),
    CsvSql(CsvSqlOptions),
    RidersSql(RidersSqlOptions),
    Photos(PhotosOptions),
    Validate(ValidateOptions),
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Job::Compare(_) => "compare",
            Job::Fix(_) => "fix",
            Job::Generate(_) => "generate",
            Job::Import(_) => "import",
            Job::Fetch(_) => "fetch",
            Job::CsvSql(_) => "csv-sql",
            Job::RidersSql(_) => "riders-sql",
            Job::Photos(_) => "photos",
            Job::Validate(_) => "validate",
        }
    }
}

/// Parse "1-5,8,10-12" into a sorted, deduplicated stage list.
pub fn parse_stage_list(s: &str) -> Result<Vec<u32>, String> {
    let mut out = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() { continue; }
        if let Some(dash) = part.find('-') {
            let a: u32 = part[..dash].trim().parse().map_err(|_| format!("bad stage: {part}"))?;
            let b: u32 = part[dash + 1..].trim().parse().map_err(|_| format!("bad stage: {part}"))?;
            if a > b { return Err(format!("invalid range: {part}")); }
            out.extend(a..=b);
        } else {
            out.push(part.parse().map_err(|_| format!("bad stage: {part}"))?);
        }
    }
    out.sort_unstable();
    out.dedup();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_url_uses_itt_suffix() {
        let opts = FetchOptions::default();
        assert!(opts.stage_url(1).ends_with("/stage-1/result"));
        assert!(opts.stage_url(5).ends_with("/stage-5-itt/result"));
    }

    #[test]
    fn stage_list_ranges_and_dedup() {
        assert_eq!(parse_stage_list("3,1-3, 7").unwrap(), vec![1, 2, 3, 7]);
        assert!(parse_stage_list("5-2").is_err());
        assert!(parse_stage_list("x").is_err());
    }

    #[test]
    fn dnf_policy_accepts_menu_numbers() {
        assert_eq!("2".parse::<DnfPolicy>().unwrap(), DnfPolicy::NullTime);
        assert_eq!("Placeholder".parse::<DnfPolicy>().unwrap(), DnfPolicy::Placeholder);
        assert!("maybe".parse::<DnfPolicy>().is_err());
    }
}
