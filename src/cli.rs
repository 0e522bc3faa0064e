// src/cli.rs
use std::io;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};

use crate::config::consts::*;
use crate::config::options::*;
use crate::progress::Progress;

#[derive(Parser, Debug)]
#[command(name = "peloton", version)]
#[command(about = "Reconcile cycling riders and stage results, and generate SQL import scripts")]
pub struct Cli {
    /// Debug logging (overridden by PELOTON_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct CorrectionArgs {
    /// Extra correction rules (CSV: kind,first,last,to_first,to_last,id)
    #[arg(long, value_name = "CSV")]
    pub corrections: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare a stage result CSV against the roster and report by outcome
    Compare {
        #[arg(long, default_value = DEFAULT_ROSTER)]
        roster: PathBuf,
        #[arg(long, default_value = DEFAULT_STAGE_CSV)]
        results: PathBuf,
        /// Apply the known-typo corrections before matching
        #[arg(long)]
        correct: bool,
        #[command(flatten)]
        corr: CorrectionArgs,
    },

    /// Write a corrected stage result CSV with roster ids filled in
    Fix {
        #[arg(long, default_value = DEFAULT_ROSTER)]
        roster: PathBuf,
        #[arg(long, default_value = DEFAULT_STAGE_CSV)]
        results: PathBuf,
        #[arg(short, long, default_value = DEFAULT_FIXED_CSV)]
        out: PathBuf,
        #[command(flatten)]
        corr: CorrectionArgs,
    },

    /// Generate the stage result upsert script from a (fixed) stage CSV
    Generate {
        #[arg(long, default_value = DEFAULT_FIXED_CSV)]
        input: PathBuf,
        /// Read when --input does not exist
        #[arg(long, default_value = DEFAULT_STAGE_CSV)]
        fallback: PathBuf,
        /// Resolve riders against this roster instead of trusting the ids in the CSV
        #[arg(long)]
        roster: Option<PathBuf>,
        #[arg(long, default_value_t = 1)]
        stage: u32,
        #[arg(short, long, default_value = DEFAULT_STAGE_SQL)]
        out: PathBuf,
        /// Delete the stage's existing results first
        #[arg(long)]
        replace: bool,
        #[command(flatten)]
        corr: CorrectionArgs,
    },

    /// Generate the stage result upsert script from a free-text results file
    Import {
        #[arg(long, default_value = DEFAULT_FREE_TEXT)]
        input: PathBuf,
        /// CSV read when --input is missing or empty
        #[arg(long, default_value = DEFAULT_STAGE_CSV)]
        fallback: PathBuf,
        #[arg(long)]
        roster: Option<PathBuf>,
        #[arg(long, default_value_t = 1)]
        stage: u32,
        #[arg(short, long, default_value = DEFAULT_IMPORT_SQL)]
        out: PathBuf,
        /// Riders without a time: skip | null | placeholder
        #[arg(long, default_value = "skip")]
        dnf: DnfPolicy,
        #[arg(long)]
        replace: bool,
        #[command(flatten)]
        corr: CorrectionArgs,
    },

    /// Fetch stage result pages and generate one upsert script
    Fetch {
        /// Stage list, e.g. "1-5,8" (default: all stages)
        #[arg(long)]
        stages: Option<String>,
        /// Time-trial stages (pages under stage-N-itt)
        #[arg(long)]
        itt: Option<String>,
        #[arg(long, default_value = RESULTS_BASE_URL)]
        base_url: String,
        /// Resolve riders to roster ids; without it riders are looked up by name in SQL
        #[arg(long)]
        roster: Option<PathBuf>,
        #[arg(short, long, default_value = DEFAULT_FETCH_SQL)]
        out: PathBuf,
        /// Pause between requests
        #[arg(long, default_value_t = REQUEST_PAUSE_MS)]
        pause_ms: u64,
    },

    /// Convert a multi-stage results CSV to upserts
    CsvSql {
        /// stage_number,first_name,last_name,position,time_seconds,same_time_group
        input: PathBuf,
        #[arg(default_value = DEFAULT_CSV_SQL)]
        out: PathBuf,
    },

    /// Generate the rider import script from the full riders CSV
    RidersSql {
        #[arg(long, default_value = DEFAULT_RIDERS_FULL)]
        input: PathBuf,
        #[arg(short, long, default_value = DEFAULT_RIDERS_SQL)]
        out: PathBuf,
    },

    /// Look up rider photos and generate an update script with inline 40x40 JPEGs
    Photos {
        /// Roster with id,first_name,last_name[,photo_url]; riders with a photo are skipped
        #[arg(long, default_value = DEFAULT_ROSTER)]
        roster: PathBuf,
        #[arg(short, long, default_value = DEFAULT_PHOTOS_SQL)]
        out: PathBuf,
        /// Stop after this many riders
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value_t = PHOTO_SIZE)]
        size: u32,
        #[arg(long, default_value_t = PHOTO_PAUSE_MS)]
        pause_ms: u64,
    },

    /// Check that a generated file is plain SQL
    Validate {
        #[arg(default_value = DEFAULT_STAGE_SQL)]
        input: PathBuf,
    },
}

impl Command {
    pub fn into_job(self) -> Result<Job> {
        let job = match self {
            Command::Compare { roster, results, correct, corr } => {
                Job::Compare(CompareOptions { roster, results, correct, extra_corrections: corr.corrections })
            }
            Command::Fix { roster, results, out, corr } => {
                Job::Fix(FixOptions { roster, results, out, extra_corrections: corr.corrections })
            }
            Command::Generate { input, fallback, roster, stage, out, replace, corr } => Job::Generate(GenerateOptions {
                input,
                fallback: Some(fallback),
                roster,
                extra_corrections: corr.corrections,
                stage,
                out,
                replace,
            }),
            Command::Import { input, fallback, roster, stage, out, dnf, replace, corr } => Job::Import(ImportOptions {
                input,
                fallback: Some(fallback),
                roster,
                extra_corrections: corr.corrections,
                stage,
                out,
                dnf,
                replace,
            }),
            Command::Fetch { stages, itt, base_url, roster, out, pause_ms } => {
                let mut o = FetchOptions { base_url, roster, out, pause_ms, ..Default::default() };
                if let Some(s) = stages {
                    o.stages = parse_stage_list(&s).map_err(|e| eyre!("--stages: {e}"))?;
                }
                if let Some(s) = itt {
                    o.itt_stages = parse_stage_list(&s).map_err(|e| eyre!("--itt: {e}"))?;
                }
                Job::Fetch(o)
            }
            Command::CsvSql { input, out } => Job::CsvSql(CsvSqlOptions { input, out }),
            Command::RidersSql { input, out } => Job::RidersSql(RidersSqlOptions { input, out }),
            Command::Photos { roster, out, limit, size, pause_ms } => {
                Job::Photos(PhotosOptions { roster, out, limit, size, pause_ms, ..Default::default() })
            }
            Command::Validate { input } => Job::Validate(ValidateOptions { input }),
        };
        Ok(job)
    }
}

/// Prints one line per stage (or rider) on stderr; stdout carries the report.
pub struct ConsoleProgress {
    total: usize,
    done: usize,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self { total: 0, done: 0 }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for ConsoleProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        eprintln!("Processing {total} item(s)...");
    }

    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }

    fn item_done(&mut self, item: u32, rows: usize) {
        self.done += 1;
        eprintln!("  [{}/{}] {}: {} row(s)", self.done, self.total, item, rows);
    }

    fn finish(&mut self) {
        eprintln!("Done: {}/{}", self.done, self.total);
    }
}

/// Parse arguments, run the job, print its report. `Ok(false)` means the job ran
/// but failed its check (validation).
pub fn run() -> Result<bool> {
    let cli = Cli::parse();
    crate::log::init(cli.verbose);

    let job = cli.command.into_job()?;
    let mut progress = ConsoleProgress::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = crate::runner::run(&job, Some(&mut progress as &mut dyn Progress), &mut out)?;
    for path in &summary.files_written {
        logd!("output: {}", path.display());
    }
    Ok(summary.passed)
}
