// tests/jobs_e2e.rs
use std::fs;
use std::path::{Path, PathBuf};

use peloton_import::config::options::*;
use peloton_import::runner::{run, RunSummary};

const ROSTER: &str = "\
id,first_name,last_name,team
1,Jasper,Philipsen,Alpecin
2,Remco,Evenepoel,Soudal
3,Tadej,Pogačar,UAE
18,Mattia,Cattaneo,Soudal
4,Tim,Merlier,Soudal
5,Tim,Merlier,Other
";

const STAGE: &str = "\
position,first_name,last_name,rider_id,team_name,time_seconds
1,Jasper,Philipsen,1,Alpecin,13991
2,Rem++,Evenepoel,,Soudal,13991
3,Tadej,Pogacar,4,UAE,13995
4,Mattis,Cattaneo,,Soudal,14000
5,Tim,Merlier,,Soudal,14000
6,Nobody,Known,99,,DNF
";

fn setup(dir: &Path) -> (PathBuf, PathBuf) {
    let roster = dir.join("database_csv/riders.csv");
    let stage = dir.join("imports/etappe-1-uitslag.csv");
    fs::create_dir_all(roster.parent().unwrap()).unwrap();
    fs::create_dir_all(stage.parent().unwrap()).unwrap();
    fs::write(&roster, ROSTER).unwrap();
    fs::write(&stage, STAGE).unwrap();
    (roster, stage)
}

fn run_job(job: Job) -> (RunSummary, String) {
    let mut out = Vec::new();
    let summary = run(&job, None, &mut out).unwrap();
    (summary, String::from_utf8(out).unwrap())
}

#[test]
fn compare_counts_each_category() {
    let dir = tempfile::tempdir().unwrap();
    let (roster, results) = setup(dir.path());

    let (_, raw) = run_job(Job::Compare(CompareOptions {
        roster: roster.clone(),
        results: results.clone(),
        correct: false,
        extra_corrections: None,
    }));
    assert!(raw.contains("Matched by id + name: 1\n"));
    assert!(raw.contains("Matched by name only: 1 (1 ambiguous)\n"));
    assert!(raw.contains("Id mismatch: 1\n"));
    assert!(raw.contains("Not matched: 3\n"));

    let (_, corrected) = run_job(Job::Compare(CompareOptions { roster, results, correct: true, extra_corrections: None }));
    assert!(corrected.contains("Matched by id + name: 2\n"));
    assert!(corrected.contains("Matched by name only: 2 (1 ambiguous)\n"));
    assert!(corrected.contains("Not matched: 1\n"));
    assert!(corrected.contains("(corrected from Rem++ Evenepoel)") || corrected.contains("Remco Evenepoel"));
}

#[test]
fn fix_then_generate_then_validate() {
    let dir = tempfile::tempdir().unwrap();
    let (roster, results) = setup(dir.path());
    let fixed = dir.path().join("imports/etappe-1-uitslag-fixed.csv");

    let (summary, report) = run_job(Job::Fix(FixOptions {
        roster,
        results: results.clone(),
        out: fixed.clone(),
        extra_corrections: None,
    }));
    assert_eq!(summary.files_written, vec![fixed.clone()]);
    assert!(report.contains("riders with rider_id: 5 (83.3%)"));
    assert!(report.contains("names corrected: 2"));
    assert!(report.contains("4 -> 3 (Tadej Pogačar)"));
    assert!(report.contains("Pos 6: Nobody Known (id 99 dropped)"));

    let csv = fs::read_to_string(&fixed).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "position,first_name,last_name,rider_id,team_name,time_seconds");
    assert_eq!(lines[2], "2,Remco,Evenepoel,2,Soudal,13991");
    assert_eq!(lines[3], "3,Tadej,Pogacar,3,UAE,13995");
    assert_eq!(lines[4], "4,Mattia,Cattaneo,18,Soudal,14000");
    assert_eq!(lines[5], "5,Tim,Merlier,4,Soudal,14000");
    assert_eq!(lines[6], "6,Nobody,Known,,,DNF");

    let sql_path = dir.path().join("imports/import-etappe-1-uitslag.sql");
    let generate = Job::Generate(GenerateOptions {
        input: fixed,
        fallback: Some(results),
        roster: None,
        extra_corrections: None,
        stage: 1,
        out: sql_path.clone(),
        replace: false,
    });
    run_job(generate.clone());
    let first = fs::read_to_string(&sql_path).unwrap();
    run_job(generate);
    let second = fs::read_to_string(&sql_path).unwrap();
    assert_eq!(first, second, "regeneration must be byte-identical");

    assert!(first.contains("SELECT s.id, 1, 1, 13991, 1\n"));
    assert!(first.contains("SELECT s.id, 2, 2, 13991, 1\n"));
    assert!(first.contains("SELECT s.id, 3, 3, 13995, 2\n"));
    assert!(first.contains("SELECT s.id, 4, 5, 14000, 3\n"));
    assert!(first.contains("-- DNF\nINSERT INTO stage_results"));
    assert!(first.contains("LOWER('Nobody')"));
    assert_eq!(first.matches("ON CONFLICT (stage_id, rider_id) DO UPDATE SET").count(), 6);
    assert_eq!(first.matches("WHERE s.stage_number = 1\n").count(), 6);

    let (summary, report) = run_job(Job::Validate(ValidateOptions { input: sql_path }));
    assert!(summary.passed, "{report}");
}

#[test]
fn generate_falls_back_when_fixed_csv_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let (roster, results) = setup(dir.path());
    let sql_path = dir.path().join("out.sql");

    let (_, report) = run_job(Job::Generate(GenerateOptions {
        input: dir.path().join("missing.csv"),
        fallback: Some(results),
        roster: Some(roster),
        extra_corrections: None,
        stage: 2,
        out: sql_path.clone(),
        replace: true,
    }));
    let sql = fs::read_to_string(&sql_path).unwrap();
    assert!(sql.contains("DELETE FROM stage_results WHERE stage_id = (SELECT id FROM stages WHERE stage_number = 2);"));
    // with a roster the mismatched id 4 is not trusted, the unknown rider is left out
    assert!(!sql.contains("LOWER('Nobody')"));
    let (reviewed, missing) = report.split_once("NOT IN ROSTER (left out)").unwrap();
    assert!(missing.contains("Stage 2 pos 6: Nobody Known"));
    assert!(!missing.contains("Pogacar"));
    assert!(reviewed.contains("ID MISMATCH (left out)"));
    assert!(reviewed.contains("Stage 2 pos 3: Tadej Pogacar claims id 4 (roster has Tim Merlier); name matches [3]"));
}

#[test]
fn generate_with_roster_surfaces_tie_breaks() {
    let dir = tempfile::tempdir().unwrap();
    let (roster, _) = setup(dir.path());
    let input = dir.path().join("stage.csv");
    fs::write(
        &input,
        "position,first_name,last_name,rider_id,team_name,time_seconds\n\
         1,Tim,Merlier,,,100\n\
         2,Tadej,Pogacar,4,,105\n",
    )
    .unwrap();
    let sql_path = dir.path().join("out.sql");

    let (_, report) = run_job(Job::Generate(GenerateOptions {
        input,
        fallback: None,
        roster: Some(roster),
        extra_corrections: None,
        stage: 1,
        out: sql_path.clone(),
        replace: false,
    }));
    let sql = fs::read_to_string(&sql_path).unwrap();
    assert!(sql.contains("SELECT s.id, 4, 1, 100, 1\n"));
    assert_eq!(sql.matches("INSERT INTO stage_results").count(), 1);

    assert!(report.contains("AMBIGUOUS NAMES (tie-break: first listed in roster order)"));
    assert!(report.contains("Stage 1 pos 1: Tim Merlier -> id 4 of [4, 5]"));
    assert!(report.contains("ID MISMATCH (left out)"));
    assert!(report.contains("Stage 1 pos 2: Tadej Pogacar claims id 4 (roster has Tim Merlier); name matches [3]"));
    assert!(!report.contains("NOT IN ROSTER"));
}

#[test]
fn validate_fails_on_script_leftovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.sql");
    fs::write(&path, "import csv\nprint(\"x\")\n").unwrap();

    let (summary, report) = run_job(Job::Validate(ValidateOptions { input: path }));
    assert!(!summary.passed);
    assert!(report.contains("file does not start with a SQL comment"));
}

#[test]
fn missing_input_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let job = Job::Compare(CompareOptions {
        roster: dir.path().join("nope.csv"),
        results: dir.path().join("nope2.csv"),
        correct: false,
        extra_corrections: None,
    });
    let mut out = Vec::new();
    assert!(matches!(run(&job, None, &mut out), Err(peloton_import::Error::Read { .. })));
}

#[test]
fn riders_script_from_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = dir.path().join("riders.csv");
    fs::write(
        &sheet,
        "first_name,last_name,team_name,nationality,date_of_birth,weight_kg,height_m,photo_url\n\
         Ben,O'Connor,Jayco AlUla,Australia,1995-11-25,68,1.84,\n\
         Nameless,,Jayco AlUla,Australia,,,,\n",
    )
    .unwrap();
    let out = dir.path().join("import-riders-generated.sql");

    let (_, report) = run_job(Job::RidersSql(RidersSqlOptions { input: sheet, out: out.clone() }));
    assert!(report.contains("with 1 riders"));
    let sql = fs::read_to_string(out).unwrap();
    assert!(sql.contains("'O''Connor'"));
    assert!(sql.contains("WHERE NOT EXISTS ("));
}

#[test]
fn csv_sql_sections_per_stage() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("multi.csv");
    fs::write(
        &input,
        "stage_number,first_name,last_name,position,time_seconds,same_time_group\n\
         2,Tim,Merlier,1,12000,1\n\
         1,Jasper,Philipsen,1,12345,1\n\
         1,Mathieu,van der Poel,2,12350,2\n",
    )
    .unwrap();
    let out = dir.path().join("from-csv.sql");

    run_job(Job::CsvSql(CsvSqlOptions { input, out: out.clone() }));
    let sql = fs::read_to_string(out).unwrap();
    let s1 = sql.find("-- Stage 1 Results").unwrap();
    let s2 = sql.find("-- Stage 2 Results").unwrap();
    assert!(s1 < s2);
    assert!(sql.contains("SELECT s.id, r.id, 2, 12350, 2\n"));
    assert!(sql.contains("LOWER('van der Poel')"));
}
