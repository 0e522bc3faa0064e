// tests/fetch_fixture.rs
use std::collections::HashMap;
use std::fs;

use peloton_import::config::options::FetchOptions;
use peloton_import::core::net::PageSource;
use peloton_import::progress::Progress;
use peloton_import::runner::fetch;
use peloton_import::{Error, Result};

struct Fixtures {
    pages: HashMap<String, String>,
    requested: Vec<String>,
}

impl PageSource for Fixtures {
    fn get(&mut self, url: &str) -> Result<String> {
        self.requested.push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Http { url: url.to_string(), reason: "HTTP 404 Not Found".into() })
    }
}

#[derive(Default)]
struct Recorder {
    total: usize,
    done: Vec<(u32, usize)>,
    finished: bool,
}

impl Progress for Recorder {
    fn begin(&mut self, total: usize) {
        self.total = total;
    }
    fn item_done(&mut self, item: u32, rows: usize) {
        self.done.push((item, rows));
    }
    fn finish(&mut self) {
        self.finished = true;
    }
}

const STAGE_1: &str = r#"<table class="results">
<tr><th>Rnk</th><th>Rider</th><th>Team</th><th>Time</th></tr>
<tr><td>1</td><td><a href="rider/jasper-philipsen">PHILIPSEN Jasper</a></td><td><a href="team/alpecin">Alpecin</a></td><td class="time">3:53:11</td></tr>
<tr><td>2</td><td><a href="rider/biniam-girmay">GIRMAY Biniam</a></td><td><a href="team/iwa">Intermarché</a></td><td class="time">,,</td></tr>
<tr><td>3</td><td><a href="rider/someone-else">ELSE Someone</a></td><td><a href="team/x">X</a></td><td class="time">+0:07</td></tr>
</table>"#;

const STAGE_3: &str = r#"<table class="results">
<tr><th>Rnk</th><th>Rider</th><th>Time</th></tr>
<tr><td>1</td><td><a href="rider/biniam-girmay">GIRMAY Biniam</a></td><td class="time">0:12:40</td></tr>
<tr><td>2</td><td><a href="rider/jasper-philipsen">PHILIPSEN Jasper</a></td><td class="time">+0:03</td></tr>
</table>"#;

fn options(dir: &std::path::Path, roster: Option<std::path::PathBuf>) -> FetchOptions {
    FetchOptions {
        base_url: "https://example.test/race/2025/".into(),
        stages: vec![1, 2, 3],
        itt_stages: vec![3],
        roster,
        out: dir.join("fetched.sql"),
        pause_ms: 0,
        timeout_secs: 1,
    }
}

fn fixtures() -> Fixtures {
    let mut pages = HashMap::new();
    pages.insert("https://example.test/race/2025/stage-1/result".to_string(), STAGE_1.to_string());
    pages.insert("https://example.test/race/2025/stage-3-itt/result".to_string(), STAGE_3.to_string());
    Fixtures { pages, requested: Vec::new() }
}

#[test]
fn failed_stage_is_skipped_and_the_rest_resolved_by_roster() {
    let dir = tempfile::tempdir().unwrap();
    let roster = dir.path().join("riders.csv");
    fs::write(&roster, "id,first_name,last_name\n7,Jasper,Philipsen\n8,Biniam,Girmay\n").unwrap();

    let opts = options(dir.path(), Some(roster));
    let mut source = fixtures();
    let mut progress = Recorder::default();
    let mut report = Vec::new();
    let summary = fetch(&opts, &mut source, Some(&mut progress as &mut dyn Progress), &mut report).unwrap();
    let report = String::from_utf8(report).unwrap();

    assert_eq!(source.requested.len(), 3);
    assert_eq!(progress.total, 3);
    assert_eq!(progress.done, vec![(1, 2), (2, 0), (3, 2)]);
    assert!(progress.finished);

    let sql = fs::read_to_string(&summary.files_written[0]).unwrap();
    // stage 1: winner time, same time, unknown rider left out
    assert!(sql.contains("SELECT s.id, 7, 1, 13991, 1\nFROM stages s\nWHERE s.stage_number = 1\n"));
    assert!(sql.contains("SELECT s.id, 8, 2, 13991, 1\nFROM stages s\nWHERE s.stage_number = 1\n"));
    // stage 3 (time trial): gap added to the winner's time
    assert!(sql.contains("SELECT s.id, 8, 1, 760, 1\nFROM stages s\nWHERE s.stage_number = 3\n"));
    assert!(sql.contains("SELECT s.id, 7, 2, 763, 2\nFROM stages s\nWHERE s.stage_number = 3\n"));
    assert!(!sql.contains("-- Stage 2 Results"));

    assert!(report.contains("Stage 2: HTTP request to https://example.test/race/2025/stage-2/result failed"));
    assert!(report.contains("Stage 1 pos 3: ELSE Someone"));
}

#[test]
fn without_roster_riders_are_looked_up_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(dir.path(), None);
    opts.stages = vec![1];
    let mut source = fixtures();
    let mut report = Vec::new();
    let summary = fetch(&opts, &mut source, None, &mut report).unwrap();

    let sql = fs::read_to_string(&summary.files_written[0]).unwrap();
    assert!(sql.contains("LOWER('Someone') AND LOWER(TRIM(last_name)) = LOWER('Else')"));
    assert!(sql.contains("SELECT s.id, r.id, 3, 13998, 2\n"));
    assert_eq!(sql.matches("INSERT INTO stage_results").count(), 3);
}
