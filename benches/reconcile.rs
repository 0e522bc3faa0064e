// benches/reconcile.rs
use criterion::{criterion_group, criterion_main, Criterion, black_box};

use peloton_import::{
    corrections::CorrectionTable,
    input,
    model::ExternalRecord,
    reconcile::reconcile_all,
    roster::RosterIndex,
    timing::{parse_time, same_time_groups},
};

const FIRST: [&str; 8] = ["Jasper", "Tadej", "Remco", "Tim", "Biniam", "Wout", "Mattia", "Jonas"];
const LAST: [&str; 8] = ["Philipsen", "Pogačar", "Evenepoel", "Merlier", "Girmay", "van Aert", "Cattaneo", "Vingegaard"];

/// A full-size peloton: 176 riders, every name distinct by a numeric suffix.
fn roster_csv() -> String {
    let mut csv = String::from("id,first_name,last_name\n");
    for id in 1..=176u32 {
        let i = id as usize;
        csv.push_str(&format!("{id},{},{} {}\n", FIRST[i % 8], LAST[(i / 8) % 8], i));
    }
    csv
}

/// Result records with a mix of correct ids, wrong ids and no id at all.
fn records() -> Vec<ExternalRecord> {
    (1..=176u32)
        .map(|id| {
            let i = id as usize;
            let rec = ExternalRecord::new(id, FIRST[i % 8], &format!("{} {}", LAST[(i / 8) % 8], i));
            match id % 3 {
                0 => rec.with_id(id),
                1 => rec.with_id(177 - id),
                _ => rec,
            }
        })
        .collect()
}

fn bench_reconcile(c: &mut Criterion) {
    let roster = RosterIndex::from_reader(roster_csv().as_bytes(), "bench").expect("synthetic roster");
    let recs = records();
    let table = CorrectionTable::builtin();

    c.bench_function("roster_index", |b| {
        let csv = roster_csv();
        b.iter(|| {
            let idx = RosterIndex::from_reader(black_box(csv.as_bytes()), "bench").expect("synthetic roster");
            black_box(idx.len())
        })
    });

    c.bench_function("reconcile_all", |b| {
        b.iter(|| {
            let out = reconcile_all(black_box(&recs), &roster, None);
            black_box(out.len())
        })
    });

    c.bench_function("reconcile_all_corrected", |b| {
        b.iter(|| {
            let out = reconcile_all(black_box(&recs), &roster, Some(table));
            black_box(out.len())
        })
    });
}

fn bench_free_text(c: &mut Criterion) {
    let mut sheet = String::new();
    for pos in 1..=176u32 {
        let i = pos as usize;
        let gap = pos / 10;
        match pos % 4 {
            0 => sheet.push_str(&format!("{pos}. {} {} 3:53:{:02}\n", FIRST[i % 8], LAST[(i / 8) % 8], 11 + gap)),
            1 => sheet.push_str(&format!("{pos},{},{},3:53:{:02}\n", FIRST[i % 8], LAST[(i / 8) % 8], 11 + gap)),
            2 => sheet.push_str(&format!("{pos}\t{}\t{}\t+0:{:02}\n", FIRST[i % 8], LAST[(i / 8) % 8], gap)),
            _ => sheet.push_str(&format!("{pos} {} {} DNF\n", FIRST[i % 8], LAST[(i / 8) % 8])),
        }
    }

    c.bench_function("parse_free_text", |b| {
        b.iter(|| {
            let (rows, skipped) = input::parse_free_text(black_box(&sheet));
            black_box(rows.len() + skipped)
        })
    });

    let (rows, _) = input::parse_free_text(&sheet);
    c.bench_function("time_groups", |b| {
        b.iter(|| {
            let times: Vec<Option<u32>> = rows
                .iter()
                .map(|r| parse_time(r.time.as_deref().unwrap_or("")).seconds())
                .collect();
            black_box(same_time_groups(black_box(&times)).len())
        })
    });
}

criterion_group!(benches, bench_reconcile, bench_free_text);
criterion_main!(benches);
