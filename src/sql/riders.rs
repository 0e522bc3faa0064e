// src/sql/riders.rs
//! Rider import script: table setup, FK guard, idempotent insert, verify queries.

use std::fmt::Write as _;

use super::quoted;
use crate::input::RiderSheetRow;

const PREAMBLE: &str = "\
-- Make sure teams_pro table is already populated before running this script

CREATE TABLE IF NOT EXISTS riders (
  id SERIAL PRIMARY KEY,
  team_pro_id INTEGER,
  first_name VARCHAR(100),
  last_name VARCHAR(100) NOT NULL,
  date_of_birth DATE,
  nationality VARCHAR(80),
  weight_kg NUMERIC(4, 1),
  height_m NUMERIC(3, 2),
  photo_url TEXT
);

DO $$
BEGIN
  IF NOT EXISTS (
    SELECT 1 FROM pg_constraint
    WHERE conname = 'riders_team_pro_id_fkey'
  ) THEN
    ALTER TABLE riders
    ADD CONSTRAINT riders_team_pro_id_fkey
    FOREIGN KEY (team_pro_id) REFERENCES teams_pro(id);
  END IF;
END $$;
";

const VERIFY: &str = "
-- Verify the import
SELECT COUNT(*) AS total_riders FROM riders;
SELECT
  r.id,
  r.first_name,
  r.last_name,
  r.date_of_birth,
  tp.name AS team_name,
  r.nationality,
  r.weight_kg,
  r.height_m
FROM riders r
LEFT JOIN teams_pro tp ON r.team_pro_id = tp.id
ORDER BY r.last_name, r.first_name
LIMIT 20;
";

/// Full script for the given sheet rows. Riders whose team is not in `teams_pro`
/// are not inserted; riders already present (same first and last name) are left alone.
pub fn render_riders_script(source_name: &str, rows: &[RiderSheetRow]) -> String {
    let mut sql = String::new();
    let _ = writeln!(sql, "-- SQL Script to import riders from {}", super::comment_text(source_name));
    let _ = writeln!(sql, "-- Total riders: {}", rows.len());
    sql.push_str(PREAMBLE);

    if rows.is_empty() {
        sql.push_str("\n-- No riders to insert\n");
    } else {
        sql.push_str("\nINSERT INTO riders (team_pro_id, first_name, last_name, date_of_birth, nationality, weight_kg, height_m, photo_url)\n");
        sql.push_str("SELECT\n  tp.id,\n  r.first_name,\n  r.last_name,\n  r.date_of_birth::DATE,\n  r.nationality,\n");
        sql.push_str("  r.weight_kg::NUMERIC(4,1),\n  r.height_m::NUMERIC(3,2),\n  NULLIF(r.photo_url, '')\n");
        sql.push_str("FROM (\n  VALUES\n");
        let values: Vec<String> = rows.iter().map(values_tuple).collect();
        sql.push_str(&values.join(",\n"));
        sql.push_str("\n) AS r(first_name, last_name, team_name, nationality, date_of_birth, weight_kg, height_m, photo_url)\n");
        sql.push_str("INNER JOIN teams_pro tp ON tp.name = r.team_name\n");
        sql.push_str("WHERE NOT EXISTS (\n");
        sql.push_str("  SELECT 1 FROM riders x\n");
        sql.push_str("  WHERE x.first_name = r.first_name AND x.last_name = r.last_name\n);\n");
    }

    sql.push_str(VERIFY);
    sql
}

fn values_tuple(r: &RiderSheetRow) -> String {
    format!(
        "    ({}, {}, {}, {}, {}, {}, {}, {})",
        quoted(r.first_name.trim()),
        quoted(r.last_name.trim()),
        quoted(r.team_name.trim()),
        quoted(r.nationality.trim()),
        date_or_null(r.date_of_birth.as_deref()),
        decimal_or_null(r.weight_kg.as_deref()),
        decimal_or_null(r.height_m.as_deref()),
        quoted(r.photo_url.as_deref().unwrap_or("").trim()),
    )
}

/// `YYYY-MM-DD` only; anything else is NULL.
fn date_or_null(v: Option<&str>) -> String {
    let Some(v) = v.map(str::trim).filter(|v| !v.is_empty()) else { return s!("NULL") };
    let parts: Vec<&str> = v.split('-').collect();
    let ok = parts.len() == 3
        && [4, 2, 2].iter().zip(&parts).all(|(n, p)| p.len() == *n && p.bytes().all(|b| b.is_ascii_digit()));
    if ok { quoted(v) } else {
        logw!("ignoring malformed date_of_birth {:?}", v);
        s!("NULL")
    }
}

/// A plain decimal number, else NULL. Keeps free text out of the statement.
fn decimal_or_null(v: Option<&str>) -> String {
    match v.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) if v.parse::<f64>().is_ok_and(f64::is_finite) && !v.contains(['e', 'E']) => s!(v),
        _ => s!("NULL"),
    }
}
