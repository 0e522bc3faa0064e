// src/csv.rs
// Thin layer over the `csv` crate: header-keyed rows in, whole-file strings out.
use std::fs::File;
use std::io;
use std::path::Path;

use ::csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/* ---------------- Parsing ---------------- */

/// Rows that deserialized, plus how many did not.
#[derive(Debug)]
pub struct Parsed<T> {
    pub rows: Vec<T>,
    pub skipped: usize,
}

/// Read header-keyed rows from any reader. Extra columns are ignored,
/// short rows are tolerated; a row that fails to deserialize is skipped and counted.
pub fn read_from<R: io::Read, T: DeserializeOwned>(rdr: R, source_name: &str) -> Result<Parsed<T>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(rdr);

    reader.headers().map_err(|e| Error::csv(source_name, e))?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (i, result) in reader.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) if e.is_io_error() => return Err(Error::csv(source_name, e)),
            Err(e) => {
                // +2: header line and 1-based numbering
                logd!("{}: skipping line {}: {}", source_name, i + 2, e);
                skipped += 1;
            }
        }
    }
    Ok(Parsed { rows, skipped })
}

pub fn read_path<T: DeserializeOwned>(path: &Path) -> Result<Parsed<T>> {
    let file = File::open(path).map_err(|source| Error::Read { path: path.to_path_buf(), source })?;
    read_from(file, &path.display().to_string())
}

/// Empty cells and bare whitespace become `None`.
pub fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/* ---------------- Writing ---------------- */

/// Render a whole CSV document (header + rows) into a string.
pub fn to_csv_string(headers: &[&str], rows: &[Vec<String>]) -> Result<String> {
    let mut w = WriterBuilder::new().from_writer(Vec::new());
    w.write_record(headers).map_err(|e| Error::csv("<output>", e))?;
    for row in rows {
        w.write_record(row).map_err(|e| Error::csv("<output>", e))?;
    }
    let buf = w.into_inner().map_err(|e| Error::csv("<output>", e.into_error().into()))?;

    match String::from_utf8(buf) {
        Ok(s) => Ok(s),
        Err(e) => Ok(String::from_utf8_lossy(&e.into_bytes()).into_owned()),
    }
}
