// src/error.rs
use std::path::PathBuf;

/// Library-wide error. Only unrecoverable conditions end up here;
/// malformed rows and failed stage fetches are counted and skipped instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path exists but is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("malformed CSV in {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: ::csv::Error,
    },

    #[error("no usable records in {0}")]
    NoRecords(String),

    #[error("HTTP request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("cannot use image from {url}: {reason}")]
    Image { url: String, reason: String },

    #[error("no results table on {0}")]
    NoResultsTable(String),

    #[error("cannot write report: {0}")]
    Report(#[from] std::io::Error),

    #[error("invalid {what}: {value}")]
    Invalid { what: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn csv(source_name: impl Into<String>, source: ::csv::Error) -> Self {
        Error::Csv { source_name: source_name.into(), source }
    }

    pub fn invalid(what: &'static str, value: impl Into<String>) -> Self {
        Error::Invalid { what, value: value.into() }
    }
}
