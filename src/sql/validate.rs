// src/sql/validate.rs
//! Sanity check for generated SQL files: must look like SQL and carry no stray
//! script-language lines (docstrings, imports, function definitions, prints).

use std::sync::LazyLock;

use regex::Regex;

const SQL_KEYWORDS: &[&str] = &["SELECT", "INSERT", "UPDATE", "DELETE", "CREATE", "DO $$"];

static FOREIGN_LINES: LazyLock<[(Regex, &'static str); 3]> = LazyLock::new(|| {
    [
        (Regex::new(r"(?m)^\s*import\s+\w+").expect("static regex"), "found script import statements"),
        (Regex::new(r"(?m)^\s*def\s+\w+").expect("static regex"), "found script function definitions"),
        (Regex::new(r"(?m)^\s*print\s*\(").expect("static regex"), "found script print statements"),
    ]
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validation {
    pub issues: Vec<String>,
    pub has_sql: bool,
    pub chars: usize,
    pub lines: usize,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty() && self.has_sql
    }
}

pub fn validate_sql(content: &str) -> Validation {
    let mut issues = Vec::new();

    if content.contains("\"\"\"") {
        issues.push(s!("found triple quotes (docstrings)"));
    }
    for (re, msg) in FOREIGN_LINES.iter() {
        if re.is_match(content) {
            issues.push(s!(*msg));
        }
    }
    if !content.trim_start().starts_with("--") {
        issues.push(s!("file does not start with a SQL comment"));
    }

    let upper = content.to_uppercase();
    Validation {
        issues,
        has_sql: SQL_KEYWORDS.iter().any(|k| upper.contains(k)),
        chars: content.chars().count(),
        lines: content.lines().count(),
    }
}
