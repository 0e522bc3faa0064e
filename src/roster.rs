// src/roster.rs
use std::collections::HashMap;
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::csv::{self, non_empty};
use crate::error::{Error, Result};
use crate::model::{NameKey, RosterEntry};

#[derive(Deserialize)]
struct RosterRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
}

/// Reference roster with two lookups: exact id, and normalized name (one-to-many).
///
/// Every entry is indexed exactly once under its own `NameKey`; entries sharing a key
/// keep the order they were read in.
#[derive(Debug, Default)]
pub struct RosterIndex {
    entries: Vec<RosterEntry>,
    by_id: HashMap<u32, usize>,
    by_name: HashMap<NameKey, Vec<usize>>,
    skipped: usize,
}

impl RosterIndex {
    pub fn from_entries<I: IntoIterator<Item = RosterEntry>>(entries: I) -> Self {
        let mut idx = RosterIndex::default();
        for e in entries {
            idx.insert(e);
        }
        idx
    }

    /// Build from a roster CSV stream (`id,first_name,last_name,…`).
    /// Rows without a numeric id, and repeats of an id already seen, are skipped.
    pub fn from_reader<R: io::Read>(rdr: R, source_name: &str) -> Result<Self> {
        let parsed = csv::read_from::<_, RosterRow>(rdr, source_name)?;
        let mut idx = RosterIndex { skipped: parsed.skipped, ..Default::default() };

        for row in parsed.rows {
            let Some(raw_id) = non_empty(row.id) else {
                logd!("{}: row without id skipped ({} {})", source_name, row.first_name, row.last_name);
                idx.skipped += 1;
                continue;
            };
            let Ok(id) = raw_id.parse::<u32>() else {
                logd!("{}: non-numeric id {:?} skipped", source_name, raw_id);
                idx.skipped += 1;
                continue;
            };
            let entry = RosterEntry {
                id,
                first_name: row.first_name.trim().to_string(),
                last_name: row.last_name.trim().to_string(),
            };
            if !idx.insert(entry) {
                logw!("{}: duplicate rider id {} skipped", source_name, id);
                idx.skipped += 1;
            }
        }
        Ok(idx)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|source| Error::Read { path: path.to_path_buf(), source })?;
        let idx = Self::from_reader(file, &path.display().to_string())?;
        logf!("{} riders read from {}", idx.len(), path.display());
        Ok(idx)
    }

    /// Returns false (and stores nothing) when the id is already taken.
    fn insert(&mut self, entry: RosterEntry) -> bool {
        if self.by_id.contains_key(&entry.id) {
            return false;
        }
        let ix = self.entries.len();
        self.by_id.insert(entry.id, ix);
        self.by_name.entry(entry.key()).or_default().push(ix);
        self.entries.push(entry);
        true
    }

    pub fn by_id(&self, id: u32) -> Option<&RosterEntry> {
        self.by_id.get(&id).map(|&ix| &self.entries[ix])
    }

    /// Entries sharing this key, in roster order. Empty when unknown.
    pub fn by_name(&self, key: &NameKey) -> Vec<&RosterEntry> {
        self.by_name
            .get(key)
            .map(|ixs| ixs.iter().map(|&ix| &self.entries[ix]).collect())
            .unwrap_or_default()
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows dropped while loading (malformed, missing id, duplicate id).
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = "\
id,first_name,last_name,team_name
1,Tadej,Pogačar,UAE
2,Jonas,Vingegaard,Visma
,No,Id,Nobody
x,Bad,Id,Nobody
3,Tadej,Pogacar,Other
2,Dup,Licate,Visma
";

    #[test]
    fn builds_both_indexes_and_skips_bad_rows() {
        let idx = RosterIndex::from_reader(ROSTER.as_bytes(), "mem").unwrap();
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.skipped(), 3);
        assert_eq!(idx.by_id(2).unwrap().last_name, "Vingegaard");
        assert!(idx.by_id(99).is_none());
    }

    #[test]
    fn name_index_keeps_collisions_in_order() {
        let idx = RosterIndex::from_reader(ROSTER.as_bytes(), "mem").unwrap();
        let hits = idx.by_name(&NameKey::new("TADEJ", "pogacar"));
        let ids: Vec<u32> = hits.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn every_entry_indexed_exactly_once() {
        let idx = RosterIndex::from_reader(ROSTER.as_bytes(), "mem").unwrap();
        let total: usize = idx.by_name.values().map(|v| v.len()).sum();
        assert_eq!(total, idx.len());
        for e in idx.entries() {
            assert!(idx.by_name(&e.key()).iter().any(|x| x.id == e.id));
        }
    }

    #[test]
    fn missing_roster_file_is_fatal() {
        assert!(matches!(RosterIndex::load(Path::new("nope/riders.csv")), Err(Error::Read { .. })));
    }
}
