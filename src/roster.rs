//! Roster Loader: parses the tab-delimited country headquarters roster.

use crate::error::{DirectoryError, Result};
use crate::types::HeadquartersRecord;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Headquarters records keyed by country code, preserving file order.
///
/// A duplicate country code replaces the earlier record in place, matching
/// last-write-wins upsert semantics.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    records: Vec<HeadquartersRecord>,
    by_code: HashMap<String, usize>,
}

impl Roster {
    pub fn insert(&mut self, record: HeadquartersRecord) {
        if let Some(&idx) = self.by_code.get(&record.country_code) {
            debug!(
                country_code = %record.country_code,
                "duplicate roster row replaces earlier record"
            );
            self.records[idx] = record;
        } else {
            self.by_code
                .insert(record.country_code.clone(), self.records.len());
            self.records.push(record);
        }
    }

    pub fn get(&self, country_code: &str) -> Option<&HeadquartersRecord> {
        self.by_code.get(country_code).map(|&idx| &self.records[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeadquartersRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse roster text: the header row is always discarded, every field is
/// trimmed, and rows with fewer than 5 fields are skipped rather than
/// rejected.
pub fn parse_roster(input: &str) -> Roster {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());

    let mut roster = Roster::default();
    for (row_idx, result) in reader.records().enumerate() {
        if row_idx == 0 {
            // Header row, discarded regardless of content
            continue;
        }
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(row = row_idx + 1, error = %e, "skipping unreadable roster row");
                continue;
            }
        };
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        if record.len() < 5 {
            warn!(row = row_idx + 1, "skipping malformed roster row");
            continue;
        }
        roster.insert(HeadquartersRecord {
            country_name: record[0].to_string(),
            country_code: record[1].to_string(),
            aliens_hq: record[2].to_string(),
            predators_hq: record[3].to_string(),
            monsters_hq: record[4].to_string(),
        });
    }

    roster
}

/// Load the roster file. The roster is a mandatory source: an unreadable
/// file is surfaced as `SourceUnavailable`.
pub fn load_roster(path: &Path) -> Result<Roster> {
    let content = fs::read_to_string(path).map_err(|e| DirectoryError::SourceUnavailable {
        path: path.to_path_buf(),
        source: e,
    })?;
    let roster = parse_roster(&content);
    debug!(path = %path.display(), countries = roster.len(), "loaded roster");
    Ok(roster)
}
