//! Contact Loader: parses per-group contact files and collects a whole
//! contacts folder into one set of groups.

use crate::constants::CONTACT_FILE_EXT;
use crate::error::{DirectoryError, Result};
use crate::types::{ContactGroup, ContactRecord};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// All loaded contact groups, in load order, plus the global vocabulary the
/// matrix projection needs: group names and distinct invader keys as
/// observed across every file.
#[derive(Debug, Clone, Default)]
pub struct ContactSet {
    groups: Vec<ContactGroup>,
    by_name: HashMap<String, usize>,
}

impl ContactSet {
    pub fn insert(&mut self, group: ContactGroup) {
        if let Some(&idx) = self.by_name.get(&group.name) {
            warn!(group = %group.name, "duplicate contact group replaces earlier one");
            self.groups[idx] = group;
        } else {
            self.by_name.insert(group.name.clone(), self.groups.len());
            self.groups.push(group);
        }
    }

    pub fn get(&self, name: &str) -> Option<&ContactGroup> {
        self.by_name.get(name).map(|&idx| &self.groups[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Row universe for the identity matrices: group names in load order.
    pub fn group_names(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.name.clone()).collect()
    }

    /// Column universe for the identity matrices: distinct invader keys in
    /// first-observed order across all groups.
    pub fn invader_keys(&self) -> Vec<String> {
        let mut seen = HashMap::new();
        let mut keys = Vec::new();
        for group in &self.groups {
            for contact in &group.contacts {
                if seen.insert(contact.invader_key.clone(), ()).is_none() {
                    keys.push(contact.invader_key.clone());
                }
            }
        }
        keys
    }
}

/// Result of scanning a contacts folder. Files that could not be parsed are
/// reported alongside the groups instead of aborting the scan.
#[derive(Debug, Default)]
pub struct ContactScan {
    pub groups: ContactSet,
    pub skipped_files: Vec<String>,
}

/// Parse one contact file: the first row's first field names the group; the
/// remaining rows are `(invader_key, attack?, defense?, healing?)` with
/// missing trailing fields treated as empty. Returns `None` for a file with
/// no usable group name.
pub fn parse_contact_group(input: &str) -> Option<ContactGroup> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());

    let mut rows = reader.records();

    let name = match rows.next() {
        Some(Ok(first)) => first.get(0).unwrap_or("").to_string(),
        _ => return None,
    };
    if name.is_empty() {
        return None;
    }

    let mut contacts = Vec::new();
    for result in rows {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(group = %name, error = %e, "skipping unreadable contact row");
                continue;
            }
        };
        let invader_key = record.get(0).unwrap_or("").to_string();
        if invader_key.is_empty() {
            continue;
        }
        contacts.push(ContactRecord {
            invader_key,
            attack: record.get(1).unwrap_or("").to_string(),
            defense: record.get(2).unwrap_or("").to_string(),
            healing: record.get(3).unwrap_or("").to_string(),
        });
    }

    Some(ContactGroup { name, contacts })
}

/// Load a single contact file; unreadable files surface `SourceUnavailable`.
pub fn load_contact_group(path: &Path) -> Result<Option<ContactGroup>> {
    let content = fs::read_to_string(path).map_err(|e| DirectoryError::SourceUnavailable {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(parse_contact_group(&content))
}

/// Collect every eligible `.txt` file in `dir` into a `ContactScan`, keyed
/// by each file's own first-row group name (not the filename). One bad file
/// is skipped with a warning; only an unreadable directory is fatal.
pub fn gather_contact_groups(dir: &Path) -> Result<ContactScan> {
    let entries = fs::read_dir(dir).map_err(|e| DirectoryError::SourceUnavailable {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(CONTACT_FILE_EXT))
        })
        .collect();
    // Directory listing order is OS-dependent; sort for deterministic output
    paths.sort();

    let mut scan = ContactScan::default();
    for path in paths {
        match load_contact_group(&path) {
            Ok(Some(group)) => {
                debug!(path = %path.display(), group = %group.name, contacts = group.contacts.len(), "loaded contact group");
                scan.groups.insert(group);
            }
            Ok(None) => {
                warn!(path = %path.display(), "contact file has no group name; skipping");
                scan.skipped_files.push(path.display().to_string());
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load contact file; skipping");
                scan.skipped_files.push(path.display().to_string());
            }
        }
    }

    Ok(scan)
}
