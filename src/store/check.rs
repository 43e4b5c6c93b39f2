//! Read-only consistency check over a record store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::read_record;
use crate::callsign::derive_prefix;
use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreIssueKind {
    /// Not a JSON object.
    Corrupt,
    /// File name does not derive the prefix directory it sits in.
    Misplaced,
    /// Temporary file left behind by an interrupted write.
    StaleTemp,
    /// Could not be read at all.
    Unreadable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreIssue {
    pub path: PathBuf,
    pub kind: StoreIssueKind,
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreCheckReport {
    pub prefixes_checked: usize,
    pub records_checked: usize,
    pub issues: Vec<StoreIssue>,
}

impl StoreCheckReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn push(&mut self, path: PathBuf, kind: StoreIssueKind, detail: impl Into<String>) {
        self.issues.push(StoreIssue {
            path,
            kind,
            detail: detail.into(),
        });
    }
}

pub(super) fn check_store(root: &Path) -> Result<StoreCheckReport, StoreError> {
    let mut report = StoreCheckReport::default();

    for prefix_dir in sorted_entries(root)? {
        if !prefix_dir.is_dir() {
            continue;
        }
        let Some(prefix) = prefix_dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        report.prefixes_checked += 1;

        let entries = match sorted_entries(&prefix_dir) {
            Ok(entries) => entries,
            Err(err) => {
                report.push(prefix_dir.clone(), StoreIssueKind::Unreadable, err.to_string());
                continue;
            }
        };
        for path in entries {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.ends_with(".json.tmp") {
                report.push(path.clone(), StoreIssueKind::StaleTemp, "interrupted write");
                continue;
            }
            let Some(callsign) = name.strip_suffix(".json") else {
                continue;
            };
            report.records_checked += 1;

            if derive_prefix(callsign) != Some(prefix) {
                let detail = match derive_prefix(callsign) {
                    Some(expected) => format!("belongs under '{expected}', found in '{prefix}'"),
                    None => format!("'{callsign}' has no prefix"),
                };
                report.push(path.clone(), StoreIssueKind::Misplaced, detail);
            }

            match read_record(&path) {
                Ok(_) => {}
                Err(StoreError::Corrupt { reason, .. }) => {
                    report.push(path, StoreIssueKind::Corrupt, reason);
                }
                Err(err) => report.push(path, StoreIssueKind::Unreadable, err.to_string()),
            }
        }
    }

    Ok(report)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let read_dir = |err: io::Error| StoreError::io("read directory", dir, err);
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir)? {
        paths.push(entry.map_err(read_dir)?.path());
    }
    paths.sort();
    Ok(paths)
}
