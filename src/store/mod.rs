//! The record store: one JSON object per callsign at `<root>/<prefix>/<callsign>.json`.
//!
//! Records are only ever merged into, never replaced wholesale. A record that fails to parse
//! is reported and left untouched so accumulated fields are not lost.

mod check;
mod paths;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::callsign::Callsign;
use crate::error::StoreError;

pub use check::{StoreCheckReport, StoreIssue, StoreIssueKind};
pub use paths::{record_dir, record_path};

pub type Record = Map<String, Value>;

/// What to do when the target record does not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationPolicy {
    Create,
    SkipIfMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
    Created,
    Updated,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, callsign: &Callsign) -> PathBuf {
        record_path(&self.root, callsign.prefix(), callsign.as_str())
    }

    pub fn contains(&self, callsign: &Callsign) -> bool {
        self.record_path(callsign).is_file()
    }

    /// Reads the record for `callsign`. `Ok(None)` when there is no record file.
    pub fn read(&self, callsign: &Callsign) -> Result<Option<Record>, StoreError> {
        read_record(&self.record_path(callsign))
    }

    pub fn merge(
        &self,
        callsign: &Callsign,
        fields: &Record,
        policy: CreationPolicy,
    ) -> Result<MergeOutcome, StoreError> {
        merge_record(&self.record_path(callsign), fields, policy)
    }

    pub fn check(&self) -> Result<StoreCheckReport, StoreError> {
        check::check_store(&self.root)
    }
}

/// Overlays `fields` onto the record at `path` (later keys win).
///
/// A missing record is created with exactly `fields` under [`CreationPolicy::Create`] and
/// left alone under [`CreationPolicy::SkipIfMissing`]. Existing records are rewritten through
/// a temporary file and a rename, so the target holds either the old or the new content.
pub fn merge_record(
    path: &Path,
    fields: &Record,
    policy: CreationPolicy,
) -> Result<MergeOutcome, StoreError> {
    match (read_record(path)?, policy) {
        (None, CreationPolicy::SkipIfMissing) => {
            debug!("no record at {}, skipping", path.display());
            Ok(MergeOutcome::Skipped)
        }
        (None, CreationPolicy::Create) => {
            if let Some(parent) = path.parent() {
                ensure_dir(parent)?;
            }
            write_json_atomic(path, fields)?;
            debug!("created {}", path.display());
            Ok(MergeOutcome::Created)
        }
        (Some(mut record), _) => {
            for (key, value) in fields {
                record.insert(key.clone(), value.clone());
            }
            write_json_atomic(path, &record)?;
            debug!("updated {}", path.display());
            Ok(MergeOutcome::Updated)
        }
    }
}

pub(crate) fn read_record(path: &Path) -> Result<Option<Record>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) if err.kind() == io::ErrorKind::InvalidData => {
            return Err(StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })
        }
        Err(err) => return Err(StoreError::io("read", path, err)),
    };
    parse_record(path, &raw).map(Some)
}

pub(crate) fn parse_record(path: &Path, raw: &str) -> Result<Record, StoreError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(_) => Err(StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: "expected a JSON object".to_string(),
        }),
        Err(err) => Err(StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }),
    }
}

pub(crate) fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(path).map_err(|err| StoreError::io("create directory", path, err))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_vec(value).map_err(|err| {
        StoreError::io("serialize", path, io::Error::new(io::ErrorKind::InvalidData, err))
    })?;
    let tmp = temp_path(path);
    fs::write(&tmp, json).map_err(|err| StoreError::io("write", &tmp, err))?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::io("replace", path, err));
    }
    Ok(())
}
