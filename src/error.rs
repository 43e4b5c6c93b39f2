//! Error taxonomy for callsign parsing, row extraction, the record store and import runs.
//!
//! Row-level errors ([`CallsignError`], [`RowError`], [`StoreError`]) are collected into the
//! import report and never abort a run. [`ImportError`] is fatal for the run it occurs in.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A callsign token that cannot be turned into a record path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallsignError {
    #[error("empty callsign")]
    Empty,
    #[error("unable to parse callsign '{0}': expected non-digits followed by a digit")]
    NoPrefix(String),
    #[error("callsign '{0}' contains a path separator")]
    UnsafePath(String),
}

/// A source row that does not carry what its source spec expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("column {column} missing (row has {len} column(s))")]
    MissingColumn { column: usize, len: usize },
    #[error("invalid timestamp '{date}' '{time}': {reason}")]
    InvalidTimestamp {
        date: String,
        time: String,
        reason: String,
    },
    #[error("undecodable row: {0}")]
    Undecodable(String),
}

/// Failure to read, parse or write a single record file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("corrupt record {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

/// Fatal errors that stop an import run.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to open input {}: {source}", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write missing-callsign list {}: {source}", .path.display())]
    MissingList {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read input: {0}")]
    Read(#[source] csv::Error),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Errors from loading or resolving source specs.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read sources file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse sources file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid source '{name}': {reason}")]
    Invalid { name: String, reason: String },
    #[error("unknown source '{0}'")]
    Unknown(String),
}
