use std::fmt;

use serde::Serialize;

use crate::store::MergeOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidCallsign,
    MalformedRow,
    CorruptRecord,
    Io,
}

impl FailureKind {
    /// Corrupt records and I/O failures mean data was not written where it should have been.
    pub fn is_critical(self) -> bool {
        matches!(self, Self::CorruptRecord | Self::Io)
    }
}

/// A row that was read but not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub line: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,
    pub kind: FailureKind,
    pub message: String,
    /// The raw row, for reprocessing by hand.
    pub row: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub source: String,
    pub input_path: String,
    pub store_root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_list_path: Option<String>,
    pub rows_read: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped_missing: usize,
    pub listed_missing: usize,
    pub already_present: usize,
    pub invalid_callsigns: usize,
    pub malformed_rows: usize,
    pub corrupt_records: usize,
    pub io_failures: usize,
    pub failures: Vec<RowFailure>,
}

impl ImportReport {
    pub fn has_critical_failures(&self) -> bool {
        self.corrupt_records + self.io_failures > 0
    }

    pub(crate) fn count_merge(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::Created => self.created += 1,
            MergeOutcome::Updated => self.updated += 1,
            MergeOutcome::Skipped => self.skipped_missing += 1,
        }
    }

    pub(crate) fn push_failure(&mut self, failure: RowFailure) {
        match failure.kind {
            FailureKind::InvalidCallsign => self.invalid_callsigns += 1,
            FailureKind::MalformedRow => self.malformed_rows += 1,
            FailureKind::CorruptRecord => self.corrupt_records += 1,
            FailureKind::Io => self.io_failures += 1,
        }
        self.failures.push(failure);
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "source={} rows={} created={} updated={} skipped={} listed={} invalid_callsigns={} \
             malformed_rows={} corrupt_records={} io_failures={}",
            self.source,
            self.rows_read,
            self.created,
            self.updated,
            self.skipped_missing,
            self.listed_missing,
            self.invalid_callsigns,
            self.malformed_rows,
            self.corrupt_records,
            self.io_failures
        )
    }
}
