//! Runs a source spec over a delimited input file, one row at a time.
//!
//! Problems with a single row (bad callsign, short row, corrupt record, failed write) are
//! logged, recorded in the [`ImportReport`] and the run moves on. Only failing to read the
//! input or to write the missing-callsign list stops a run.

mod report;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::callsign::Callsign;
use crate::error::{ImportError, RowError, StoreError};
use crate::source::{SourceAction, SourceSpec};
use crate::store::{MergeOutcome, RecordStore};

pub use report::{FailureKind, ImportReport, RowFailure};

pub struct Importer<'a> {
    store: &'a RecordStore,
    spec: &'a SourceSpec,
    missing_list: Option<PathBuf>,
}

enum Applied {
    Merged(MergeOutcome),
    Listed,
    Present,
}

impl<'a> Importer<'a> {
    pub fn new(store: &'a RecordStore, spec: &'a SourceSpec) -> Self {
        Self {
            store,
            spec,
            missing_list: spec.missing_list.clone(),
        }
    }

    /// Writes missing callsigns to `path` instead of the spec's own list (or the
    /// `<name>-missing.dat` default when the spec has none).
    pub fn with_missing_list(mut self, path: impl Into<PathBuf>) -> Self {
        self.missing_list = Some(path.into());
        self
    }

    pub fn run_path(&self, input: &Path) -> Result<ImportReport, ImportError> {
        let file = File::open(input).map_err(|source| ImportError::OpenInput {
            path: input.to_path_buf(),
            source,
        })?;
        info!(
            "importing '{}' from {} into {}",
            self.spec.name,
            input.display(),
            self.store.root().display()
        );
        let mut report = self.run_reader(file)?;
        report.input_path = input.display().to_string();
        Ok(report)
    }

    pub fn run_reader<R: io::Read>(&self, input: R) -> Result<ImportReport, ImportError> {
        self.spec.validate()?;
        let mut report = ImportReport {
            source: self.spec.name.clone(),
            store_root: self.store.root().display().to_string(),
            ..ImportReport::default()
        };

        let mut missing = match self.spec.action {
            SourceAction::ListMissing => Some(self.open_missing_list(&mut report)?),
            _ => None,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.spec.delimiter_byte())
            .quote(self.spec.quote_byte())
            .from_reader(input);
        let mut record = csv::ByteRecord::new();

        loop {
            match reader.read_byte_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) if matches!(err.kind(), csv::ErrorKind::Io(_)) => {
                    return Err(ImportError::Read(err));
                }
                Err(err) => {
                    report.rows_read += 1;
                    let line = err.position().map_or(report.rows_read as u64, |p| p.line());
                    let message = RowError::Undecodable(err.to_string()).to_string();
                    warn!("line {line}: {message}");
                    report.push_failure(RowFailure {
                        line,
                        callsign: None,
                        kind: FailureKind::MalformedRow,
                        message,
                        row: Vec::new(),
                    });
                    continue;
                }
            }
            report.rows_read += 1;
            let line = record
                .position()
                .map_or(report.rows_read as u64, |p| p.line());
            let row: Vec<String> = record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect();

            match self.apply_row(&row, missing.as_mut()) {
                Ok(Applied::Merged(outcome)) => report.count_merge(outcome),
                Ok(Applied::Listed) => report.listed_missing += 1,
                Ok(Applied::Present) => report.already_present += 1,
                Err(RowRejection::Fatal(err)) => return Err(err),
                Err(RowRejection::Row {
                    callsign,
                    kind,
                    message,
                }) => {
                    let context = callsign.as_deref().unwrap_or("?");
                    if kind.is_critical() {
                        error!("line {line} ({context}): {message}");
                    } else {
                        warn!("line {line} ({context}): {message}");
                    }
                    report.push_failure(RowFailure {
                        line,
                        callsign,
                        kind,
                        message,
                        row,
                    });
                }
            }
        }

        if let Some(writer) = missing.as_mut() {
            writer.flush().map_err(|err| self.missing_list_error(err))?;
        }

        info!("import '{}' finished: {report}", self.spec.name);
        Ok(report)
    }

    fn apply_row(
        &self,
        row: &[String],
        missing: Option<&mut BufWriter<File>>,
    ) -> Result<Applied, RowRejection> {
        let raw = self.spec.callsign(row).map_err(|err| RowRejection::Row {
            callsign: None,
            kind: FailureKind::MalformedRow,
            message: err.to_string(),
        })?;
        let callsign = Callsign::parse(raw).map_err(|err| RowRejection::Row {
            callsign: Some(raw.to_string()),
            kind: FailureKind::InvalidCallsign,
            message: err.to_string(),
        })?;

        let Some(policy) = self.spec.action.creation_policy() else {
            if self.store.contains(&callsign) {
                return Ok(Applied::Present);
            }
            if let Some(writer) = missing {
                writeln!(writer, "{callsign}")
                    .map_err(|err| RowRejection::Fatal(self.missing_list_error(err)))?;
            }
            debug!("{callsign} has no record, listed");
            return Ok(Applied::Listed);
        };

        let fields = self
            .spec
            .extract_fields(row, &callsign)
            .map_err(|err| RowRejection::Row {
                callsign: Some(callsign.to_string()),
                kind: FailureKind::MalformedRow,
                message: err.to_string(),
            })?;

        self.store
            .merge(&callsign, &fields, policy)
            .map(Applied::Merged)
            .map_err(|err| RowRejection::Row {
                callsign: Some(callsign.to_string()),
                kind: match err {
                    StoreError::Corrupt { .. } => FailureKind::CorruptRecord,
                    StoreError::Io { .. } => FailureKind::Io,
                },
                message: err.to_string(),
            })
    }

    fn open_missing_list(&self, report: &mut ImportReport) -> Result<BufWriter<File>, ImportError> {
        let path = self.missing_list_path();
        report.missing_list_path = Some(path.display().to_string());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| self.missing_list_error(err))?;
        }
        File::create(&path)
            .map(BufWriter::new)
            .map_err(|err| self.missing_list_error(err))
    }

    fn missing_list_path(&self) -> PathBuf {
        self.missing_list
            .clone()
            .unwrap_or_else(|| self.store.root().join(format!("{}-missing.dat", self.spec.name)))
    }

    fn missing_list_error(&self, source: io::Error) -> ImportError {
        ImportError::MissingList {
            path: self.missing_list_path(),
            source,
        }
    }
}

enum RowRejection {
    Row {
        callsign: Option<String>,
        kind: FailureKind,
        message: String,
    },
    Fatal(ImportError),
}
