//! Builds a tree of per-callsign JSON records from FCC ULS and LoTW data files.
//!
//! Each [`source::SourceSpec`] describes one delimited input: where the callsign is, which
//! columns become which fields and whether missing records are created. The
//! [`import::Importer`] runs a spec row by row against a [`store::RecordStore`].

pub mod callsign;
pub mod cli;
pub mod config;
pub mod error;
pub mod import;
pub mod source;
pub mod store;

pub use callsign::{derive_prefix, Callsign};
pub use config::Config;
pub use error::{CallsignError, ImportError, RowError, SourceError, StoreError};
pub use import::{FailureKind, ImportReport, Importer, RowFailure};
pub use source::{FieldSpec, FieldValue, SourceAction, SourceCatalog, SourceSpec};
pub use store::{merge_record, CreationPolicy, MergeOutcome, Record, RecordStore};
