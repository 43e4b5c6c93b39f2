//! Run configuration shared by every command.
//!
//! Values come from the command line, then the environment, then the defaults below.

use std::path::PathBuf;

use clap::Args;

use crate::error::SourceError;
use crate::source::SourceCatalog;
use crate::store::RecordStore;

pub const DEFAULT_OUT_DIR: &str = "out";
pub const OUT_DIR_ENV: &str = "CALLBOOK_OUT_DIR";
pub const SOURCES_ENV: &str = "CALLBOOK_SOURCES";

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct Config {
    /// Root directory of the record store.
    #[arg(
        long = "out",
        global = true,
        env = OUT_DIR_ENV,
        default_value = DEFAULT_OUT_DIR,
        value_name = "DIR"
    )]
    pub out_dir: PathBuf,

    /// YAML file with additional source definitions.
    #[arg(long = "sources", global = true, env = SOURCES_ENV, value_name = "FILE")]
    pub sources_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            sources_file: None,
        }
    }
}

impl Config {
    pub fn store(&self) -> RecordStore {
        RecordStore::new(&self.out_dir)
    }

    /// Built-in sources, extended by the sources file when one is configured.
    pub fn catalog(&self) -> Result<SourceCatalog, SourceError> {
        let mut catalog = SourceCatalog::with_builtins();
        if let Some(path) = &self.sources_file {
            catalog.load_file(path)?;
        }
        Ok(catalog)
    }
}
