//! Named source specs: the built-ins plus any loaded from a YAML sources file.
//!
//! ```yaml
//! sources:
//!   - name: hd
//!     input: HD.dat
//!     delimiter: "|"
//!     callsign_column: 4
//!     action: skip_if_missing
//!     fields:
//!       - { name: license_status, column: 5 }
//!       - { name: fcc, constant: true }
//! ```

use std::fs;
use std::path::Path;

use log::info;
use serde::Deserialize;

use super::{builtin_sources, SourceSpec};
use crate::error::SourceError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SourcesFile {
    sources: Vec<SourceSpec>,
}

#[derive(Debug, Clone)]
pub struct SourceCatalog {
    sources: Vec<SourceSpec>,
}

impl Default for SourceCatalog {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl SourceCatalog {
    pub fn with_builtins() -> Self {
        Self {
            sources: builtin_sources(),
        }
    }

    /// Adds the sources from a YAML file. A source with the name of an existing one replaces it.
    pub fn load_file(&mut self, path: &Path) -> Result<usize, SourceError> {
        let raw = fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let count = self.load(&raw, path)?;
        info!("loaded {count} source(s) from {}", path.display());
        Ok(count)
    }

    pub fn load_str(&mut self, yaml: &str) -> Result<usize, SourceError> {
        self.load(yaml, Path::new("<inline>"))
    }

    fn load(&mut self, yaml: &str, origin: &Path) -> Result<usize, SourceError> {
        let file: SourcesFile = serde_yaml::from_str(yaml).map_err(|source| SourceError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        for spec in &file.sources {
            spec.validate()?;
        }
        let count = file.sources.len();
        for spec in file.sources {
            self.insert(spec);
        }
        Ok(count)
    }

    pub fn insert(&mut self, spec: SourceSpec) {
        match self.sources.iter_mut().find(|s| s.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.sources.push(spec),
        }
    }

    pub fn get(&self, name: &str) -> Result<&SourceSpec, SourceError> {
        self.sources
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| SourceError::Unknown(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceSpec> {
        self.sources.iter()
    }
}
