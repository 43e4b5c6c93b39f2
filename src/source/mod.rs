//! Declarative descriptions of import sources.
//!
//! A [`SourceSpec`] says where the callsign lives in a row, which fields to pull out and what
//! to do with them. The built-in FCC and LoTW sources are ordinary specs; more can be loaded
//! from YAML (see [`SourceCatalog`]).

mod builtin;
mod catalog;

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::callsign::Callsign;
use crate::error::{RowError, SourceError};
use crate::store::{CreationPolicy, Record};

pub use builtin::{builtin_sources, AM, EN, LOTW, LOTW_FILE};
pub use catalog::SourceCatalog;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// What a source does with each row whose callsign parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceAction {
    /// Merge the fields, creating the record when it does not exist.
    Create,
    /// Merge the fields into existing records only.
    SkipIfMissing,
    /// Write callsigns without a record to the missing list; never touch JSON.
    ListMissing,
}

impl SourceAction {
    pub fn creation_policy(self) -> Option<CreationPolicy> {
        match self {
            Self::Create => Some(CreationPolicy::Create),
            Self::SkipIfMissing => Some(CreationPolicy::SkipIfMissing),
            Self::ListMissing => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::SkipIfMissing => "skip_if_missing",
            Self::ListMissing => "list_missing",
        }
    }
}

impl fmt::Display for SourceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimestampColumns {
    pub date: usize,
    pub time: usize,
}

/// How one output field gets its value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// The string in this column.
    Column(usize),
    /// The same value for every row.
    Constant(Value),
    /// A date column and a time column joined into an RFC 3339 UTC timestamp.
    Timestamp(TimestampColumns),
}

impl FieldValue {
    pub fn extract(&self, row: &[String]) -> Result<Value, RowError> {
        match self {
            Self::Column(index) => column(row, *index).map(|v| Value::String(v.to_string())),
            Self::Constant(value) => Ok(value.clone()),
            Self::Timestamp(cols) => {
                let date = column(row, cols.date)?;
                let time = column(row, cols.time)?;
                utc_timestamp(date, time).map(Value::String)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawFieldSpec")]
pub struct FieldSpec {
    pub name: String,
    pub value: FieldValue,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFieldSpec {
    name: String,
    #[serde(default)]
    column: Option<usize>,
    #[serde(default)]
    constant: Option<Value>,
    #[serde(default)]
    timestamp: Option<TimestampColumns>,
}

impl TryFrom<RawFieldSpec> for FieldSpec {
    type Error = String;

    fn try_from(raw: RawFieldSpec) -> Result<Self, Self::Error> {
        let value = match (raw.column, raw.constant, raw.timestamp) {
            (Some(index), None, None) => FieldValue::Column(index),
            (None, Some(value), None) => FieldValue::Constant(value),
            (None, None, Some(cols)) => FieldValue::Timestamp(cols),
            _ => {
                return Err(format!(
                    "field '{}' needs exactly one of column, constant or timestamp",
                    raw.name
                ))
            }
        };
        Ok(FieldSpec {
            name: raw.name,
            value,
        })
    }
}

fn default_delimiter() -> char {
    ','
}

fn default_quote() -> char {
    '"'
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Input file used when the caller does not name one.
    pub input: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_quote")]
    pub quote: char,
    pub callsign_column: usize,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    pub action: SourceAction,
    /// Side file for [`SourceAction::ListMissing`]. Without one, the importer writes
    /// `<name>-missing.dat` in the store root.
    #[serde(default)]
    pub missing_list: Option<PathBuf>,
}

impl SourceSpec {
    pub fn validate(&self) -> Result<(), SourceError> {
        let invalid = |reason: String| SourceError::Invalid {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty".to_string()));
        }
        if !self.delimiter.is_ascii() || !self.quote.is_ascii() {
            return Err(invalid("delimiter and quote must be ASCII".to_string()));
        }
        if self.delimiter == self.quote {
            return Err(invalid("delimiter and quote must differ".to_string()));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(invalid("field names must not be empty".to_string()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(invalid(format!("duplicate field '{}'", field.name)));
            }
        }

        match self.action {
            SourceAction::Create | SourceAction::SkipIfMissing if self.fields.is_empty() => {
                Err(invalid(format!("action '{}' needs at least one field", self.action)))
            }
            SourceAction::ListMissing if !self.fields.is_empty() => {
                Err(invalid("action 'list_missing' takes no fields".to_string()))
            }
            _ => Ok(()),
        }
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    pub fn quote_byte(&self) -> u8 {
        self.quote as u8
    }

    /// The raw callsign token of `row`.
    pub fn callsign<'r>(&self, row: &'r [String]) -> Result<&'r str, RowError> {
        column(row, self.callsign_column)
    }

    /// The field mapping this row contributes, in spec order.
    ///
    /// A field reading the callsign column gets `callsign` rather than the raw cell.
    pub fn extract_fields(&self, row: &[String], callsign: &Callsign) -> Result<Record, RowError> {
        let mut record = Record::new();
        for field in &self.fields {
            let value = match field.value {
                FieldValue::Column(index) if index == self.callsign_column => {
                    Value::String(callsign.as_str().to_string())
                }
                _ => field.value.extract(row)?,
            };
            record.insert(field.name.clone(), value);
        }
        Ok(record)
    }
}

fn column(row: &[String], index: usize) -> Result<&str, RowError> {
    row.get(index)
        .map(String::as_str)
        .ok_or(RowError::MissingColumn {
            column: index,
            len: row.len(),
        })
}

/// Joins `date` (`YYYY-MM-DD`) and `time` (`HH:MM:SS`) into `YYYY-MM-DDTHH:MM:SSZ`.
pub fn utc_timestamp(date: &str, time: &str) -> Result<String, RowError> {
    let invalid = |reason: String| RowError::InvalidTimestamp {
        date: date.to_string(),
        time: time.to_string(),
        reason,
    };
    let day =
        NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).map_err(|e| invalid(e.to_string()))?;
    let clock =
        NaiveTime::parse_from_str(time.trim(), TIME_FORMAT).map_err(|e| invalid(e.to_string()))?;
    Ok(NaiveDateTime::new(day, clock)
        .and_utc()
        .to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn timestamp_joins_date_and_time() {
        assert_eq!(
            utc_timestamp("2024-01-01", "12:00:00").unwrap(),
            "2024-01-01T12:00:00Z"
        );
    }

    #[test]
    fn timestamp_rejects_garbage() {
        let err = utc_timestamp("2024-13-01", "12:00:00").unwrap_err();
        assert!(matches!(err, RowError::InvalidTimestamp { .. }));
        assert!(utc_timestamp("2024-01-01", "noon").is_err());
    }

    #[test]
    fn extracts_fields_in_order() {
        let spec = builtin::lotw();
        let call = Callsign::parse("W1AW").unwrap();
        let record = spec
            .extract_fields(&row(&["W1AW", "2024-01-01", "12:00:00"]), &call)
            .unwrap();
        assert_eq!(
            Value::Object(record),
            json!({"lotw": true, "last_lotw_upload": "2024-01-01T12:00:00Z"})
        );
    }

    #[test]
    fn missing_column_is_a_row_error() {
        let spec = builtin::am();
        let short = row(&["AM", "1", "", "", "W1AW"]);
        assert_eq!(spec.callsign(&short).unwrap(), "W1AW");
        let call = Callsign::parse("W1AW").unwrap();
        assert_eq!(
            spec.extract_fields(&short, &call).unwrap_err(),
            RowError::MissingColumn { column: 5, len: 5 }
        );
    }

    #[test]
    fn callsign_column_stores_the_parsed_callsign() {
        let spec = builtin::en();
        let padded: Vec<String> = "EN|1||| W1AW |L|1|ARRL INC||||||||MAIN ST|NEWINGTON|CT|06111"
            .split('|')
            .map(str::to_string)
            .collect();
        let call = Callsign::parse(spec.callsign(&padded).unwrap()).unwrap();

        let record = spec.extract_fields(&padded, &call).unwrap();

        assert_eq!(record["call"], "W1AW");
        assert_eq!(record["op"], "ARRL INC");
    }

    #[test]
    fn builtins_validate() {
        for spec in builtin_sources() {
            spec.validate().unwrap();
        }
    }

    #[test]
    fn validate_rejects_inconsistent_specs() {
        let mut spec = builtin::am();
        spec.fields.push(FieldSpec::new("class", FieldValue::Column(6)));
        assert!(matches!(spec.validate(), Err(SourceError::Invalid { .. })));

        let mut spec = builtin::am();
        spec.fields.clear();
        assert!(spec.validate().is_err());

        let mut spec = builtin::lotw_file();
        spec.missing_list = None;
        spec.validate().unwrap();
        spec.fields.push(FieldSpec::new("lotw", FieldValue::Constant(Value::Bool(true))));
        assert!(spec.validate().is_err());

        let mut spec = builtin::en();
        spec.delimiter = '"';
        assert!(spec.validate().is_err());
    }
}
