//! The FCC ULS and LoTW sources the store is normally built from.
//!
//! Column indexes are zero-based positions in the FCC `EN.dat`/`AM.dat` pipe-delimited
//! exports and in the LoTW `lotw-user-activity.csv` list (`call,date,time`).

use serde_json::Value;

use super::{FieldSpec, FieldValue, SourceAction, SourceSpec, TimestampColumns};

pub const EN: &str = "en";
pub const AM: &str = "am";
pub const LOTW: &str = "lotw";
pub const LOTW_FILE: &str = "lotw-file";

const LOTW_ACTIVITY: &str = "lotw-user-activity.csv";

pub fn builtin_sources() -> Vec<SourceSpec> {
    vec![en(), am(), lotw(), lotw_file()]
}

/// Entity records: name and address. Creates records.
pub(crate) fn en() -> SourceSpec {
    SourceSpec {
        name: EN.to_string(),
        description: Some("FCC ULS entity data (operator and address)".to_string()),
        input: "EN.dat".into(),
        delimiter: '|',
        quote: '"',
        callsign_column: 4,
        fields: vec![
            FieldSpec::new("call", FieldValue::Column(4)),
            FieldSpec::new("op", FieldValue::Column(7)),
            FieldSpec::new("address", FieldValue::Column(15)),
            FieldSpec::new("qth", FieldValue::Column(16)),
            FieldSpec::new("state", FieldValue::Column(17)),
            FieldSpec::new("zip", FieldValue::Column(18)),
        ],
        action: SourceAction::Create,
        missing_list: None,
    }
}

/// Amateur records: operator class.
pub(crate) fn am() -> SourceSpec {
    SourceSpec {
        name: AM.to_string(),
        description: Some("FCC ULS amateur data (operator class)".to_string()),
        input: "AM.dat".into(),
        delimiter: '|',
        quote: '"',
        callsign_column: 4,
        fields: vec![FieldSpec::new("class", FieldValue::Column(5))],
        action: SourceAction::SkipIfMissing,
        missing_list: None,
    }
}

pub(crate) fn lotw() -> SourceSpec {
    SourceSpec {
        name: LOTW.to_string(),
        description: Some("LoTW user activity (last upload)".to_string()),
        input: LOTW_ACTIVITY.into(),
        delimiter: ',',
        quote: '"',
        callsign_column: 0,
        fields: vec![
            FieldSpec::new("lotw", FieldValue::Constant(Value::Bool(true))),
            FieldSpec::new(
                "last_lotw_upload",
                FieldValue::Timestamp(TimestampColumns { date: 1, time: 2 }),
            ),
        ],
        action: SourceAction::SkipIfMissing,
        missing_list: None,
    }
}

/// LoTW users without a record, for callsigns the FCC data does not cover.
pub(crate) fn lotw_file() -> SourceSpec {
    SourceSpec {
        name: LOTW_FILE.to_string(),
        description: Some("LoTW users missing from the store".to_string()),
        input: LOTW_ACTIVITY.into(),
        delimiter: ',',
        quote: '"',
        callsign_column: 0,
        fields: Vec::new(),
        action: SourceAction::ListMissing,
        missing_list: Some("lotw-users.dat".into()),
    }
}
