//! Callsign parsing and prefix derivation.
//!
//! The prefix (leading non-digits plus the first digit) buckets records into subdirectories
//! of the store, so every import must derive it the same way for a callsign to land on the
//! same file.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::CallsignError;

fn prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\D+\d").expect("prefix pattern is valid"))
}

/// Returns the leading non-digit run of `callsign` plus the digit that follows it, or `None`
/// when the callsign starts with a digit or contains no digit at all. Digits are Unicode
/// decimal digits (`\d`), not only `0-9`.
///
/// ```
/// use callbook::derive_prefix;
///
/// assert_eq!(derive_prefix("KD2ABC"), Some("KD2"));
/// assert_eq!(derive_prefix("123XYZ"), None);
/// ```
pub fn derive_prefix(callsign: &str) -> Option<&str> {
    prefix_pattern().find(callsign).map(|m| m.as_str())
}

/// A callsign that has a prefix and is safe to use as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Callsign {
    value: String,
    prefix_len: usize,
}

impl Callsign {
    /// Trims `raw` and checks it can key a record file.
    pub fn parse(raw: &str) -> Result<Self, CallsignError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(CallsignError::Empty);
        }
        let prefix_len = derive_prefix(value)
            .map(str::len)
            .ok_or_else(|| CallsignError::NoPrefix(value.to_string()))?;
        if value.contains(['/', '\\', '\0']) {
            return Err(CallsignError::UnsafePath(value.to_string()));
        }
        Ok(Self {
            value: value.to_string(),
            prefix_len,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn prefix(&self) -> &str {
        &self.value[..self.prefix_len]
    }
}

impl fmt::Display for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_prefix_up_to_first_digit() {
        assert_eq!(derive_prefix("KD2ABC"), Some("KD2"));
        assert_eq!(derive_prefix("W1AW"), Some("W1"));
        assert_eq!(derive_prefix("VE3XYZ"), Some("VE3"));
        assert_eq!(derive_prefix("KH6A1B"), Some("KH6"));
    }

    #[test]
    fn takes_only_one_digit() {
        assert_eq!(derive_prefix("K22AB"), Some("K2"));
    }

    #[test]
    fn rejects_leading_digit_and_digitless_callsigns() {
        assert_eq!(derive_prefix("123XYZ"), None);
        assert_eq!(derive_prefix("4X4AA"), None);
        assert_eq!(derive_prefix("ABCDEF"), None);
        assert_eq!(derive_prefix(""), None);
    }

    #[test]
    fn parse_trims_and_exposes_prefix() {
        let call = Callsign::parse("  KD2ABC ").unwrap();
        assert_eq!(call.as_str(), "KD2ABC");
        assert_eq!(call.prefix(), "KD2");
        assert_eq!(call.to_string(), "KD2ABC");
    }

    #[test]
    fn parse_reports_each_failure_kind() {
        assert_eq!(Callsign::parse("   "), Err(CallsignError::Empty));
        assert_eq!(
            Callsign::parse("123XYZ"),
            Err(CallsignError::NoPrefix("123XYZ".to_string()))
        );
        assert_eq!(
            Callsign::parse("W1AW/P"),
            Err(CallsignError::UnsafePath("W1AW/P".to_string()))
        );
        assert_eq!(
            Callsign::parse("..\\W1AW"),
            Err(CallsignError::UnsafePath("..\\W1AW".to_string()))
        );
    }

    #[test]
    fn prefix_is_deterministic() {
        let first = Callsign::parse("N0CALL").unwrap();
        let second = Callsign::parse("N0CALL").unwrap();
        assert_eq!(first.prefix(), second.prefix());
        assert_eq!(first, second);
    }
}
