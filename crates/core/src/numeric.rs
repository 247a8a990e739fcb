//! Locale-tolerant numeric parsing.
//!
//! Legacy movement documents carry quantities typed by operators under a
//! comma-decimal locale, sometimes serialized as strings, sometimes as
//! numbers. Parsing must never fail a whole projection over one bad record.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Parse a decimal that may use `,` or `.` as the separator.
///
/// Unparseable input yields `0.0` rather than an error: a single malformed
/// legacy record must not block a balance computation.
pub fn parse_lenient_decimal(raw: &str) -> f64 {
    raw.trim().replace(',', ".").parse::<f64>().unwrap_or(0.0)
}

/// A quantity as stored on a movement document.
///
/// Deserializes from a JSON number, a `","`- or `"."`-separated string, or
/// anything else (coerced to zero). Serializes as a plain number.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LenientQuantity(f64);

impl LenientQuantity {
    pub fn new(value: f64) -> Self {
        Self(if value.is_finite() { value } else { 0.0 })
    }

    /// Parse operator input (`"10,5"`, `"10.5"`, `"  7 "` ...).
    pub fn parse(raw: &str) -> Self {
        Self(parse_lenient_decimal(raw))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl Default for LenientQuantity {
    fn default() -> Self {
        Self(0.0)
    }
}

impl From<f64> for LenientQuantity {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for LenientQuantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(f64),
            Text(String),
            Other(IgnoredAny),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Num(v)) if v.is_finite() => Self(v),
            Some(Raw::Text(s)) => Self(parse_lenient_decimal(&s)),
            _ => Self(0.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_and_dot_separators_parse_identically() {
        assert_eq!(parse_lenient_decimal("10,5"), 10.5);
        assert_eq!(parse_lenient_decimal("10.5"), 10.5);
        assert_eq!(parse_lenient_decimal(" 7 "), 7.0);
    }

    #[test]
    fn unparseable_input_is_zero() {
        assert_eq!(parse_lenient_decimal(""), 0.0);
        assert_eq!(parse_lenient_decimal("abc"), 0.0);
        assert_eq!(parse_lenient_decimal("1.234,56"), 0.0); // thousands separators stay junk
    }

    #[test]
    fn deserializes_from_number_string_or_junk() {
        let q: LenientQuantity = serde_json::from_str("12.5").unwrap();
        assert_eq!(q.value(), 12.5);

        let q: LenientQuantity = serde_json::from_str("\"12,5\"").unwrap();
        assert_eq!(q.value(), 12.5);

        let q: LenientQuantity = serde_json::from_str("\"n/a\"").unwrap();
        assert_eq!(q.value(), 0.0);

        let q: LenientQuantity = serde_json::from_str("null").unwrap();
        assert_eq!(q.value(), 0.0);

        let q: LenientQuantity = serde_json::from_str("true").unwrap();
        assert_eq!(q.value(), 0.0);
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&LenientQuantity::new(3.25)).unwrap();
        assert_eq!(json, "3.25");
    }
}
