//! Runtime value types for field comparison.
//!
//! The [`Value`] enum is what a [`Record`](crate::Record) hands back for a
//! field name. Filters, the search scorer and the sort comparator all work on
//! these values and never on the record itself.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Runtime value of a record field, borrowed from the record.
///
/// # Example
///
/// ```
/// use sift::{Number, Record, Value};
///
/// struct Product {
///     name: String,
///     price: u32,
/// }
///
/// impl Record for Product {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "name" => Value::String(&self.name),
///             "price" => Value::Number(Number::from(self.price)),
///             _ => Value::None,
///         }
///     }
///
///     fn field_names(&self) -> Vec<&str> {
///         vec!["name", "price"]
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// String value (borrowed).
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Point in time, milliseconds since the Unix epoch.
    Timestamp(Timestamp),
    /// Boolean value.
    Bool(bool),
    /// Field not present, null, or not queryable.
    None,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `None` value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns `true` if this is a `String` value.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Normalizes this value to a point in time.
    ///
    /// Timestamps pass through, RFC 3339 / ISO date strings are parsed and
    /// integral numbers are read as epoch milliseconds. Anything else is not
    /// a date.
    pub fn to_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            Value::String(s) => Timestamp::parse(s),
            Value::Number(Number::I64(n)) => Some(Timestamp(*n)),
            Value::Number(Number::U64(n)) => i64::try_from(*n).ok().map(Timestamp),
            _ => None,
        }
    }

    /// Name of the value's type, used in skip reasons.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Timestamp(_) => "timestamp",
            Value::Bool(_) => "bool",
            Value::None => "none",
        }
    }

    /// Stable textual form used to anchor cursor tokens.
    ///
    /// Returns `None` for missing values.
    pub fn key_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some((*s).to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Timestamp(t) => Some(t.as_millis().to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::None => None,
        }
    }
}

/// Numeric value supporting all common numeric types.
///
/// Stored in one of three variants to preserve precision. Comparisons
/// between different variants go through `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    ///
    /// Returns `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::I64(a), Number::U64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            (Number::U64(a), Number::I64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    /// Total ordering used when sorting: NaN sorts after every other number.
    pub fn total_cmp(self, other: Number) -> Ordering {
        match self.compare(other) {
            Some(ordering) => ordering,
            None => self.to_f64().is_nan().cmp(&other.to_f64().is_nan()),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) => write!(f, "{}", n),
        }
    }
}

macro_rules! number_from {
    ($variant:ident, $target:ty => $($src:ty),+) => {
        $(
            impl From<$src> for Number {
                fn from(n: $src) -> Self {
                    Number::$variant(n as $target)
                }
            }
        )+
    };
}

number_from!(I64, i64 => i8, i16, i32, i64, isize);
number_from!(U64, u64 => u8, u16, u32, u64, usize);
number_from!(F64, f64 => f32, f64);

/// Point in time as milliseconds since the Unix epoch.
///
/// Dates are always compared in this normalized form, never as strings.
/// Serializes as an integer; deserializes from either an integer or an
/// RFC 3339 string.
///
/// ```
/// use sift::Timestamp;
///
/// let ts = Timestamp::parse("2024-01-29T03:46:40Z").unwrap();
/// assert_eq!(ts, Timestamp(1_706_500_000_000));
/// assert!(Timestamp(1000) < Timestamp(2000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a new timestamp from seconds since Unix epoch.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs.saturating_mul(1000))
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Parses an RFC 3339 date-time, a naive `YYYY-MM-DDTHH:MM:SS` date-time
    /// (read as UTC) or a plain `YYYY-MM-DD` date (midnight UTC).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Timestamp(dt.timestamp_millis()));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(Timestamp(naive.and_utc().timestamp_millis()));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Timestamp(naive.and_utc().timestamp_millis()))
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Timestamp(millis)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Millis(i64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Millis(ms) => Ok(Timestamp(ms)),
            Repr::Text(text) => Timestamp::parse(&text).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid date-time '{}'", text))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_extractors() {
        assert_eq!(Value::String("hello").as_str(), Some("hello"));
        assert_eq!(
            Value::Number(Number::I64(42)).as_number(),
            Some(Number::I64(42))
        );
        assert_eq!(Value::Bool(true).as_bool(), Some(true));

        // Wrong type returns None
        assert_eq!(Value::String("test").as_number(), None);
        assert_eq!(Value::Number(Number::I64(1)).as_str(), None);
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(
            Number::I64(5).compare(Number::U64(10)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(-1).compare(Number::U64(u64::MAX)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(5).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Number::U64(10).compare(Number::F64(5.5)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn number_nan() {
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
        assert_eq!(
            Number::F64(f64::NAN).total_cmp(Number::F64(1.0)),
            Ordering::Greater
        );
        assert_eq!(
            Number::I64(3).total_cmp(Number::F64(f64::NAN)),
            Ordering::Less
        );
    }

    #[test]
    fn number_serde_untagged() {
        let n: Number = serde_json::from_str("42").unwrap();
        assert_eq!(n, Number::I64(42));
        let n: Number = serde_json::from_str("4.5").unwrap();
        assert_eq!(n, Number::F64(4.5));
        assert_eq!(serde_json::to_string(&Number::U64(7)).unwrap(), "7");
    }

    #[test]
    fn timestamp_parse_formats() {
        assert_eq!(Timestamp::parse("1970-01-01T00:00:01Z"), Some(Timestamp(1000)));
        assert_eq!(
            Timestamp::parse("1970-01-01T01:00:00+01:00"),
            Some(Timestamp(0))
        );
        assert_eq!(Timestamp::parse("1970-01-02"), Some(Timestamp(86_400_000)));
        assert_eq!(
            Timestamp::parse("1970-01-01T00:00:02.5"),
            Some(Timestamp(2500))
        );
        assert_eq!(Timestamp::parse("yesterday"), None);
    }

    #[test]
    fn timestamp_from_secs_saturates() {
        assert_eq!(Timestamp::from_secs(2), Timestamp(2000));
        assert_eq!(Timestamp::from_secs(-3).as_millis(), -3000);
        assert_eq!(Timestamp::from_secs(i64::MAX), Timestamp(i64::MAX));
        assert_eq!(Timestamp::from_secs(i64::MIN), Timestamp(i64::MIN));
    }

    #[test]
    fn timestamp_deserializes_from_int_or_string() {
        let ts: Timestamp = serde_json::from_str("1500").unwrap();
        assert_eq!(ts, Timestamp(1500));
        let ts: Timestamp = serde_json::from_str("\"1970-01-01T00:00:03Z\"").unwrap();
        assert_eq!(ts, Timestamp(3000));
        assert!(serde_json::from_str::<Timestamp>("\"not a date\"").is_err());
    }

    #[test]
    fn value_normalizes_to_timestamp() {
        assert_eq!(
            Value::String("1970-01-01T00:00:01Z").to_timestamp(),
            Some(Timestamp(1000))
        );
        assert_eq!(Value::Number(Number::I64(5)).to_timestamp(), Some(Timestamp(5)));
        assert_eq!(Value::Number(Number::F64(5.0)).to_timestamp(), None);
        assert_eq!(Value::Bool(true).to_timestamp(), None);
    }

    #[test]
    fn key_string_forms() {
        assert_eq!(Value::String("a-1").key_string().as_deref(), Some("a-1"));
        assert_eq!(
            Value::Number(Number::U64(9)).key_string().as_deref(),
            Some("9")
        );
        assert_eq!(Value::None.key_string(), None);
    }
}
