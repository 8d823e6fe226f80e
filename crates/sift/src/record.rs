//! The record capability contract.
//!
//! The engine knows nothing about entity shapes. Anything that can answer
//! "what is the value of field X" and "which fields do you have" implements
//! [`Record`] and can be listed. Structs usually get the implementation from
//! `#[derive(Record)]` in `sift-macros`.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, NaiveDateTime, TimeZone};

use crate::value::{Number, Timestamp, Value};

/// Named-field access for the query engine.
///
/// # Derive Usage
///
/// ```ignore
/// use sift_macros::Record;
///
/// #[derive(Record)]
/// struct Product {
///     #[record(string)]
///     name: String,
///     #[record(number)]
///     price: u32,
///     #[record(bool)]
///     active: bool,
/// }
///
/// assert_eq!(Product::PRICE, "price");
/// ```
///
/// # Manual Implementation
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
pub trait Record {
    /// Returns the value of a field, or [`Value::None`] if the record has no
    /// such field (or it is null).
    fn field_value(&self, field: &str) -> Value<'_>;

    /// Names of the fields this record exposes, in a stable order.
    ///
    /// Used when a search does not name its target fields: every field whose
    /// value is a string is searched.
    fn field_names(&self) -> Vec<&str>;
}

impl<T: Record + ?Sized> Record for &T {
    fn field_value(&self, field: &str) -> Value<'_> {
        (**self).field_value(field)
    }

    fn field_names(&self) -> Vec<&str> {
        (**self).field_names()
    }
}

impl Record for serde_json::Map<String, serde_json::Value> {
    fn field_value(&self, field: &str) -> Value<'_> {
        match self.get(field) {
            Some(value) => json_value(value),
            None => Value::None,
        }
    }

    fn field_names(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }
}

/// JSON documents are records when they are objects; any other JSON value
/// has no fields.
impl Record for serde_json::Value {
    fn field_value(&self, field: &str) -> Value<'_> {
        match self {
            serde_json::Value::Object(map) => map.field_value(field),
            _ => Value::None,
        }
    }

    fn field_names(&self) -> Vec<&str> {
        match self {
            serde_json::Value::Object(map) => map.field_names(),
            _ => Vec::new(),
        }
    }
}

fn json_value(value: &serde_json::Value) -> Value<'_> {
    match value {
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(Number::I64(i))
            } else if let Some(u) = n.as_u64() {
                Value::Number(Number::U64(u))
            } else {
                n.as_f64()
                    .map(|f| Value::Number(Number::F64(f)))
                    .unwrap_or(Value::None)
            }
        }
        // Nested documents and arrays are not filterable scalars.
        _ => Value::None,
    }
}

/// Conversion of date/time types into a [`Timestamp`].
///
/// Used by `#[derive(Record)]` for fields marked `#[record(timestamp)]`.
///
/// ```
/// use sift::{AsTimestamp, Timestamp};
///
/// struct Epoch(i64);
///
/// impl AsTimestamp for Epoch {
///     fn as_timestamp(&self) -> Timestamp {
///         Timestamp::from_secs(self.0)
///     }
/// }
///
/// assert_eq!(Epoch(2).as_timestamp(), Timestamp(2000));
/// ```
pub trait AsTimestamp {
    /// Converts this value to a [`Timestamp`].
    fn as_timestamp(&self) -> Timestamp;
}

impl AsTimestamp for Timestamp {
    fn as_timestamp(&self) -> Timestamp {
        *self
    }
}

impl AsTimestamp for i64 {
    fn as_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

impl AsTimestamp for u64 {
    fn as_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(i64::try_from(*self).unwrap_or(i64::MAX))
    }
}

impl<Tz: TimeZone> AsTimestamp for DateTime<Tz> {
    fn as_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(self.timestamp_millis())
    }
}

/// Naive date-times are read as UTC.
impl AsTimestamp for NaiveDateTime {
    fn as_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(self.and_utc().timestamp_millis())
    }
}

impl AsTimestamp for SystemTime {
    fn as_timestamp(&self) -> Timestamp {
        let millis = match self.duration_since(UNIX_EPOCH) {
            Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
            Err(before) => -i64::try_from(before.duration().as_millis()).unwrap_or(i64::MAX),
        };
        Timestamp::from_millis(millis)
    }
}
