//! Multi-field ordering.
//!
//! Provides [`Direction`], [`SortField`] and [`SortSpec`]. Comparison is a
//! total order over [`Value`]s so it can drive a stable sort:
//!
//! - strings compare lexicographically, numbers and timestamps by typed value
//! - missing values sort last whatever the direction
//! - values of different types are ordered by type
//!   (bool < number < timestamp < string)

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Ascending order (smallest first).
    #[default]
    #[serde(alias = "asc")]
    Asc,
    /// Descending order (largest first).
    #[serde(alias = "desc")]
    Desc,
}

impl Direction {
    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }

    /// Returns the wire name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single sort key: a field and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    /// The field to sort by.
    pub field: String,
    /// The sort direction.
    #[serde(default)]
    pub direction: Direction,
}

impl SortField {
    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        SortField::new(field, Direction::Asc)
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        SortField::new(field, Direction::Desc)
    }

    /// Sort on `field` in the given direction.
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        SortField {
            field: field.into(),
            direction,
        }
    }

    /// Compares two values for this key. Missing values always go last.
    pub fn compare(&self, a: &Value<'_>, b: &Value<'_>) -> Ordering {
        match (a.is_none(), b.is_none()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.direction.apply(compare_values(a, b)),
        }
    }
}

/// Compares two present values. Total: NaN sorts after other numbers and
/// mismatched types are ordered by type.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a.total_cmp(*b),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value<'_>) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::Timestamp(_) => 2,
        Value::String(_) => 3,
        Value::None => 4,
    }
}

/// Ordered sort keys: the first is the primary key, later ones break ties.
///
/// ```
/// use sift::{Direction, SortSpec};
///
/// let spec = SortSpec::parse("price:desc, name");
/// assert_eq!(spec.fields[0].direction, Direction::Desc);
/// assert_eq!(spec.fields[1].field, "name");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec {
    pub fields: Vec<SortField>,
}

impl SortSpec {
    /// Creates an empty spec.
    pub fn new() -> Self {
        SortSpec::default()
    }

    /// Adds an ascending key.
    pub fn asc(mut self, field: &str) -> Self {
        self.fields.push(SortField::asc(field));
        self
    }

    /// Adds a descending key.
    pub fn desc(mut self, field: &str) -> Self {
        self.fields.push(SortField::desc(field));
        self
    }

    /// Parses the `field[:asc|:desc], ...` query-string form.
    ///
    /// Blank entries are skipped; an unknown direction falls back to
    /// ascending.
    pub fn parse(s: &str) -> Self {
        let fields = s
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .filter_map(|entry| {
                let (field, dir) = match entry.split_once(':') {
                    Some((field, dir)) => (field.trim(), dir.trim()),
                    None => (entry, ""),
                };
                if field.is_empty() {
                    return None;
                }
                let direction = if dir.eq_ignore_ascii_case("desc") {
                    Direction::Desc
                } else {
                    Direction::Asc
                };
                Some(SortField::new(field, direction))
            })
            .collect();
        SortSpec { fields }
    }

    /// Returns `true` if there are no sort keys.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Compares two records key by key; the first non-equal key decides.
    pub fn compare<R: Record + ?Sized>(&self, a: &R, b: &R) -> Ordering {
        for key in &self.fields {
            let ordering = key.compare(&a.field_value(&key.field), &b.field_value(&key.field));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Sorts records in place. Stable: records equal on every key keep
    /// their relative order.
    pub fn sort<R: Record>(&self, items: &mut [R]) {
        if !self.is_empty() {
            items.sort_by(|a, b| self.compare(a, b));
        }
    }
}

impl From<Vec<SortField>> for SortSpec {
    fn from(fields: Vec<SortField>) -> Self {
        SortSpec { fields }
    }
}

/// Compares two records under `spec`.
pub fn compare<R: Record + ?Sized>(a: &R, b: &R, spec: &SortSpec) -> Ordering {
    spec.compare(a, b)
}
