//! Filter predicates and their evaluation.
//!
//! A [`Filter`] is a field name, an [`Operator`] and an [`Operand`]. A
//! [`FilterSpec`] is an ordered list of filters that all have to hold for a
//! record to pass.
//!
//! Evaluation never fails. A missing field, an operand that does not fit its
//! operator, or an operator that makes no sense for the field's value type
//! all make that one filter false, and [`FilterSpec::check`] reports which
//! filter rejected the record and why.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;
use crate::op::Operator;
use crate::record::Record;
use crate::value::{Number, Timestamp, Value};

/// A single filter predicate.
///
/// ```
/// use sift::{Filter, Operand, Operator, Value};
///
/// let filter = Filter::new("name", Operator::StartsWith, "Ac");
/// assert!(filter.matches(&Value::String("Acme")));
/// assert!(!filter.matches(&Value::String("acme")));
///
/// let range = Filter::new("price", Operator::Between, Operand::number_range(10, 20));
/// assert!(range.matches(&Value::Number(20u32.into())));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// The field name to compare.
    pub field: String,
    /// The comparison operator.
    pub operator: Operator,
    /// The value to compare against.
    pub operand: Operand,
}

/// Result of testing one filter against one field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The predicate holds.
    Match,
    /// The predicate was evaluated and does not hold.
    NoMatch,
    /// The record has no value for the field.
    Missing,
    /// The operand cannot be used with the operator.
    Malformed(&'static str),
    /// The operator does not apply to the field's value type.
    Unsupported(&'static str),
}

impl Filter {
    /// Creates a new filter.
    pub fn new(field: impl Into<String>, operator: Operator, operand: impl Into<Operand>) -> Self {
        Filter {
            field: field.into(),
            operator,
            operand: operand.into(),
        }
    }

    /// Returns `true` if the value satisfies this filter.
    pub fn matches(&self, value: &Value<'_>) -> bool {
        self.test(value) == Verdict::Match
    }

    /// Tests a field value against this filter.
    pub fn test(&self, value: &Value<'_>) -> Verdict {
        if value.is_none() {
            return Verdict::Missing;
        }

        let op = self.operator;
        match &self.operand {
            Operand::String(expected) => {
                if !op.is_string_op() || op == Operator::Matches {
                    return Verdict::Malformed("string operand needs a string operator");
                }
                match value {
                    Value::String(actual) => verdict(match_string(op, actual, expected)),
                    other => Verdict::Unsupported(other.type_name()),
                }
            }

            Operand::Pattern(pattern) => {
                if op != Operator::Matches {
                    return Verdict::Malformed("pattern operand needs MATCHES");
                }
                let Some(regex) = pattern.regex() else {
                    return Verdict::Malformed("invalid regular expression");
                };
                match value {
                    Value::String(actual) => verdict(regex.is_match(actual)),
                    other => Verdict::Unsupported(other.type_name()),
                }
            }

            Operand::Number(expected) => {
                if !op.is_number_op() || op == Operator::Between {
                    return Verdict::Malformed("number operand needs a numeric comparison");
                }
                match value {
                    // NaN on either side compares as nothing.
                    Value::Number(actual) => verdict(
                        actual
                            .compare(*expected)
                            .is_some_and(|ordering| op.eval_ordering(ordering)),
                    ),
                    other => Verdict::Unsupported(other.type_name()),
                }
            }

            Operand::Bool(expected) => {
                if !op.is_bool_op() {
                    return Verdict::Malformed("bool operand needs EQUALS or NOT_EQUALS");
                }
                match value {
                    Value::Bool(actual) => verdict(op.eval_ordering(actual.cmp(expected))),
                    other => Verdict::Unsupported(other.type_name()),
                }
            }

            Operand::Date(expected) => {
                if !op.is_date_op() || op == Operator::Between {
                    return Verdict::Malformed("date operand needs a date comparison");
                }
                match value.to_timestamp() {
                    Some(actual) => verdict(op.eval_ordering(actual.cmp(expected))),
                    None => Verdict::Unsupported(value.type_name()),
                }
            }

            Operand::NumberRange { low, high } => {
                if op != Operator::Between {
                    return Verdict::Malformed("range operand needs BETWEEN");
                }
                let (Some(low), Some(high)) = (low, high) else {
                    return Verdict::Malformed("range is missing a bound");
                };
                match value {
                    Value::Number(actual) => verdict(
                        actual.compare(*low).is_some_and(|o| o.is_ge())
                            && actual.compare(*high).is_some_and(|o| o.is_le()),
                    ),
                    other => Verdict::Unsupported(other.type_name()),
                }
            }

            Operand::DateRange { start, end } => {
                if op != Operator::Between {
                    return Verdict::Malformed("range operand needs BETWEEN");
                }
                let (Some(start), Some(end)) = (start, end) else {
                    return Verdict::Malformed("range is missing a bound");
                };
                match value.to_timestamp() {
                    Some(actual) => verdict(*start <= actual && actual <= *end),
                    None => Verdict::Unsupported(value.type_name()),
                }
            }
        }
    }
}

fn verdict(matched: bool) -> Verdict {
    if matched {
        Verdict::Match
    } else {
        Verdict::NoMatch
    }
}

fn match_string(op: Operator, field: &str, expected: &str) -> bool {
    match op {
        Operator::Equals => field == expected,
        Operator::NotEquals => field != expected,
        Operator::StartsWith => field.starts_with(expected),
        Operator::EndsWith => field.ends_with(expected),
        Operator::Contains => field.contains(expected),
        _ => false,
    }
}

/// Owned comparison value stored in a filter.
///
/// Serialized externally tagged, e.g. `{"number": 5}` or
/// `{"date_range": {"start": "2024-01-01", "end": 1706500000000}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// String value.
    String(String),
    /// Regular expression, used with `MATCHES`.
    Pattern(Pattern),
    /// Numeric value.
    Number(Number),
    /// Boolean value.
    Bool(bool),
    /// Point in time.
    Date(Timestamp),
    /// Inclusive numeric range, used with `BETWEEN`.
    NumberRange {
        #[serde(default)]
        low: Option<Number>,
        #[serde(default)]
        high: Option<Number>,
    },
    /// Inclusive date range, used with `BETWEEN`.
    DateRange {
        #[serde(default)]
        start: Option<Timestamp>,
        #[serde(default)]
        end: Option<Timestamp>,
    },
}

impl Operand {
    /// Inclusive numeric range.
    pub fn number_range(low: impl Into<Number>, high: impl Into<Number>) -> Self {
        Operand::NumberRange {
            low: Some(low.into()),
            high: Some(high.into()),
        }
    }

    /// Inclusive date range.
    pub fn date_range(start: Timestamp, end: Timestamp) -> Self {
        Operand::DateRange {
            start: Some(start),
            end: Some(end),
        }
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::String(s)
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::String(s.to_string())
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Bool(b)
    }
}

impl From<Number> for Operand {
    fn from(n: Number) -> Self {
        Operand::Number(n)
    }
}

impl From<Timestamp> for Operand {
    fn from(t: Timestamp) -> Self {
        Operand::Date(t)
    }
}

impl From<Pattern> for Operand {
    fn from(p: Pattern) -> Self {
        Operand::Pattern(p)
    }
}

macro_rules! operand_from_number {
    ($($src:ty),+) => {
        $(
            impl From<$src> for Operand {
                fn from(n: $src) -> Self {
                    Operand::Number(Number::from(n))
                }
            }
        )+
    };
}

operand_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// A regular expression operand.
///
/// Construction is lenient: an invalid pattern is kept and makes the filter
/// evaluate false. Use [`Pattern::try_new`] to reject it up front.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Option<Regex>,
}

impl Pattern {
    /// Compiles a pattern, keeping invalid ones as never-matching.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let regex = Regex::new(&source).ok();
        Pattern { source, regex }
    }

    /// Compiles a pattern, failing on invalid syntax.
    pub fn try_new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let regex = Regex::new(&source)?;
        Ok(Pattern {
            source,
            regex: Some(regex),
        })
    }

    /// The pattern text as given.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compiled expression, if the pattern was valid.
    pub fn regex(&self) -> Option<&Regex> {
        self.regex.as_ref()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Pattern::new)
    }
}

/// Why a filter rejected a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// The record has no value for the filtered field.
    MissingField { field: String },
    /// The predicate was evaluated and does not hold.
    NotSatisfied { field: String, operator: Operator },
    /// The filter's operand cannot be used with its operator.
    MalformedOperand {
        field: String,
        operator: Operator,
        detail: &'static str,
    },
    /// The operator does not apply to the field's value type.
    UnsupportedOperator {
        field: String,
        operator: Operator,
        value_type: &'static str,
    },
}

/// An ordered set of filters combined with AND.
///
/// ```
/// use sift::{FilterSpec, Number, Record, Value};
///
/// struct Item { active: bool, price: i64 }
///
/// impl Record for Item {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "active" => Value::Bool(self.active),
///             "price" => Value::Number(Number::I64(self.price)),
///             _ => Value::None,
///         }
///     }
///     fn field_names(&self) -> Vec<&str> { vec!["active", "price"] }
/// }
///
/// let spec = FilterSpec::new().equals("active", true).greater_than("price", 10);
/// assert!(spec.evaluate(&Item { active: true, price: 11 }));
/// assert!(!spec.evaluate(&Item { active: true, price: 10 }));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec {
    pub filters: Vec<Filter>,
}

impl FilterSpec {
    /// Creates an empty spec, which every record satisfies.
    pub fn new() -> Self {
        FilterSpec::default()
    }

    /// Adds a filter.
    pub fn and(mut self, field: &str, operator: Operator, operand: impl Into<Operand>) -> Self {
        self.filters.push(Filter::new(field, operator, operand));
        self
    }

    /// Adds an `EQUALS` filter.
    pub fn equals(self, field: &str, operand: impl Into<Operand>) -> Self {
        self.and(field, Operator::Equals, operand)
    }

    /// Adds a `NOT_EQUALS` filter.
    pub fn not_equals(self, field: &str, operand: impl Into<Operand>) -> Self {
        self.and(field, Operator::NotEquals, operand)
    }

    /// Adds a `CONTAINS` filter.
    pub fn contains(self, field: &str, needle: &str) -> Self {
        self.and(field, Operator::Contains, needle)
    }

    /// Adds a `STARTS_WITH` filter.
    pub fn starts_with(self, field: &str, prefix: &str) -> Self {
        self.and(field, Operator::StartsWith, prefix)
    }

    /// Adds an `ENDS_WITH` filter.
    pub fn ends_with(self, field: &str, suffix: &str) -> Self {
        self.and(field, Operator::EndsWith, suffix)
    }

    /// Adds a `MATCHES` filter. Invalid patterns never match.
    pub fn matches(self, field: &str, pattern: &str) -> Self {
        self.and(field, Operator::Matches, Pattern::new(pattern))
    }

    /// Adds a `GREATER_THAN` filter.
    pub fn greater_than(self, field: &str, operand: impl Into<Number>) -> Self {
        self.and(field, Operator::GreaterThan, operand.into())
    }

    /// Adds a `GREATER_EQUAL` filter.
    pub fn greater_equal(self, field: &str, operand: impl Into<Number>) -> Self {
        self.and(field, Operator::GreaterEqual, operand.into())
    }

    /// Adds a `LESS_THAN` filter.
    pub fn less_than(self, field: &str, operand: impl Into<Number>) -> Self {
        self.and(field, Operator::LessThan, operand.into())
    }

    /// Adds a `LESS_EQUAL` filter.
    pub fn less_equal(self, field: &str, operand: impl Into<Number>) -> Self {
        self.and(field, Operator::LessEqual, operand.into())
    }

    /// Adds an inclusive numeric `BETWEEN` filter.
    pub fn between(self, field: &str, low: impl Into<Number>, high: impl Into<Number>) -> Self {
        self.and(field, Operator::Between, Operand::number_range(low, high))
    }

    /// Adds a `BEFORE` filter.
    pub fn before(self, field: &str, ts: Timestamp) -> Self {
        self.and(field, Operator::Before, ts)
    }

    /// Adds an `AFTER` filter.
    pub fn after(self, field: &str, ts: Timestamp) -> Self {
        self.and(field, Operator::After, ts)
    }

    /// Adds an inclusive date `BETWEEN` filter.
    pub fn during(self, field: &str, start: Timestamp, end: Timestamp) -> Self {
        self.and(field, Operator::Between, Operand::date_range(start, end))
    }

    /// Returns `true` if there are no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns `true` if the record satisfies every filter.
    pub fn evaluate<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.check(record).is_ok()
    }

    /// Evaluates every filter in order and reports the first rejection.
    pub fn check<R: Record + ?Sized>(&self, record: &R) -> std::result::Result<(), Rejection> {
        for filter in &self.filters {
            let value = record.field_value(&filter.field);
            let field = || filter.field.clone();
            let operator = filter.operator;
            match filter.test(&value) {
                Verdict::Match => {}
                Verdict::NoMatch => return Err(Rejection::NotSatisfied { field: field(), operator }),
                Verdict::Missing => return Err(Rejection::MissingField { field: field() }),
                Verdict::Malformed(detail) => {
                    return Err(Rejection::MalformedOperand {
                        field: field(),
                        operator,
                        detail,
                    })
                }
                Verdict::Unsupported(value_type) => {
                    return Err(Rejection::UnsupportedOperator {
                        field: field(),
                        operator,
                        value_type,
                    })
                }
            }
        }
        Ok(())
    }
}

impl From<Vec<Filter>> for FilterSpec {
    fn from(filters: Vec<Filter>) -> Self {
        FilterSpec { filters }
    }
}

/// Returns `true` if the record satisfies every filter in `spec`.
pub fn evaluate<R: Record + ?Sized>(record: &R, spec: &FilterSpec) -> bool {
    spec.evaluate(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(ms: i64) -> Value<'static> {
        Value::Timestamp(Timestamp(ms))
    }

    fn num(n: i64) -> Value<'static> {
        Value::Number(Number::I64(n))
    }

    #[test]
    fn string_operators_are_case_sensitive() {
        let eq = Filter::new("name", Operator::Equals, "hello");
        assert!(eq.matches(&Value::String("hello")));
        assert!(!eq.matches(&Value::String("Hello")));

        let ne = Filter::new("name", Operator::NotEquals, "hello");
        assert!(ne.matches(&Value::String("world")));
        assert!(!ne.matches(&Value::String("hello")));

        let contains = Filter::new("name", Operator::Contains, "llo");
        assert!(contains.matches(&Value::String("hello")));
        assert!(!contains.matches(&Value::String("HELLO")));

        let starts = Filter::new("name", Operator::StartsWith, "he");
        assert!(starts.matches(&Value::String("hello")));
        assert!(!starts.matches(&Value::String("the")));

        let ends = Filter::new("name", Operator::EndsWith, "lo");
        assert!(ends.matches(&Value::String("hello")));
        assert!(!ends.matches(&Value::String("lol")));
    }

    #[test]
    fn regex_pattern() {
        let filter = Filter::new("sku", Operator::Matches, Pattern::new(r"^AB-\d+$"));
        assert!(filter.matches(&Value::String("AB-12")));
        assert!(!filter.matches(&Value::String("AB-12x")));

        let broken = Filter::new("sku", Operator::Matches, Pattern::new("(unclosed"));
        assert_eq!(
            broken.test(&Value::String("anything")),
            Verdict::Malformed("invalid regular expression")
        );
        assert!(Pattern::try_new("(unclosed").is_err());
    }

    #[test]
    fn numeric_operators() {
        let gt = Filter::new("price", Operator::GreaterThan, 10);
        assert!(gt.matches(&num(11)));
        assert!(!gt.matches(&num(10)));

        let ge = Filter::new("price", Operator::GreaterEqual, 10);
        assert!(ge.matches(&num(10)));
        assert!(!ge.matches(&num(9)));

        let lt = Filter::new("price", Operator::LessThan, 10);
        assert!(lt.matches(&num(9)));
        assert!(!lt.matches(&num(10)));

        let le = Filter::new("price", Operator::LessEqual, 10);
        assert!(le.matches(&num(10)));
        assert!(!le.matches(&num(11)));

        // Typed comparison, mixed representations.
        let eq = Filter::new("price", Operator::Equals, 10);
        assert!(eq.matches(&Value::Number(Number::U64(10))));
        assert!(eq.matches(&Value::Number(Number::F64(10.0))));
    }

    #[test]
    fn numeric_between_is_inclusive() {
        let between = Filter::new("price", Operator::Between, Operand::number_range(5, 10));
        assert!(between.matches(&num(5)));
        assert!(between.matches(&num(10)));
        assert!(!between.matches(&num(4)));
        assert!(!between.matches(&num(11)));
    }

    #[test]
    fn between_missing_bound_is_malformed() {
        let filter = Filter::new(
            "price",
            Operator::Between,
            Operand::NumberRange {
                low: Some(Number::I64(1)),
                high: None,
            },
        );
        assert_eq!(
            filter.test(&num(3)),
            Verdict::Malformed("range is missing a bound")
        );

        // BETWEEN with a scalar operand is malformed too.
        let scalar = Filter::new("price", Operator::Between, 3);
        assert!(matches!(scalar.test(&num(3)), Verdict::Malformed(_)));
    }

    #[test]
    fn non_numeric_operand_for_numeric_operator() {
        let filter = Filter::new("price", Operator::GreaterThan, "ten");
        assert!(matches!(filter.test(&num(30)), Verdict::Malformed(_)));
    }

    #[test]
    fn nan_never_matches() {
        let filter = Filter::new("ratio", Operator::NotEquals, 1.0);
        assert_eq!(
            filter.test(&Value::Number(Number::F64(f64::NAN))),
            Verdict::NoMatch
        );
    }

    #[test]
    fn bool_equals() {
        let filter = Filter::new("active", Operator::Equals, true);
        assert!(filter.matches(&Value::Bool(true)));
        assert!(!filter.matches(&Value::Bool(false)));

        let wrong_op = Filter::new("active", Operator::GreaterThan, true);
        assert!(matches!(wrong_op.test(&Value::Bool(true)), Verdict::Malformed(_)));
    }

    #[test]
    fn date_operators_compare_epoch_millis() {
        let before = Filter::new("created", Operator::Before, Timestamp(1000));
        assert!(before.matches(&ts(999)));
        assert!(!before.matches(&ts(1000)));

        let after = Filter::new("created", Operator::After, Timestamp(1000));
        assert!(after.matches(&ts(1001)));
        assert!(!after.matches(&ts(1000)));

        let during = Filter::new(
            "created",
            Operator::Between,
            Operand::date_range(Timestamp(1000), Timestamp(2000)),
        );
        assert!(during.matches(&ts(1000)));
        assert!(during.matches(&ts(2000)));
        assert!(!during.matches(&ts(2001)));
    }

    #[test]
    fn date_strings_are_normalized_not_compared_as_text() {
        // "2024-1-..." style differences would break a string comparison.
        let after = Filter::new(
            "created",
            Operator::After,
            Timestamp::parse("2024-01-01T00:00:00Z").unwrap(),
        );
        assert!(after.matches(&Value::String("2024-01-01T01:00:00+00:30")));
        assert!(!after.matches(&Value::String("2024-01-01T00:30:00+01:00")));
        assert_eq!(
            after.test(&Value::String("not a date")),
            Verdict::Unsupported("string")
        );
    }

    #[test]
    fn missing_and_mismatched_values() {
        let filter = Filter::new("name", Operator::Equals, "x");
        assert_eq!(filter.test(&Value::None), Verdict::Missing);
        assert_eq!(filter.test(&num(1)), Verdict::Unsupported("number"));

        // NOT_EQUALS does not match a missing field either.
        let ne = Filter::new("name", Operator::NotEquals, "x");
        assert!(!ne.matches(&Value::None));
    }

    #[test]
    fn operand_serde_shape() {
        let filter: Filter = serde_json::from_str(
            r#"{"field":"price","operator":"BETWEEN","operand":{"number_range":{"low":1,"high":2.5}}}"#,
        )
        .unwrap();
        assert_eq!(
            filter.operand,
            Operand::NumberRange {
                low: Some(Number::I64(1)),
                high: Some(Number::F64(2.5)),
            }
        );

        let half_open: Operand =
            serde_json::from_str(r#"{"date_range":{"start":"2024-01-01"}}"#).unwrap();
        assert!(matches!(half_open, Operand::DateRange { end: None, .. }));

        let pattern: Operand = serde_json::from_str(r#"{"pattern":"^a"}"#).unwrap();
        assert_eq!(pattern, Operand::Pattern(Pattern::new("^a")));
    }
}
