//! Comparison operators for filters.
//!
//! The [`Operator`] enum lists every supported operator, grouped by the
//! operand families they apply to. Pairing an operator with an operand of the
//! wrong family is not an error; the filter simply does not match.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison operator for a filter.
///
/// - **String**: `Equals`, `NotEquals`, `Contains`, `StartsWith`, `EndsWith`, `Matches`
/// - **Numeric**: `Equals`, `NotEquals`, `GreaterThan`, `GreaterEqual`, `LessThan`, `LessEqual`, `Between`
/// - **Boolean**: `Equals`, `NotEquals`
/// - **Date**: `Equals`, `NotEquals`, `Before`, `After`, `Between`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    /// Exact match.
    Equals,
    /// Anything but an exact match.
    NotEquals,

    /// String contains substring.
    Contains,
    /// String starts with prefix.
    StartsWith,
    /// String ends with suffix.
    EndsWith,
    /// String matches a regular expression.
    Matches,

    /// Greater than.
    GreaterThan,
    /// Greater than or equal.
    GreaterEqual,
    /// Less than.
    LessThan,
    /// Less than or equal.
    LessEqual,
    /// Inside an inclusive `[low, high]` range.
    Between,

    /// Strictly earlier than.
    Before,
    /// Strictly later than.
    After,
}

impl Operator {
    /// Returns `true` if this operator is valid for string operands.
    pub fn is_string_op(self) -> bool {
        matches!(
            self,
            Operator::Equals
                | Operator::NotEquals
                | Operator::Contains
                | Operator::StartsWith
                | Operator::EndsWith
                | Operator::Matches
        )
    }

    /// Returns `true` if this operator is valid for numeric operands.
    pub fn is_number_op(self) -> bool {
        matches!(
            self,
            Operator::Equals
                | Operator::NotEquals
                | Operator::GreaterThan
                | Operator::GreaterEqual
                | Operator::LessThan
                | Operator::LessEqual
                | Operator::Between
        )
    }

    /// Returns `true` if this operator is valid for boolean operands.
    pub fn is_bool_op(self) -> bool {
        matches!(self, Operator::Equals | Operator::NotEquals)
    }

    /// Returns `true` if this operator is valid for date operands.
    pub fn is_date_op(self) -> bool {
        matches!(
            self,
            Operator::Equals
                | Operator::NotEquals
                | Operator::Before
                | Operator::After
                | Operator::Between
        )
    }

    /// Evaluates an ordering-based operator.
    ///
    /// `ordering` is `field.cmp(operand)`. `Before`/`After` read as
    /// less/greater. Non-ordering operators return `false`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Operator::Equals => ordering == Ordering::Equal,
            Operator::NotEquals => ordering != Ordering::Equal,
            Operator::GreaterThan | Operator::After => ordering == Ordering::Greater,
            Operator::GreaterEqual => ordering != Ordering::Less,
            Operator::LessThan | Operator::Before => ordering == Ordering::Less,
            Operator::LessEqual => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns the wire name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "EQUALS",
            Operator::NotEquals => "NOT_EQUALS",
            Operator::Contains => "CONTAINS",
            Operator::StartsWith => "STARTS_WITH",
            Operator::EndsWith => "ENDS_WITH",
            Operator::Matches => "MATCHES",
            Operator::GreaterThan => "GREATER_THAN",
            Operator::GreaterEqual => "GREATER_EQUAL",
            Operator::LessThan => "LESS_THAN",
            Operator::LessEqual => "LESS_EQUAL",
            Operator::Between => "BETWEEN",
            Operator::Before => "BEFORE",
            Operator::After => "AFTER",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
