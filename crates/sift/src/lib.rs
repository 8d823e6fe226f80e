//! Sift - generic list-query engine for typed record collections.
//!
//! Every "list" operation of an entity service ends the same way: take the
//! candidate records a storage adapter loaded, filter them, rank them against
//! a free-text query, sort them and cut out one page. Sift does that once,
//! for any record type that can look up a field by name.
//!
//! - [`FilterSpec`]: AND-combined predicates over string, numeric, boolean
//!   and date fields
//! - [`SearchSpec`]: case-insensitive relevance scoring with highlighted
//!   snippets
//! - [`SortSpec`]: stable multi-field ordering
//! - [`PaginationSpec`]: offset pages or cursor tokens
//!
//! # Quick Start
//!
//! ```rust
//! use sift::{FilterSpec, ListQuery, Number, PaginationSpec, QueryEngine, Record, SortSpec, Value};
//!
//! struct Product {
//!     name: String,
//!     price: u32,
//!     active: bool,
//! }
//!
//! impl Record for Product {
//!     fn field_value(&self, field: &str) -> Value<'_> {
//!         match field {
//!             "name" => Value::String(&self.name),
//!             "price" => Value::Number(Number::from(self.price)),
//!             "active" => Value::Bool(self.active),
//!             _ => Value::None,
//!         }
//!     }
//!
//!     fn field_names(&self) -> Vec<&str> {
//!         vec!["name", "price", "active"]
//!     }
//! }
//!
//! let products = vec![
//!     Product { name: "Desk".into(), price: 300, active: true },
//!     Product { name: "Lamp".into(), price: 40, active: true },
//!     Product { name: "Chair".into(), price: 120, active: false },
//! ];
//!
//! let query = ListQuery::new()
//!     .filter(FilterSpec::new().equals("active", true))
//!     .sort(SortSpec::new().asc("price"))
//!     .paginate(PaginationSpec::offset(1, 10));
//!
//! let outcome = QueryEngine::default().run(&products, &query);
//! assert_eq!(outcome.items.len(), 2);
//! assert_eq!(outcome.items[0].name, "Lamp");
//! assert_eq!(outcome.pagination.total_items, 2);
//! assert_eq!(outcome.skipped.len(), 1);
//! ```
//!
//! # Pipeline
//!
//! ```text
//! filter -> search (drop zero scores) -> sort -> paginate
//! ```
//!
//! Without an explicit sort, searched results come back by descending
//! relevance and unsearched ones in input order. The engine never fails:
//! malformed filters evaluate false, bad page sizes fall back to the default
//! limit, and each excluded record is reported in
//! [`QueryOutcome::skipped`].
//!
//! # Field Types and Operators
//!
//! | Operand | Operators |
//! |---------|-----------|
//! | String | `EQUALS`, `NOT_EQUALS`, `CONTAINS`, `STARTS_WITH`, `ENDS_WITH` |
//! | Pattern | `MATCHES` |
//! | Number | `EQUALS`, `NOT_EQUALS`, `GREATER_THAN`, `GREATER_EQUAL`, `LESS_THAN`, `LESS_EQUAL` |
//! | Number range | `BETWEEN` |
//! | Bool | `EQUALS`, `NOT_EQUALS` |
//! | Date | `EQUALS`, `NOT_EQUALS`, `BEFORE`, `AFTER` |
//! | Date range | `BETWEEN` |

mod config;
mod error;
mod filter;
mod op;
mod ordering;
mod paginate;
mod pipeline;
mod record;
mod search;
mod value;

pub use config::{EngineConfig, HighlightMarkers, MatchWeights, DEFAULT_LIMIT};
pub use error::{QueryError, Result};
pub use filter::{evaluate, Filter, FilterSpec, Operand, Pattern, Rejection, Verdict};
pub use op::Operator;
pub use ordering::{compare, compare_values, Direction, SortField, SortSpec};
pub use paginate::{paginate, CursorToken, PaginationResponse, PaginationSpec, Paginator};
pub use pipeline::{
    process, ListPage, ListQuery, QueryEngine, QueryOutcome, SkipReason, Skipped,
};
pub use record::{AsTimestamp, Record};
pub use search::{score, SearchResult, SearchScorer, SearchSpec};
pub use value::{Number, Timestamp, Value};

#[cfg(test)]
mod tests {
    use super::*;

    // The engine is shared across request handlers without locking.
    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QueryEngine>();
        assert_send_sync::<ListQuery>();
    }
}
