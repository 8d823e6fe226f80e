//! Derive macro for the `sift` list-query engine.
//!
//! ## Derive Macros
//!
//! - [`Record`] - Implement `sift::Record` (named-field access) for a struct

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Record` trait for query-enabled structs.
///
/// Only annotated fields are visible to the engine; everything else reads as
/// missing.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `string` | Text field (`String`, `&str`, anything `AsRef<str>`) |
/// | `number` | Numeric field (any primitive convertible into `sift::Number`) |
/// | `timestamp` | Date/time field - requires `sift::AsTimestamp` |
/// | `bool` | Boolean field |
/// | `optional` | The field is an `Option<T>` of the given kind; `None` reads as missing |
/// | `skip` | Exclude this field |
/// | `rename = "..."` | Expose the field under another name |
///
/// # Generated Code
///
/// 1. Field name constants (e.g. `Product::NAME`) and `RECORD_FIELDS`
/// 2. An implementation of `sift::Record`
///
/// # Example
///
/// ```ignore
/// use sift::{FilterSpec, QueryEngine, ListQuery};
/// use sift_macros::Record;
///
/// #[derive(Record)]
/// struct Product {
///     #[record(string)]
///     name: String,
///
///     #[record(number)]
///     price: u32,
///
///     #[record(bool)]
///     active: bool,
///
///     #[record(timestamp, optional, rename = "archived")]
///     archived_at: Option<chrono::DateTime<chrono::Utc>>,
///
///     internal_id: u64,
/// }
///
/// let query = ListQuery::new().filter(FilterSpec::new().equals(Product::ACTIVE, true));
/// let page = QueryEngine::default().run(&products, &query);
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
