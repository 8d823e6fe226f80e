//! `#[derive(Record)]` against the engine.

use chrono::{DateTime, TimeZone, Utc};
use sift::{FilterSpec, ListQuery, QueryEngine, Record, SearchSpec, SortSpec, Timestamp, Value};
use sift_macros::Record;

#[derive(Debug, Clone, Record)]
struct Product {
    #[record(string)]
    name: String,

    #[record(number)]
    price: u32,

    #[record(bool)]
    active: bool,

    #[record(timestamp)]
    created_at: DateTime<Utc>,

    #[record(string, optional, rename = "note")]
    internal_note: Option<String>,

    #[record(number, optional)]
    rating: Option<f64>,

    #[record(skip)]
    #[allow(dead_code)]
    secret: String,

    #[allow(dead_code)]
    untracked: u64,
}

fn product(name: &str, price: u32, active: bool, day: u32) -> Product {
    Product {
        name: name.to_string(),
        price,
        active,
        created_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        internal_note: None,
        rating: None,
        secret: String::new(),
        untracked: 0,
    }
}

#[test]
fn generated_constants() {
    assert_eq!(Product::NAME, "name");
    assert_eq!(Product::CREATED_AT, "created_at");
    assert_eq!(Product::NOTE, "note");
    assert_eq!(
        Product::RECORD_FIELDS,
        &["name", "price", "active", "created_at", "note", "rating"]
    );
}

#[test]
fn field_values() {
    let mut p = product("Desk", 120, true, 2);
    assert_eq!(p.field_value("name"), Value::String("Desk"));
    assert_eq!(p.field_value("price").as_number().map(|n| n.to_f64()), Some(120.0));
    assert_eq!(p.field_value("active"), Value::Bool(true));
    assert_eq!(
        p.field_value("created_at").to_timestamp(),
        Some(Timestamp::parse("2024-01-02").unwrap())
    );

    // Optional, skipped and unannotated fields.
    assert!(p.field_value("note").is_none());
    assert!(p.field_value("rating").is_none());
    assert!(p.field_value("secret").is_none());
    assert!(p.field_value("untracked").is_none());
    assert!(p.field_value("internal_note").is_none());

    p.internal_note = Some("fragile".to_string());
    p.rating = Some(4.5);
    assert_eq!(p.field_value("note"), Value::String("fragile"));
    assert_eq!(p.field_value("rating").as_number().map(|n| n.to_f64()), Some(4.5));
    assert_eq!(p.field_names().len(), 6);
}

#[test]
fn derived_records_run_through_the_pipeline() {
    let mut with_note = product("Lamp", 40, true, 3);
    with_note.internal_note = Some("desk lamp".to_string());
    let records = vec![
        product("Desk", 120, true, 1),
        product("Chair", 80, false, 2),
        with_note,
    ];

    let query = ListQuery::new()
        .filter(FilterSpec::new().equals(Product::ACTIVE, true))
        .search(SearchSpec::new("desk"))
        .sort(SortSpec::new().asc(Product::PRICE));
    let out = QueryEngine::default().run(&records, &query);

    let names: Vec<&str> = out.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Lamp", "Desk"]);

    let results = out.search_results.unwrap();
    assert_eq!(results[0].highlights["note"], "<mark>desk</mark> lamp");
    assert_eq!(results[1].highlights["name"], "<mark>Desk</mark>");
}
