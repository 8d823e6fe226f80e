//! Property-based tests for the list-query engine using proptest.

use proptest::prelude::*;
use sift::{
    process, FilterSpec, Number, PaginationSpec, QueryEngine, Record, SearchSpec, SortSpec, Value,
};

// ============================================================================
// Test helpers
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct TestItem {
    id: usize,
    value: i64,
    group: u8,
    name: String,
    active: bool,
}

impl Record for TestItem {
    fn field_value(&self, field: &str) -> Value<'_> {
        match field {
            "id" => Value::Number(Number::from(self.id)),
            "value" => Value::Number(Number::I64(self.value)),
            "group" => Value::Number(Number::from(self.group)),
            "name" => Value::String(&self.name),
            "active" => Value::Bool(self.active),
            _ => Value::None,
        }
    }

    fn field_names(&self) -> Vec<&str> {
        vec!["id", "value", "group", "name", "active"]
    }
}

fn items_strategy(max: usize) -> impl Strategy<Value = Vec<TestItem>> {
    prop::collection::vec(
        (any::<i64>(), 0u8..4, "[a-z]{1,10}", any::<bool>()),
        0..max,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(id, (value, group, name, active))| TestItem {
                id,
                value,
                group,
                name,
                active,
            })
            .collect()
    })
}

fn ids(items: &[&TestItem]) -> Vec<usize> {
    items.iter().map(|item| item.id).collect()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Filtering never adds records and every survivor satisfies the filters.
    #[test]
    fn filter_keeps_only_matches(
        items in items_strategy(60),
        threshold in any::<i64>(),
    ) {
        let spec = FilterSpec::new().greater_than("value", threshold).equals("active", true);
        let out = process(&items, Some(&spec), None, None, None);

        prop_assert!(out.items.len() <= items.len());
        prop_assert_eq!(out.items.len() + out.skipped.len(), items.len());
        for item in &out.items {
            prop_assert!(item.value > threshold && item.active);
        }
    }

    /// Filtering an already filtered set changes nothing.
    #[test]
    fn filter_is_idempotent(
        items in items_strategy(60),
        prefix in "[a-z]{0,2}",
    ) {
        let spec = FilterSpec::new().starts_with("name", &prefix);
        let once: Vec<TestItem> = process(&items, Some(&spec), None, None, None)
            .items
            .into_iter()
            .cloned()
            .collect();
        let twice = process(&once, Some(&spec), None, None, None);

        prop_assert_eq!(twice.items.len(), once.len());
        prop_assert!(twice.skipped.is_empty());
    }

    /// The same input and query always produce the same page.
    #[test]
    fn pipeline_is_deterministic(
        items in items_strategy(60),
        query in "[a-z]{1,3}",
        page in 1i64..5,
        limit in 1i64..8,
    ) {
        let engine = QueryEngine::default();
        let search = SearchSpec::new(query);
        let pagination = PaginationSpec::offset(page, limit);

        let a = engine.process(&items, None, None, Some(&search), Some(&pagination));
        let b = engine.process(&items, None, None, Some(&search), Some(&pagination));

        prop_assert_eq!(ids(&a.items), ids(&b.items));
        prop_assert_eq!(a.pagination, b.pagination);
        prop_assert_eq!(a.search_results, b.search_results);
    }

    /// Records with equal sort keys keep their input order.
    #[test]
    fn sort_is_stable(items in items_strategy(60), descending in any::<bool>()) {
        let spec = if descending {
            SortSpec::new().desc("group")
        } else {
            SortSpec::new().asc("group")
        };
        let out = process(&items, None, Some(&spec), None, None);

        prop_assert_eq!(out.items.len(), items.len());
        for pair in out.items.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if descending {
                prop_assert!(a.group >= b.group);
            } else {
                prop_assert!(a.group <= b.group);
            }
            if a.group == b.group {
                prop_assert!(a.id < b.id);
            }
        }
    }

    /// Offset pages cover the ordered result without gaps or overlap.
    #[test]
    fn offset_pages_are_gapless(items in items_strategy(40), limit in 1i64..7) {
        let sort = SortSpec::new().asc("value");
        let all = ids(&process(&items, None, Some(&sort), None, None).items);

        let mut walked = Vec::new();
        let mut page = 1;
        loop {
            let out = process(&items, None, Some(&sort), None, Some(&PaginationSpec::offset(page, limit)));
            prop_assert!(out.items.len() <= limit as usize);
            walked.extend(ids(&out.items));
            if !out.pagination.has_next {
                break;
            }
            page += 1;
        }

        prop_assert_eq!(walked, all);
    }

    /// Page P of size L starts at index (P - 1) * L of the ordered result.
    #[test]
    fn page_starts_at_its_offset(
        items in items_strategy(40),
        page in 1i64..10,
        limit in 1i64..10,
    ) {
        let out = process(&items, None, None, None, Some(&PaginationSpec::offset(page, limit)));
        let start = ((page - 1) * limit) as usize;

        match items.get(start) {
            Some(first) => prop_assert_eq!(out.items.first().map(|i| i.id), Some(first.id)),
            None => prop_assert!(out.items.is_empty()),
        }
        prop_assert_eq!(out.pagination.has_prev, page > 1);
    }

    /// A limit below one behaves exactly like the default limit of 10.
    #[test]
    fn non_positive_limit_means_default(
        items in items_strategy(40),
        page in 1i64..5,
        limit in -5i64..=0,
    ) {
        let fallback = process(&items, None, None, None, Some(&PaginationSpec::offset(page, limit)));
        let default = process(&items, None, None, None, Some(&PaginationSpec::offset(page, 10)));

        prop_assert_eq!(ids(&fallback.items), ids(&default.items));
        prop_assert_eq!(fallback.pagination, default.pagination);
    }

    /// Following cursor tokens visits every record exactly once.
    #[test]
    fn cursor_walk_visits_everything(items in items_strategy(40), limit in 1i64..7) {
        let engine = QueryEngine::default();
        let mut walked = Vec::new();
        let mut spec = PaginationSpec::first(limit);
        loop {
            let out = engine.process(&items, None, None, None, Some(&spec));
            walked.extend(ids(&out.items));
            match out.pagination.next_page_token {
                Some(token) => spec = PaginationSpec::after(token, limit),
                None => break,
            }
        }

        prop_assert_eq!(walked, (0..items.len()).collect::<Vec<_>>());
    }

    /// Search results are ordered by descending score and stay aligned
    /// with the returned items.
    #[test]
    fn relevance_order(items in items_strategy(40), query in "[a-z]{1,2}") {
        let out = process(&items, None, None, Some(&SearchSpec::new(query)), None);
        let results = out.search_results.unwrap_or_default();

        prop_assert_eq!(results.len(), out.items.len());
        for pair in results.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        for result in &results {
            prop_assert!(result.score > 0.0);
            prop_assert!(result.highlights.contains_key("name"));
        }
    }
}
