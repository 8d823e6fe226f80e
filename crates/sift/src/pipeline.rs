//! The list-query pipeline.
//!
//! [`QueryEngine::process`] runs the four stages in a fixed order:
//!
//! ```text
//! filter -> search (score, drop misses) -> sort -> paginate
//! ```
//!
//! Sorting uses the explicit [`SortSpec`] when one is given, otherwise
//! descending relevance when a search ran, otherwise the input order. Every
//! sort is stable.
//!
//! The engine holds only configuration. It borrows the input records,
//! never mutates them, and returns references into the input slice.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::filter::{FilterSpec, Rejection};
use crate::ordering::SortSpec;
use crate::paginate::{PaginationResponse, PaginationSpec, Paginator};
use crate::record::Record;
use crate::search::{SearchResult, SearchScorer, SearchSpec};

/// The four optional request parameters of a list operation.
///
/// ```
/// use sift::{FilterSpec, ListQuery, PaginationSpec, SearchSpec, SortSpec};
///
/// let query = ListQuery::new()
///     .filter(FilterSpec::new().equals("active", true))
///     .search(SearchSpec::new("acme"))
///     .sort(SortSpec::new().desc("created_at"))
///     .paginate(PaginationSpec::offset(1, 20));
/// assert!(query.pagination.is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub filter: Option<FilterSpec>,
    pub sort: Option<SortSpec>,
    pub search: Option<SearchSpec>,
    pub pagination: Option<PaginationSpec>,
}

impl ListQuery {
    /// A query with no parameters: every record, in input order.
    pub fn new() -> Self {
        ListQuery::default()
    }

    pub fn filter(mut self, spec: FilterSpec) -> Self {
        self.filter = Some(spec);
        self
    }

    pub fn sort(mut self, spec: SortSpec) -> Self {
        self.sort = Some(spec);
        self
    }

    pub fn search(mut self, spec: SearchSpec) -> Self {
        self.search = Some(spec);
        self
    }

    pub fn paginate(mut self, spec: PaginationSpec) -> Self {
        self.pagination = Some(spec);
        self
    }
}

/// Why a record did not make it into the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A filter rejected the record.
    Filtered(Rejection),
    /// The record scored zero against the search query.
    NoSearchMatch,
}

/// An excluded input record, by position in the input slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skipped {
    pub index: usize,
    pub reason: SkipReason,
}

/// Result of one pipeline run, borrowing from the input records.
#[derive(Debug)]
pub struct QueryOutcome<'a, T> {
    /// The requested page, in final order.
    pub items: Vec<&'a T>,
    pub pagination: PaginationResponse,
    /// Relevance per item, aligned with `items`; only set when a search ran.
    pub search_results: Option<Vec<SearchResult>>,
    /// Every excluded record, in input order.
    pub skipped: Vec<Skipped>,
}

impl<T: Clone> QueryOutcome<'_, T> {
    /// Clones the page into an owned, serializable value.
    pub fn to_page(&self) -> ListPage<T> {
        ListPage {
            items: self.items.iter().map(|item| (*item).clone()).collect(),
            pagination: self.pagination.clone(),
            search_results: self.search_results.clone(),
        }
    }
}

/// Owned page as returned to list views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub pagination: PaginationResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_results: Option<Vec<SearchResult>>,
}

struct Candidate<'a, T> {
    record: &'a T,
    relevance: Option<SearchResult>,
}

impl<T> Candidate<'_, T> {
    fn score(&self) -> f64 {
        self.relevance.as_ref().map_or(0.0, |r| r.score)
    }
}

/// Stateless filter/search/sort/paginate engine.
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    scorer: SearchScorer,
    paginator: Paginator,
}

impl QueryEngine {
    /// Creates an engine from configuration.
    pub fn new(config: &EngineConfig) -> Self {
        QueryEngine {
            scorer: SearchScorer::new(config.weights, config.highlight.clone()),
            paginator: Paginator::from_config(config),
        }
    }

    /// Runs a [`ListQuery`].
    pub fn run<'a, T: Record>(&self, records: &'a [T], query: &ListQuery) -> QueryOutcome<'a, T> {
        self.process(
            records,
            query.filter.as_ref(),
            query.sort.as_ref(),
            query.search.as_ref(),
            query.pagination.as_ref(),
        )
    }

    /// Filters, searches, sorts and paginates `records`.
    ///
    /// A search with a blank query counts as no search.
    pub fn process<'a, T: Record>(
        &self,
        records: &'a [T],
        filter: Option<&FilterSpec>,
        sort: Option<&SortSpec>,
        search: Option<&SearchSpec>,
        pagination: Option<&PaginationSpec>,
    ) -> QueryOutcome<'a, T> {
        let mut skipped = Vec::new();

        let mut kept: Vec<(usize, &'a T)> = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            match filter.map_or(Ok(()), |spec| spec.check(record)) {
                Ok(()) => kept.push((index, record)),
                Err(rejection) => {
                    tracing::trace!(index, ?rejection, "record filtered out");
                    skipped.push(Skipped {
                        index,
                        reason: SkipReason::Filtered(rejection),
                    });
                }
            }
        }
        let filtered = kept.len();

        let search = search.filter(|spec| !spec.is_blank());
        let mut candidates: Vec<Candidate<'a, T>> = match search {
            None => kept
                .into_iter()
                .map(|(_, record)| Candidate {
                    record,
                    relevance: None,
                })
                .collect(),
            Some(spec) => {
                let terms = spec.terms();
                let mut matched = Vec::with_capacity(kept.len());
                for (index, record) in kept {
                    let result = self.scorer.score_terms(record, &terms, &spec.fields);
                    if result.is_miss() {
                        tracing::trace!(index, "record did not match search");
                        skipped.push(Skipped {
                            index,
                            reason: SkipReason::NoSearchMatch,
                        });
                    } else {
                        matched.push(Candidate {
                            record,
                            relevance: Some(result),
                        });
                    }
                }
                matched
            }
        };
        skipped.sort_by_key(|s| s.index);

        match sort.filter(|spec| !spec.is_empty()) {
            Some(spec) => candidates.sort_by(|a, b| spec.compare(a.record, b.record)),
            None if search.is_some() => {
                candidates.sort_by(|a, b| b.score().total_cmp(&a.score()))
            }
            None => {}
        }

        let ordered: Vec<&'a T> = candidates.iter().map(|c| c.record).collect();
        let (range, pagination) = self.paginator.window(&ordered, pagination);

        let mut items = Vec::with_capacity(range.len());
        let mut relevance = Vec::with_capacity(range.len());
        for candidate in candidates.into_iter().skip(range.start).take(range.len()) {
            items.push(candidate.record);
            relevance.extend(candidate.relevance);
        }

        tracing::debug!(
            input = records.len(),
            filtered,
            matched = ordered.len(),
            returned = items.len(),
            skipped = skipped.len(),
            "list query processed"
        );

        QueryOutcome {
            items,
            pagination,
            search_results: search.map(|_| relevance),
            skipped,
        }
    }
}

/// Runs the pipeline with the default configuration.
pub fn process<'a, T: Record>(
    records: &'a [T],
    filter: Option<&FilterSpec>,
    sort: Option<&SortSpec>,
    search: Option<&SearchSpec>,
    pagination: Option<&PaginationSpec>,
) -> QueryOutcome<'a, T> {
    QueryEngine::default().process(records, filter, sort, search, pagination)
}
