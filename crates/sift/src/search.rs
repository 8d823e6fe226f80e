//! Free-text relevance scoring and highlighting.
//!
//! A query is split on whitespace into case-insensitive terms. Every term is
//! looked up in every searched field and weighted by how it matched:
//!
//! ```text
//! exact (whole field, ignoring case) > prefix > substring > no match (0)
//! ```
//!
//! The record's score is the sum over terms and fields. Each field that
//! scored gets a snippet where the earliest matching substring is wrapped in
//! the configured markers, in the field's original casing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{HighlightMarkers, MatchWeights};
use crate::record::Record;
use crate::value::Value;

/// A free-text search request.
///
/// An empty `fields` list searches every string-valued field of the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpec {
    pub query: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl SearchSpec {
    /// Searches all string fields.
    pub fn new(query: impl Into<String>) -> Self {
        SearchSpec {
            query: query.into(),
            fields: Vec::new(),
        }
    }

    /// Restricts the search to the given fields.
    pub fn in_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Lowercased, de-duplicated query terms in query order.
    ///
    /// Terms are folded char by char, the same way field text is folded
    /// while matching.
    pub fn terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        for term in self.query.split_whitespace().map(fold_case) {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
        terms
    }

    /// Returns `true` if the query has no terms.
    pub fn is_blank(&self) -> bool {
        self.query.split_whitespace().next().is_none()
    }
}

/// Relevance of one record: its score and a snippet per matching field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub score: f64,
    pub highlights: BTreeMap<String, String>,
}

impl SearchResult {
    /// Returns `true` if nothing matched.
    pub fn is_miss(&self) -> bool {
        self.score <= 0.0
    }
}

/// Scores records against a [`SearchSpec`].
#[derive(Debug, Clone, Default)]
pub struct SearchScorer {
    weights: MatchWeights,
    markers: HighlightMarkers,
}

impl SearchScorer {
    /// Creates a scorer. Negative weights are treated as zero.
    pub fn new(weights: MatchWeights, markers: HighlightMarkers) -> Self {
        SearchScorer {
            weights: MatchWeights {
                exact: weights.exact.max(0.0),
                prefix: weights.prefix.max(0.0),
                substring: weights.substring.max(0.0),
            },
            markers,
        }
    }

    /// Scores one record.
    pub fn score<R: Record + ?Sized>(&self, record: &R, spec: &SearchSpec) -> SearchResult {
        self.score_terms(record, &spec.terms(), &spec.fields)
    }

    /// Scores one record against already tokenized terms.
    ///
    /// The pipeline tokenizes once per call and scores every record with the
    /// same terms.
    pub fn score_terms<R: Record + ?Sized>(
        &self,
        record: &R,
        terms: &[String],
        fields: &[String],
    ) -> SearchResult {
        let mut result = SearchResult {
            score: 0.0,
            highlights: BTreeMap::new(),
        };
        if terms.is_empty() {
            return result;
        }

        let searched: Vec<&str> = if fields.is_empty() {
            record.field_names()
        } else {
            let mut unique: Vec<&str> = Vec::with_capacity(fields.len());
            for field in fields {
                if !unique.contains(&field.as_str()) {
                    unique.push(field);
                }
            }
            unique
        };

        for field in searched {
            let Value::String(text) = record.field_value(field) else {
                continue;
            };

            let mut field_score = 0.0;
            let mut first: Option<(usize, usize)> = None;
            for term in terms {
                let Some((start, end)) = find_ignore_case(text, term) else {
                    continue;
                };
                field_score += if start == 0 && end == text.len() {
                    self.weights.exact
                } else if start == 0 {
                    self.weights.prefix
                } else {
                    self.weights.substring
                };
                first = match first {
                    Some((s, e)) if s < start || (s == start && e >= end) => Some((s, e)),
                    _ => Some((start, end)),
                };
            }

            if field_score > 0.0 {
                if let Some((start, end)) = first {
                    result.score += field_score;
                    result
                        .highlights
                        .insert(field.to_string(), self.mark(text, start, end));
                }
            }
        }

        result
    }

    fn mark(&self, text: &str, start: usize, end: usize) -> String {
        let mut out = String::with_capacity(
            text.len() + self.markers.open.len() + self.markers.close.len(),
        );
        out.push_str(&text[..start]);
        out.push_str(&self.markers.open);
        out.push_str(&text[start..end]);
        out.push_str(&self.markers.close);
        out.push_str(&text[end..]);
        out
    }
}

/// Scores one record with default weights and markers.
pub fn score<R: Record + ?Sized>(record: &R, spec: &SearchSpec) -> SearchResult {
    SearchScorer::default().score(record, spec)
}

// Per-char lowercasing. `str::to_lowercase` is context sensitive (a final
// sigma becomes `ς`), which would disagree with `match_len_at`.
fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Finds the earliest case-insensitive occurrence of a lowercase `needle`.
///
/// Returns byte offsets into `haystack`, always on char boundaries, so the
/// matched text can be sliced out with its original casing.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .char_indices()
        .find_map(|(start, _)| match_len_at(&haystack[start..], needle).map(|len| (start, start + len)))
}

fn match_len_at(haystack: &str, needle: &str) -> Option<usize> {
    let mut expected = needle.chars();
    for (offset, c) in haystack.char_indices() {
        for lower in c.to_lowercase() {
            if expected.next() != Some(lower) {
                return None;
            }
        }
        if expected.as_str().is_empty() {
            return Some(offset + c.len_utf8());
        }
    }
    None
}
