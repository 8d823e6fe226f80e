//! Offset and cursor pagination over an ordered sequence.
//!
//! Offset pages are addressed by number. Cursor pages resume strictly after
//! the last item of the previous page, which keeps paging stable when the
//! underlying collection changes between calls.
//!
//! Invalid input never fails: a limit below one becomes the default limit,
//! a page below one becomes page one, and an unreadable cursor token starts
//! over from the first item.

use std::ops::Range;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, DEFAULT_LIMIT};
use crate::error::{QueryError, Result};
use crate::record::Record;

/// Which slice of the ordered result to return.
///
/// Page and limit are signed so out-of-range request values can be handed
/// over as-is and clamped here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationSpec {
    /// Page `page` (1-based) of `limit` items.
    Offset { page: i64, limit: i64 },
    /// `limit` items after the position encoded in `token`; no token means
    /// the first page.
    Cursor {
        #[serde(default)]
        token: Option<String>,
        limit: i64,
    },
}

impl PaginationSpec {
    /// Offset page.
    pub fn offset(page: i64, limit: i64) -> Self {
        PaginationSpec::Offset { page, limit }
    }

    /// First cursor page.
    pub fn first(limit: i64) -> Self {
        PaginationSpec::Cursor { token: None, limit }
    }

    /// Cursor page following `token`.
    pub fn after(token: impl Into<String>, limit: i64) -> Self {
        PaginationSpec::Cursor {
            token: Some(token.into()),
            limit,
        }
    }
}

/// Pagination metadata returned with every page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationResponse {
    /// Number of items in the full ordered result.
    pub total_items: usize,
    /// 1-based page number; not set in cursor mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<usize>,
    pub has_next: bool,
    pub has_prev: bool,
    /// Token for the following cursor page, only when more items remain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Resume position carried inside a cursor token.
///
/// `position` is the index of the first item not yet returned. `key` is the
/// anchor value of the last returned item when the paginator has a cursor
/// key configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorToken {
    #[serde(rename = "p")]
    pub position: usize,
    #[serde(rename = "k", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl CursorToken {
    /// Encodes the token as URL-safe base64 text.
    pub fn encode(&self) -> String {
        // Serializing a struct of a usize and a string cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decodes a token produced by [`CursorToken::encode`].
    pub fn decode(token: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| QueryError::invalid_cursor(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| QueryError::invalid_cursor(e.to_string()))
    }
}

/// Slices ordered sequences into pages.
#[derive(Debug, Clone)]
pub struct Paginator {
    default_limit: usize,
    cursor_key: Option<String>,
}

impl Default for Paginator {
    fn default() -> Self {
        Paginator::new(DEFAULT_LIMIT)
    }
}

impl Paginator {
    /// Creates a paginator; a zero default limit is replaced by 10.
    pub fn new(default_limit: usize) -> Self {
        Paginator {
            default_limit: if default_limit == 0 {
                DEFAULT_LIMIT
            } else {
                default_limit
            },
            cursor_key: None,
        }
    }

    /// Anchors cursor tokens on the value of `field`.
    pub fn with_cursor_key(mut self, field: impl Into<String>) -> Self {
        self.cursor_key = Some(field.into());
        self
    }

    /// Builds a paginator from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        let paginator = Paginator::new(config.default_limit);
        match &config.cursor_key {
            Some(key) => paginator.with_cursor_key(key.clone()),
            None => paginator,
        }
    }

    /// Returns the page of `items` selected by `spec`.
    ///
    /// Without a spec the whole sequence is one page.
    pub fn paginate<'a, R: Record>(
        &self,
        items: &'a [R],
        spec: Option<&PaginationSpec>,
    ) -> (&'a [R], PaginationResponse) {
        let (range, response) = self.window(items, spec);
        (&items[range], response)
    }

    /// Computes the index range of the selected page and its metadata.
    pub fn window<R: Record>(
        &self,
        items: &[R],
        spec: Option<&PaginationSpec>,
    ) -> (Range<usize>, PaginationResponse) {
        let total = items.len();
        match spec {
            None => (
                0..total,
                PaginationResponse {
                    total_items: total,
                    current_page: Some(1),
                    total_pages: Some(usize::from(total > 0)),
                    ..PaginationResponse::default()
                },
            ),
            Some(PaginationSpec::Offset { page, limit }) => {
                self.offset_window(total, *page, self.effective_limit(*limit))
            }
            Some(PaginationSpec::Cursor { token, limit }) => {
                self.cursor_window(items, token.as_deref(), self.effective_limit(*limit))
            }
        }
    }

    fn effective_limit(&self, limit: i64) -> usize {
        if limit < 1 {
            self.default_limit
        } else {
            usize::try_from(limit).unwrap_or(usize::MAX)
        }
    }

    fn offset_window(
        &self,
        total: usize,
        page: i64,
        limit: usize,
    ) -> (Range<usize>, PaginationResponse) {
        let page = usize::try_from(page.max(1)).unwrap_or(usize::MAX);
        let total_pages = total.div_ceil(limit);
        let start = (page - 1).saturating_mul(limit).min(total);
        let end = start.saturating_add(limit).min(total);

        (
            start..end,
            PaginationResponse {
                total_items: total,
                current_page: Some(page),
                total_pages: Some(total_pages),
                has_next: page < total_pages,
                has_prev: page > 1,
                next_page_token: None,
            },
        )
    }

    fn cursor_window<R: Record>(
        &self,
        items: &[R],
        token: Option<&str>,
        limit: usize,
    ) -> (Range<usize>, PaginationResponse) {
        let total = items.len();
        let start = match token.filter(|t| !t.trim().is_empty()) {
            None => 0,
            Some(token) => match CursorToken::decode(token) {
                Ok(cursor) => self.resume_at(items, &cursor),
                Err(err) => {
                    tracing::warn!(error = %err, "unreadable cursor token, restarting from the first page");
                    0
                }
            },
        };
        let end = start.saturating_add(limit).min(total);
        let has_next = end < total;

        let next_page_token = has_next.then(|| {
            CursorToken {
                position: end,
                key: self.anchor_of(&items[end - 1]),
            }
            .encode()
        });

        (
            start..end,
            PaginationResponse {
                total_items: total,
                current_page: None,
                total_pages: Some(total.div_ceil(limit)),
                has_next,
                has_prev: start > 0,
                next_page_token,
            },
        )
    }

    fn anchor_of<R: Record>(&self, item: &R) -> Option<String> {
        let field = self.cursor_key.as_deref()?;
        item.field_value(field).key_string()
    }

    /// The anchor record wins over the stored position: if records were
    /// inserted or removed before it, the position is stale but the anchor
    /// still marks where the previous page ended. Anchor values need not be
    /// unique, so the match closest to the stored position is taken.
    fn resume_at<R: Record>(&self, items: &[R], cursor: &CursorToken) -> usize {
        let fallback = cursor.position.min(items.len());
        let (Some(field), Some(key)) = (self.cursor_key.as_deref(), cursor.key.as_deref()) else {
            return fallback;
        };
        let is_anchor =
            |index: usize| items[index].field_value(field).key_string().as_deref() == Some(key);

        // The previous page ended at `position - 1`; search outward from there.
        let expected = fallback.saturating_sub(1);
        (0..items.len())
            .flat_map(|distance| {
                let below = expected.checked_sub(distance).filter(|_| distance > 0);
                [expected.checked_add(distance), below]
            })
            .flatten()
            .filter(|&index| index < items.len())
            .find(|&index| is_anchor(index))
            .map_or(fallback, |index| index + 1)
    }
}

/// Paginates with the default paginator.
pub fn paginate<'a, R: Record>(
    items: &'a [R],
    spec: Option<&PaginationSpec>,
) -> (&'a [R], PaginationResponse) {
    Paginator::default().paginate(items, spec)
}
