//! Engine configuration.
//!
//! Every field has a default, so an empty document is a valid config:
//!
//! ```yaml
//! default_limit: 25
//! cursor_key: id
//! highlight:
//!   open: "<em>"
//!   close: "</em>"
//! weights:
//!   exact: 5.0
//!   prefix: 2.0
//!   substring: 1.0
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Page size used when a request asks for fewer than one item.
pub const DEFAULT_LIMIT: usize = 10;

/// Tunables for a [`QueryEngine`](crate::QueryEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Replacement for a page size below one.
    pub default_limit: usize,
    /// Markers wrapped around highlighted matches.
    pub highlight: HighlightMarkers,
    /// Relevance weight per match kind.
    pub weights: MatchWeights,
    /// Field whose value anchors cursor tokens, usually the record id.
    pub cursor_key: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_limit: DEFAULT_LIMIT,
            highlight: HighlightMarkers::default(),
            weights: MatchWeights::default(),
            cursor_key: None,
        }
    }
}

impl EngineConfig {
    /// Parses a YAML config document.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str::<EngineConfig>(s)?.sanitized())
    }

    /// Parses a JSON config document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str::<EngineConfig>(s)?.sanitized())
    }

    /// Sets the cursor anchor field.
    pub fn with_cursor_key(mut self, field: impl Into<String>) -> Self {
        self.cursor_key = Some(field.into());
        self
    }

    /// Sets the highlight markers.
    pub fn with_highlight(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.highlight = HighlightMarkers {
            open: open.into(),
            close: close.into(),
        };
        self
    }

    // A zero default limit would make every page empty.
    fn sanitized(mut self) -> Self {
        if self.default_limit == 0 {
            self.default_limit = DEFAULT_LIMIT;
        }
        self
    }
}

/// Delimiters placed around the matched substring in a snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightMarkers {
    pub open: String,
    pub close: String,
}

impl Default for HighlightMarkers {
    fn default() -> Self {
        HighlightMarkers {
            open: "<mark>".to_string(),
            close: "</mark>".to_string(),
        }
    }
}

/// Relevance weights for the three match kinds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchWeights {
    /// The whole field equals the term, ignoring case.
    pub exact: f64,
    /// The field starts with the term.
    pub prefix: f64,
    /// The term occurs elsewhere in the field.
    pub substring: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        MatchWeights {
            exact: 3.0,
            prefix: 2.0,
            substring: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_is_default() {
        let config = EngineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.default_limit, 10);
        assert_eq!(config.highlight.open, "<mark>");
    }

    #[test]
    fn partial_yaml_overrides() {
        let config = EngineConfig::from_yaml_str(
            "default_limit: 25\ncursor_key: id\nhighlight:\n  open: '['\nweights:\n  exact: 9.0\n",
        )
        .unwrap();
        assert_eq!(config.default_limit, 25);
        assert_eq!(config.cursor_key.as_deref(), Some("id"));
        assert_eq!(config.highlight.open, "[");
        assert_eq!(config.highlight.close, "</mark>");
        assert_eq!(config.weights.exact, 9.0);
        assert_eq!(config.weights.prefix, 2.0);
    }

    #[test]
    fn json_config_and_zero_limit() {
        let config = EngineConfig::from_json_str(r#"{"default_limit": 0}"#).unwrap();
        assert_eq!(config.default_limit, DEFAULT_LIMIT);
    }

    #[test]
    fn invalid_config_is_an_error() {
        assert!(EngineConfig::from_yaml_str("default_limit: many").is_err());
        assert!(EngineConfig::from_json_str("{").is_err());
    }
}
