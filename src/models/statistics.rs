//! Translation statistics.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::pagination::FromListing;
use crate::transport::{decode, Transport};

/// Statistics of a project, component or translation.
///
/// The server adds fields over time; anything not named here is kept in
/// `extra` so rendering shows the complete object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default)]
    pub total: u64,

    #[serde(default)]
    pub total_words: u64,

    #[serde(default)]
    pub translated: u64,

    #[serde(default)]
    pub translated_words: u64,

    #[serde(default)]
    pub translated_percent: f64,

    #[serde(default)]
    pub fuzzy: u64,

    #[serde(default)]
    pub fuzzy_percent: f64,

    #[serde(default, alias = "failing_checks")]
    pub failing: u64,

    #[serde(default, alias = "failing_checks_percent")]
    pub failing_percent: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_change: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-language statistics inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageStats {
    /// Language name.
    pub language: String,

    /// Language code.
    pub code: String,

    #[serde(default)]
    pub total: u64,

    #[serde(default)]
    pub translated: u64,

    #[serde(default)]
    pub translated_percent: f64,

    #[serde(default)]
    pub total_words: u64,

    #[serde(default)]
    pub translated_words: u64,

    #[serde(default)]
    pub words_percent: f64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FromListing for Statistics {
    fn from_listing(_: &Transport, value: Value) -> Result<Self> {
        decode(value)
    }
}

impl FromListing for LanguageStats {
    fn from_listing(_: &Transport, value: Value) -> Result<Self> {
        decode(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_keeps_unknown_fields() {
        let json = r#"{
            "total": 4,
            "total_words": 15,
            "translated": 2,
            "translated_words": 6,
            "translated_percent": 50.0,
            "fuzzy": 0,
            "fuzzy_percent": 0.0,
            "failing": 1,
            "failing_percent": 25.0,
            "recent_changes": 3,
            "last_change": "2024-01-01T10:00:00Z"
        }"#;
        let stats: Statistics = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.failing, 1);
        assert_eq!(stats.extra.get("recent_changes"), Some(&Value::from(3)));
    }

    #[test]
    fn test_language_stats() {
        let json = r#"{
            "language": "Czech",
            "code": "cs",
            "total": 4,
            "translated": 4,
            "translated_percent": 100.0,
            "total_words": 15,
            "translated_words": 15,
            "words_percent": 100.0
        }"#;
        let stats: LanguageStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.code, "cs");
        assert!(stats.extra.is_empty());
    }
}
