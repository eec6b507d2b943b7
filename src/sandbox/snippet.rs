//! The snippet value handed to the engine by the surrounding application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sandbox::language::Language;

/// A unit of source text in a declared language.
///
/// Immutable once constructed. The engine treats `code` as untrusted input
/// regardless of who authored the snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub id: String,
    pub title: String,
    pub language: Language,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Snippet {
    /// Create a snippet with the current time as its creation timestamp.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        language: Language,
        code: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            language,
            code: code.into(),
            description: None,
            tags: Vec::new(),
            author: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_timestamps() {
        let snippet = Snippet::new("1", "demo", Language::JavaScript, "1 + 1");
        assert!(snippet.created_at.is_some());
        assert_eq!(snippet.created_at, snippet.updated_at);
        assert!(snippet.tags.is_empty());
    }

    #[test]
    fn serde_roundtrip() {
        let snippet = Snippet::new("abc", "demo", Language::Python, "print(1)");
        let json = serde_json::to_string(&snippet).unwrap();
        let back: Snippet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "abc");
        assert_eq!(back.language, Language::Python);
        assert_eq!(back.code, "print(1)");
    }
}
