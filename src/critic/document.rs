// SPDX-License-Identifier: MIT

//! The document under review and its size limits

use crate::adk::error::CriticError;
use serde::{Deserialize, Serialize};

/// Documents shorter than this many characters are rejected
pub const DEFAULT_MIN_LENGTH: usize = 100;

/// Prompts embed at most this many characters of the document
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 2000;

/// The text being reviewed plus an optional focus area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    focus: Option<String>,
}

impl Document {
    pub fn new(content: impl Into<String>, focus: Option<String>) -> Self {
        Self {
            content: content.into(),
            focus: focus.filter(|f| !f.trim().is_empty()),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Length in characters, not bytes
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Validation and truncation bounds applied to every document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentLimits {
    pub min_length: usize,
    pub max_prompt_chars: usize,
}

impl Default for DocumentLimits {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
        }
    }
}

impl DocumentLimits {
    /// Reject documents below the minimum length
    pub fn validate(&self, document: &Document) -> Result<(), CriticError> {
        let len = document.content().trim().chars().count();
        if len < self.min_length {
            return Err(CriticError::invalid_input(format!(
                "resume must be at least {} characters, got {}",
                self.min_length, len
            )));
        }
        Ok(())
    }

    /// The prefix of the document embedded in prompts.
    ///
    /// Returns the prefix and whether anything was cut off.
    pub fn excerpt<'a>(&self, document: &'a Document) -> (&'a str, bool) {
        let content = document.content();
        match content.char_indices().nth(self.max_prompt_chars) {
            Some((byte_idx, _)) => (&content[..byte_idx], true),
            None => (content, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_document_rejected() {
        let doc = Document::new("too short", None);
        let err = DocumentLimits::default().validate(&doc).unwrap_err();
        assert!(matches!(err, CriticError::InvalidInput(_)));
    }

    #[test]
    fn test_whitespace_does_not_count() {
        let doc = Document::new(format!("{}{}", " ".repeat(200), "x"), None);
        assert!(DocumentLimits::default().validate(&doc).is_err());
    }

    #[test]
    fn test_minimum_length_is_inclusive() {
        let doc = Document::new("a".repeat(100), None);
        assert!(DocumentLimits::default().validate(&doc).is_ok());
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let limits = DocumentLimits {
            min_length: 1,
            max_prompt_chars: 3,
        };
        let doc = Document::new("नमस्ते दुनिया", None);
        let (excerpt, truncated) = limits.excerpt(&doc);
        assert!(truncated);
        assert_eq!(excerpt.chars().count(), 3);
    }

    #[test]
    fn test_excerpt_keeps_short_content() {
        let doc = Document::new("short resume", None);
        let (excerpt, truncated) = DocumentLimits::default().excerpt(&doc);
        assert!(!truncated);
        assert_eq!(excerpt, "short resume");
    }

    #[test]
    fn test_blank_focus_is_dropped() {
        let doc = Document::new("content", Some("   ".to_string()));
        assert!(doc.focus().is_none());
    }
}
