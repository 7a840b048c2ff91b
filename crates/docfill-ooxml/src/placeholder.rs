//! Placeholder discovery
//!
//! Scans flattened document text for `{{key}}`, `[key]` and `{key}` tokens
//! and returns one [`Placeholder`] per distinct key, in the order keys are
//! first seen. Every double-brace match is considered before any square
//! bracket match, and those before any single-brace match, so `{{x}}` is
//! recorded once even though `{x}` is also a substring of it.
//!
//! A key is any run of characters up to the shape's closing character, so
//! nested brackets are taken as they come: `{{a{b}c}}` yields the key `{a{b`
//! from the single-brace grammar and `[[x]]` yields `[x`. The single-brace scan
//! skips text already matched as a double-brace token. Unbalanced brackets
//! simply do not match.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grammar::Bracket;

/// A substitutable token found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    /// Opaque identifier, stable for the lifetime of a document session
    #[serde(default)]
    pub id: String,
    /// Trimmed text found inside the brackets
    pub key: String,
    /// Current fill value; empty until the user answers
    #[serde(default)]
    pub value: String,
}

impl Placeholder {
    /// Create an unfilled placeholder with a fresh id
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            key: key.into(),
            value: String::new(),
        }
    }

    /// Builder-style value setter
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Whether a non-blank value has been supplied
    pub fn is_filled(&self) -> bool {
        !self.value.trim().is_empty()
    }
}

/// Discover the distinct placeholders in `text`
pub fn discover(text: &str) -> Vec<Placeholder> {
    discover_keys(text).into_iter().map(Placeholder::new).collect()
}

/// Discover the distinct placeholder keys in `text`, in first-seen order
pub fn discover_keys(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();
    let outside_double = mask_double_brace_tokens(text);

    for bracket in Bracket::ALL {
        let haystack = match bracket {
            Bracket::SingleBrace => outside_double.as_str(),
            _ => text,
        };
        for caps in bracket.discovery_regex().captures_iter(haystack) {
            let key = caps[1].trim();
            if !key.is_empty() && seen.insert(key.to_string()) {
                keys.push(key.to_string());
            }
        }
    }

    keys
}

/// `text` with every double-brace token blanked out, byte for byte
fn mask_double_brace_tokens(text: &str) -> String {
    let mut masked = String::with_capacity(text.len());
    let mut last = 0;
    for m in Bracket::DoubleBrace.discovery_regex().find_iter(text) {
        masked.push_str(&text[last..m.start()]);
        masked.extend(std::iter::repeat(' ').take(m.len()));
        last = m.end();
    }
    masked.push_str(&text[last..]);
    masked
}
