//! Plain-text preview of a filled document
//!
//! Substitutes placeholder values straight into the flattened text used for
//! discovery. An unanswered placeholder is shown as `[key]`.

use std::collections::HashMap;

use crate::grammar::{exact_capture, exact_token_regex, Bracket};
use crate::placeholder::Placeholder;

/// Render `text` with every placeholder replaced by its value
pub fn fill_text(text: &str, placeholders: &[Placeholder]) -> String {
    let display: HashMap<&str, String> = placeholders
        .iter()
        .map(|p| {
            let shown = if p.value.is_empty() {
                Bracket::Square.wrap(&p.key)
            } else {
                p.value.clone()
            };
            (p.key.as_str(), shown)
        })
        .collect();

    let Some(re) = exact_token_regex(placeholders.iter().map(|p| p.key.as_str())) else {
        return text.to_string();
    };

    re.replace_all(text, |caps: &regex::Captures<'_>| {
        exact_capture(caps)
            .and_then(|(_, key)| display.get(key).cloned())
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}
