//! XML substitution engine
//!
//! Rewrites placeholder tokens inside one XML part (document body, header or
//! footer) without touching anything else. Substitution runs as a two-stage
//! pipeline over a list of segments:
//!
//! 1. **Exact match**: one combined scan replaces the literal forms
//!    `{{key}}`, `[key]` and `{key}` for every key at once.
//! 2. **Recovery**: for keys whose text is still present, tokens whose
//!    brackets were split from the key by run boundaries (Word stores a
//!    formatting change mid-token as a new `<w:r>`) are located, checked
//!    with the markup stripped, and replaced as a whole span. The markup
//!    that split the token is dropped with it.
//!
//! Inserted values become [`Segment::Filled`] and are never scanned again,
//! so one key's value can never be matched by another key.
//!
//! ```
//! use docfill_ooxml::{fill_xml, FillValues};
//!
//! let values: FillValues = [("name", "O'Brien & Co.")].into_iter().collect();
//! let xml = "<w:t>Dear {{name}},</w:t>";
//! assert_eq!(fill_xml(xml, &values), "<w:t>Dear O&apos;Brien &amp; Co.,</w:t>");
//! ```

use std::collections::HashMap;

use regex::{Captures, Regex};
use serde::Serialize;

use crate::grammar::{
    escape_text, escape_xml, exact_capture, exact_token_regex, strip_markup, Bracket,
};
use crate::placeholder::Placeholder;

/// Key → value map used for substitution
///
/// Blank values are dropped on insertion: an unanswered placeholder is left
/// in the document verbatim. Insertion order is kept.
#[derive(Debug, Clone, Default)]
pub struct FillValues {
    entries: Vec<FillEntry>,
}

#[derive(Debug, Clone)]
struct FillEntry {
    key: String,
    /// The key as it is serialized in character data
    markup_key: String,
    /// The value with XML reserved characters escaped
    value: String,
}

impl FillValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a placeholder list, skipping unfilled placeholders
    pub fn from_placeholders(placeholders: &[Placeholder]) -> Self {
        placeholders
            .iter()
            .map(|p| (p.key.as_str(), p.value.as_str()))
            .collect()
    }

    /// Add a value for `key`
    ///
    /// Returns `false` (and stores nothing) when the key is empty or the
    /// value is blank. A later value for the same key replaces the earlier
    /// one but keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl AsRef<str>) -> bool {
        let key = key.into();
        let value = value.as_ref();
        if key.is_empty() || value.trim().is_empty() {
            return false;
        }

        let escaped = escape_xml(value);
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) {
            entry.value = escaped;
        } else {
            self.entries.push(FillEntry {
                markup_key: escape_text(&key),
                key,
                value: escaped,
            });
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys with a usable value, in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }
}

impl<K: Into<String>, V: AsRef<str>> FromIterator<(K, V)> for FillValues {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut values = FillValues::new();
        for (key, value) in iter {
            values.insert(key, value);
        }
        values
    }
}

/// Per-key progress through the pipeline
///
/// `Unresolved → ExactMatched | RecoveredFromMarkup → Done`. A key reaches
/// `Done` once none of its text remains in unsubstituted content; recovery
/// only runs for keys that are not `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyState {
    Unresolved,
    ExactMatched,
    RecoveredFromMarkup,
    Done,
}

impl KeyState {
    fn exact_matched(self) -> Self {
        match self {
            KeyState::Unresolved => KeyState::ExactMatched,
            other => other,
        }
    }

    fn recovered(self) -> Self {
        match self {
            KeyState::Done => KeyState::Done,
            _ => KeyState::RecoveredFromMarkup,
        }
    }

    pub fn is_done(self) -> bool {
        self == KeyState::Done
    }
}

/// What happened to one key in one part
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyOutcome {
    pub key: String,
    pub state: KeyState,
    /// Substitutions made by the exact stage
    pub exact: usize,
    /// Substitutions made by the recovery stage
    pub recovered: usize,
}

impl KeyOutcome {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            state: KeyState::Unresolved,
            exact: 0,
            recovered: 0,
        }
    }

    pub fn substitutions(&self) -> usize {
        self.exact + self.recovered
    }

    /// The key never occurred in a recognized placeholder span
    pub fn is_inert(&self) -> bool {
        self.substitutions() == 0
    }
}

/// Substitution summary for one part
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FillReport {
    pub outcomes: Vec<KeyOutcome>,
}

impl FillReport {
    /// Outcome for `key`, if it had a value
    pub fn get(&self, key: &str) -> Option<&KeyOutcome> {
        self.outcomes.iter().find(|o| o.key == key)
    }

    /// Total substitutions across all keys
    pub fn total(&self) -> usize {
        self.outcomes.iter().map(KeyOutcome::substitutions).sum()
    }

    /// Fold another part's report into this one, summing counts per key
    pub fn merge(&mut self, other: FillReport) {
        for outcome in other.outcomes {
            match self.outcomes.iter_mut().find(|o| o.key == outcome.key) {
                Some(existing) => {
                    existing.exact += outcome.exact;
                    existing.recovered += outcome.recovered;
                    if existing.state.is_done() && !outcome.state.is_done() {
                        existing.state = outcome.state;
                    }
                }
                None => self.outcomes.push(outcome),
            }
        }
    }
}

/// A piece of the part being rewritten
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Original content, still eligible for matching
    Source(String),
    /// An inserted value
    Filled(String),
}

/// Substitute every present key in `xml`
pub fn fill_xml(xml: &str, values: &FillValues) -> String {
    fill_xml_with_report(xml, values).0
}

/// Substitute every present key in `xml` and report what happened per key
pub fn fill_xml_with_report(xml: &str, values: &FillValues) -> (String, FillReport) {
    let mut outcomes: Vec<KeyOutcome> = values
        .entries
        .iter()
        .map(|e| KeyOutcome::new(&e.key))
        .collect();
    if values.is_empty() || xml.is_empty() {
        for outcome in &mut outcomes {
            outcome.state = KeyState::Done;
        }
        return (xml.to_string(), FillReport { outcomes });
    }

    let segments = vec![Segment::Source(xml.to_string())];
    let segments = exact_stage(segments, values, &mut outcomes);
    let segments = recovery_stage(segments, values, &mut outcomes);

    (render(&segments), FillReport { outcomes })
}

fn exact_stage(
    segments: Vec<Segment>,
    values: &FillValues,
    outcomes: &mut [KeyOutcome],
) -> Vec<Segment> {
    let index: HashMap<&str, usize> = values
        .entries
        .iter()
        .enumerate()
        .map(|(i, e)| (e.markup_key.as_str(), i))
        .collect();

    let segments = match exact_token_regex(values.entries.iter().map(|e| e.markup_key.as_str())) {
        Some(re) => {
            let (segments, _) = splice(segments, &re, |caps| {
                let (_, key) = exact_capture(caps)?;
                let i = *index.get(key)?;
                outcomes[i].exact += 1;
                Some(values.entries[i].value.clone())
            });
            segments
        }
        None => segments,
    };

    for (entry, outcome) in values.entries.iter().zip(outcomes.iter_mut()) {
        if outcome.exact > 0 {
            outcome.state = outcome.state.exact_matched();
        }
        if !source_contains(&segments, &entry.markup_key) {
            outcome.state = KeyState::Done;
        }
    }
    segments
}

fn recovery_stage(
    mut segments: Vec<Segment>,
    values: &FillValues,
    outcomes: &mut [KeyOutcome],
) -> Vec<Segment> {
    for (entry, outcome) in values.entries.iter().zip(outcomes.iter_mut()) {
        if outcome.state.is_done() {
            continue;
        }

        let escaped_key = regex::escape(&entry.markup_key);
        for bracket in Bracket::ALL {
            let re = match Regex::new(&bracket.split_pattern(&escaped_key)) {
                Ok(re) => re,
                Err(e) => {
                    tracing::warn!("Skipping recovery for key {:?}: {}", entry.key, e);
                    continue;
                }
            };
            let (next, hits) = splice(segments, &re, |caps| {
                let span = caps.get(0)?.as_str();
                is_split_token(bracket, &entry.markup_key, span).then(|| entry.value.clone())
            });
            segments = next;
            if hits > 0 {
                tracing::debug!(key = %entry.key, ?bracket, hits, "recovered split placeholder");
                outcome.recovered += hits;
                outcome.state = outcome.state.recovered();
            }
        }

        if !source_contains(&segments, &entry.markup_key) {
            outcome.state = KeyState::Done;
        }
    }
    segments
}

/// Whether a span matched by a split pattern really is one placeholder
fn is_split_token(bracket: Bracket, markup_key: &str, span: &str) -> bool {
    let cleaned = strip_markup(span);
    if bracket == Bracket::SingleBrace && cleaned.starts_with("{{") {
        return false;
    }
    cleaned == bracket.wrap(markup_key) || cleaned.contains(markup_key)
}

/// Replace the matches of `re` inside source segments
///
/// `replace` returns the value to insert, or `None` to leave the match as
/// it is. Returns the new segments and the number of replacements.
fn splice<F>(segments: Vec<Segment>, re: &Regex, mut replace: F) -> (Vec<Segment>, usize)
where
    F: FnMut(&Captures<'_>) -> Option<String>,
{
    let mut out = Vec::with_capacity(segments.len());
    let mut hits = 0;

    for segment in segments {
        let text = match segment {
            Segment::Source(text) => text,
            filled => {
                out.push(filled);
                continue;
            }
        };

        let mut last = 0;
        for caps in re.captures_iter(&text) {
            let Some(m) = caps.get(0) else { continue };
            if let Some(value) = replace(&caps) {
                if m.start() > last {
                    out.push(Segment::Source(text[last..m.start()].to_string()));
                }
                out.push(Segment::Filled(value));
                last = m.end();
                hits += 1;
            }
        }

        if last == 0 {
            out.push(Segment::Source(text));
        } else if last < text.len() {
            out.push(Segment::Source(text[last..].to_string()));
        }
    }

    (out, hits)
}

fn source_contains(segments: &[Segment], needle: &str) -> bool {
    segments.iter().any(|s| match s {
        Segment::Source(text) => text.contains(needle),
        Segment::Filled(_) => false,
    })
}

fn render(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Source(text) | Segment::Filled(text) => out.push_str(text),
        }
    }
    out
}
