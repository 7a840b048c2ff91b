//! Linear fill-in-the-blanks conversation
//!
//! The conversation always asks about the first placeholder, in discovery
//! order, that has no value yet. Each answer is stored on the record and the
//! preview text is recomputed.

use docfill_ooxml::Placeholder;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::DocumentRecord;

/// "set it to X", "make this X", "use that as X", ...
static SET_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:set|make|use|put)\s+(?:it|this|that)\s+(?:to|as|equal to)?\s*(.+)")
        .expect("static regex")
});

const ALL_FILLED: &str =
    "All placeholders are now filled! You can review the document and download it when ready.";

const NOTHING_PENDING: &str =
    "All placeholders are filled! You can review the document and download it when ready.";

/// Stateful fill sequencer over one document record
#[derive(Debug, Clone)]
pub struct Conversation {
    record: DocumentRecord,
}

impl Conversation {
    pub fn new(record: DocumentRecord) -> Self {
        Self { record }
    }

    /// Opening message
    pub fn greeting(&self) -> String {
        let count = self.record.placeholders.len();
        format!(
            "I found {} placeholder{} in your document. Let's fill them in! What would you like to start with?",
            count,
            if count == 1 { "" } else { "s" }
        )
    }

    /// The placeholder the next answer will fill
    pub fn current(&self) -> Option<&Placeholder> {
        self.record.next_unfilled()
    }

    /// Take the user's answer for the current placeholder
    ///
    /// Returns `None` for blank input; otherwise the reply to show.
    pub fn answer(&mut self, input: &str) -> Option<String> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let Some(current) = self.current() else {
            return Some(NOTHING_PENDING.to_string());
        };
        let (id, key) = (current.id.clone(), current.key.clone());
        let value = extract_value(input);
        self.record.set_value(&id, value);

        let reply = match self.current() {
            Some(next) => format!(
                "Got it! I've set \"{}\" to \"{}\". Next, what should \"{}\" be?",
                key, value, next.key
            ),
            None => format!(
                "Perfect! I've set \"{}\" to \"{}\". {}",
                key, value, ALL_FILLED
            ),
        };
        Some(reply)
    }

    /// Set a specific placeholder directly, bypassing the question order
    ///
    /// Returns `None` when no placeholder has this id.
    pub fn quick_fill(&mut self, id: &str, value: &str) -> Option<String> {
        let key = self.record.placeholder(id)?.key.clone();
        self.record.set_value(id, value);
        tracing::debug!(placeholder = %key, "quick fill");

        let reply = match self.current() {
            Some(next) => format!(
                "I've set \"{}\" to \"{}\". Next, what should \"{}\" be?",
                key, value, next.key
            ),
            None => format!("I've set \"{}\" to \"{}\". {}", key, value, ALL_FILLED),
        };
        Some(reply)
    }

    /// Handle one line of user input
    ///
    /// `key = value` naming a known placeholder sets it directly through
    /// [`Conversation::quick_fill`]; anything else answers the current
    /// question.
    pub fn respond(&mut self, input: &str) -> Option<String> {
        if let Some((id, value)) = self.quick_fill_target(input) {
            return self.quick_fill(&id, &value);
        }
        self.answer(input)
    }

    fn quick_fill_target(&self, input: &str) -> Option<(String, String)> {
        let (key, value) = input.split_once('=')?;
        let (key, value) = (key.trim(), value.trim());
        if value.is_empty() {
            return None;
        }
        self.record
            .placeholders
            .iter()
            .find(|p| p.key == key)
            .map(|p| (p.id.clone(), value.to_string()))
    }

    /// `(filled, total)`
    pub fn progress(&self) -> (usize, usize) {
        self.record.progress()
    }

    pub fn is_complete(&self) -> bool {
        self.record.is_complete()
    }

    pub fn record(&self) -> &DocumentRecord {
        &self.record
    }

    pub fn into_record(self) -> DocumentRecord {
        self.record
    }
}

/// The value carried by an answer: the tail of a "set it to X" phrase, or
/// the whole input
fn extract_value(input: &str) -> &str {
    SET_VALUE_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfill_ooxml::discover;

    fn conversation(text: &str) -> Conversation {
        Conversation::new(DocumentRecord::new("doc", text, discover(text)))
    }

    #[test]
    fn test_greeting_pluralizes() {
        assert_eq!(
            conversation("{{a}} {{b}}").greeting(),
            "I found 2 placeholders in your document. Let's fill them in! What would you like to start with?"
        );
        assert!(conversation("{{a}}")
            .greeting()
            .starts_with("I found 1 placeholder in your document."));
        assert!(conversation("none").greeting().starts_with("I found 0 placeholders"));
    }

    #[test]
    fn test_answers_follow_discovery_order() {
        let mut chat = conversation("Dear {{name}}, pay [amount].");
        assert_eq!(chat.current().unwrap().key, "name");

        assert_eq!(
            chat.answer("Alex").unwrap(),
            "Got it! I've set \"name\" to \"Alex\". Next, what should \"amount\" be?"
        );
        assert_eq!(
            chat.answer("  $10  ").unwrap(),
            "Perfect! I've set \"amount\" to \"$10\". All placeholders are now filled! You can review the document and download it when ready."
        );
        assert!(chat.is_complete());
        assert_eq!(chat.record().filled_text, "Dear Alex, pay $10.");
    }

    #[test]
    fn test_set_phrases_extract_the_value() {
        assert_eq!(extract_value("set it to Acme Corp"), "Acme Corp");
        assert_eq!(extract_value("Make this 42"), "42");
        assert_eq!(extract_value("use that as Jan 1"), "Jan 1");
        assert_eq!(extract_value("please put it equal to 7"), "7");
        assert_eq!(extract_value("Acme Corp"), "Acme Corp");
    }

    #[test]
    fn test_blank_answer_is_ignored() {
        let mut chat = conversation("{{a}}");
        assert_eq!(chat.answer("   "), None);
        assert_eq!(chat.progress(), (0, 1));
    }

    #[test]
    fn test_answer_after_completion() {
        let mut chat = conversation("{{a}}");
        chat.answer("x");
        assert_eq!(chat.answer("more").unwrap(), NOTHING_PENDING);
        assert_eq!(chat.record().placeholders[0].value, "x");
    }

    #[test]
    fn test_quick_fill_out_of_order() {
        let mut chat = conversation("{{a}} {{b}} {{c}}");
        let b = chat.record().placeholders[1].id.clone();

        assert_eq!(
            chat.quick_fill(&b, "B").unwrap(),
            "I've set \"b\" to \"B\". Next, what should \"a\" be?"
        );
        assert_eq!(chat.progress(), (1, 3));
        assert_eq!(chat.current().unwrap().key, "a");
        assert_eq!(chat.quick_fill("missing", "x"), None);
    }

    #[test]
    fn test_respond_routes_key_value_input_to_quick_fill() {
        let mut chat = conversation("{{a}} {{b}} {{c}}");

        assert_eq!(
            chat.respond("c = 3").unwrap(),
            "I've set \"c\" to \"3\". Next, what should \"a\" be?"
        );
        assert_eq!(chat.record().placeholders[2].value, "3");

        // Unknown keys and blank values are ordinary answers for `a`
        assert!(chat.respond("x = 1").unwrap().starts_with("Got it! I've set \"a\" to \"x = 1\"."));
        assert!(chat.respond("c =").unwrap().starts_with("Perfect! I've set \"b\" to \"c =\"."));
        assert!(chat.is_complete());
    }

    #[test]
    fn test_current_returns_to_cleared_placeholder() {
        let mut chat = conversation("{{a}} {{b}}");
        let a = chat.record().placeholders[0].id.clone();
        chat.answer("1");
        chat.answer("2");
        assert!(chat.is_complete());

        chat.quick_fill(&a, "");
        assert_eq!(chat.current().unwrap().key, "a");
    }
}
