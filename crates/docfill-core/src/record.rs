//! The persisted companion record of an uploaded document

use docfill_ooxml::{fill_text, FillValues, Placeholder};
use serde::{Deserialize, Serialize};

/// What the store keeps next to each uploaded blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    /// Flattened text the placeholders were discovered in
    pub original_text: String,
    /// Placeholders in discovery order
    pub placeholders: Vec<Placeholder>,
    /// Preview of `original_text` with the current values substituted
    pub filled_text: String,
}

impl DocumentRecord {
    /// A freshly uploaded document: nothing filled, preview equals the text
    pub fn new(
        id: impl Into<String>,
        original_text: impl Into<String>,
        placeholders: Vec<Placeholder>,
    ) -> Self {
        let original_text = original_text.into();
        Self {
            id: id.into(),
            filled_text: original_text.clone(),
            original_text,
            placeholders,
        }
    }

    pub fn placeholder(&self, id: &str) -> Option<&Placeholder> {
        self.placeholders.iter().find(|p| p.id == id)
    }

    /// Set the value of placeholder `id` and refresh the preview
    ///
    /// Returns `false` when no placeholder has that id.
    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> bool {
        let Some(placeholder) = self.placeholders.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        placeholder.value = value.into();
        self.refresh_filled_text();
        true
    }

    /// Recompute `filled_text` from `original_text` and the current values
    pub fn refresh_filled_text(&mut self) {
        self.filled_text = fill_text(&self.original_text, &self.placeholders);
    }

    /// First placeholder still waiting for a value
    pub fn next_unfilled(&self) -> Option<&Placeholder> {
        self.placeholders.iter().find(|p| !p.is_filled())
    }

    /// `(filled, total)` placeholder counts
    pub fn progress(&self) -> (usize, usize) {
        let filled = self.placeholders.iter().filter(|p| p.is_filled()).count();
        (filled, self.placeholders.len())
    }

    pub fn is_complete(&self) -> bool {
        self.next_unfilled().is_none()
    }

    /// Substitution values for the engine
    pub fn values(&self) -> FillValues {
        FillValues::from_placeholders(&self.placeholders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfill_ooxml::discover;

    fn record() -> DocumentRecord {
        let text = "Dear {{name}}, you owe {amount}.\n\n";
        DocumentRecord::new("doc-1", text, discover(text))
    }

    #[test]
    fn test_new_record_preview_is_original_text() {
        let record = record();
        assert_eq!(record.filled_text, record.original_text);
        assert_eq!(record.progress(), (0, 2));
        assert!(!record.is_complete());
    }

    #[test]
    fn test_set_value_refreshes_preview() {
        let mut record = record();
        let id = record.placeholders[0].id.clone();

        assert!(record.set_value(&id, "Alex"));
        assert_eq!(record.filled_text, "Dear Alex, you owe [amount].\n\n");
        assert_eq!(record.progress(), (1, 2));
        assert_eq!(record.next_unfilled().unwrap().key, "amount");
    }

    #[test]
    fn test_set_value_unknown_id() {
        let mut record = record();
        assert!(!record.set_value("nope", "x"));
        assert_eq!(record.filled_text, record.original_text);
    }

    #[test]
    fn test_blank_value_counts_as_unfilled() {
        let mut record = record();
        let id = record.placeholders[0].id.clone();
        record.set_value(&id, "   ");
        assert_eq!(record.progress(), (0, 2));
        assert!(record.values().is_empty());
    }

    #[test]
    fn test_json_shape_is_camel_case() {
        let record = DocumentRecord::new("doc-1", "text", Vec::new());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "doc-1",
                "originalText": "text",
                "placeholders": [],
                "filledText": "text"
            })
        );
    }
}
