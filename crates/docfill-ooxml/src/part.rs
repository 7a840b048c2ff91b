//! Text-bearing document parts
//!
//! A [`DocumentPart`] is one named XML member of the package: the main body,
//! a header or a footer. It offers two views of the same content:
//!
//! - [`DocumentPart::text`]: flattened plain text, used for discovery
//! - [`DocumentPart::fill`]: markup-preserving substitution
//!
//! Both views recognize placeholders through the same bracket grammar.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Result;
use crate::fill::{fill_xml_with_report, FillReport, FillValues};
use crate::placeholder::{discover, Placeholder};

/// Which kind of part this is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    /// `word/document.xml`
    Body,
    /// `word/header*.xml`
    Header,
    /// `word/footer*.xml`
    Footer,
}

/// One XML part of a document package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPart {
    name: String,
    kind: PartKind,
    xml: String,
}

impl DocumentPart {
    pub fn new(name: impl Into<String>, kind: PartKind, xml: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            xml: xml.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PartKind {
        self.kind
    }

    pub fn xml(&self) -> &str {
        &self.xml
    }

    pub fn is_empty(&self) -> bool {
        self.xml.trim().is_empty()
    }

    /// Flattened plain text of the part
    ///
    /// Text runs are concatenated, tabs and breaks become `\t` and `\n`, and
    /// every paragraph is followed by a blank line.
    pub fn text(&self) -> Result<String> {
        let mut reader = Reader::from_str(&self.xml);
        // Don't trim text - spaces inside runs are significant
        reader.config_mut().trim_text(false);

        let mut out = String::new();
        let mut in_text = false;

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => {
                    if e.local_name().as_ref() == b"t" {
                        in_text = true;
                    }
                }
                Event::Empty(ref e) => match e.local_name().as_ref() {
                    b"tab" => out.push('\t'),
                    b"br" | b"cr" => out.push('\n'),
                    _ => {}
                },
                Event::Text(ref e) => {
                    if in_text {
                        out.push_str(&e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if in_text {
                        out.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"t" => in_text = false,
                    b"p" => out.push_str("\n\n"),
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(out)
    }

    /// Placeholders found in this part's text
    pub fn placeholders(&self) -> Result<Vec<Placeholder>> {
        Ok(discover(&self.text()?))
    }

    /// A new part with `values` substituted, plus the per-key report
    pub fn fill(&self, values: &FillValues) -> (DocumentPart, FillReport) {
        let (xml, report) = fill_xml_with_report(&self.xml, values);
        tracing::debug!(
            part = %self.name,
            kind = ?self.kind,
            substitutions = report.total(),
            "filled part"
        );
        (
            DocumentPart {
                name: self.name.clone(),
                kind: self.kind,
                xml,
            },
            report,
        )
    }
}
