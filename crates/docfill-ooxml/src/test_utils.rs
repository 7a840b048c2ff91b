//! Shared test fixtures for docfill
//!
//! Builds small but structurally valid `.docx` packages in memory.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

/// Wrap paragraph text in a complete `word/document.xml`
///
/// Each line of `text` becomes one paragraph with a single run.
pub fn body_xml(text: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        paragraphs(text)
    )
}

/// Wrap paragraph text in a header (`hdr`) or footer (`ftr`) part
pub fn part_xml(root: &str, text: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:{root} xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{}</w:{root}>"#,
        paragraphs(text)
    )
}

fn paragraphs(text: &str) -> String {
    text.lines()
        .map(|line| {
            format!(
                r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                crate::grammar::escape_text(line)
            )
        })
        .collect()
}

/// In-memory `.docx` builder
///
/// # Example
/// ```
/// use docfill_ooxml::test_utils::DocxBuilder;
///
/// let bytes = DocxBuilder::new()
///     .body("Dear {{name}},")
///     .header(1, "Ref [ref]")
///     .build();
/// assert!(!bytes.is_empty());
/// ```
#[derive(Debug, Default, Clone)]
pub struct DocxBuilder {
    parts: Vec<(String, Vec<u8>)>,
    skip_body: bool,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Main body with one paragraph per line of `text`
    pub fn body(self, text: &str) -> Self {
        self.part("word/document.xml", body_xml(text))
    }

    /// `word/header{index}.xml` with one paragraph per line of `text`
    pub fn header(self, index: u32, text: &str) -> Self {
        self.part(format!("word/header{index}.xml"), part_xml("hdr", text))
    }

    /// `word/footer{index}.xml` with one paragraph per line of `text`
    pub fn footer(self, index: u32, text: &str) -> Self {
        self.part(format!("word/footer{index}.xml"), part_xml("ftr", text))
    }

    /// Any part with raw contents
    pub fn part(self, name: impl Into<String>, xml: impl Into<String>) -> Self {
        self.raw_part(name, xml.into().into_bytes())
    }

    /// Any part with raw bytes, which need not be valid UTF-8
    pub fn raw_part(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.parts.push((name.into(), bytes));
        self
    }

    /// Leave out `word/document.xml` even if no body was given
    pub fn without_body(mut self) -> Self {
        self.skip_body = true;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();
        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(PACKAGE_RELS.as_bytes()).unwrap();

        let has_body = self.parts.iter().any(|(name, _)| name == "word/document.xml");
        if !has_body && !self.skip_body {
            zip.start_file("word/document.xml", options).unwrap();
            zip.write_all(body_xml("").as_bytes()).unwrap();
        }

        for (name, bytes) in &self.parts {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(bytes).unwrap();
        }

        zip.finish().unwrap();
        buffer.into_inner()
    }
}

/// A `.docx` whose body holds `text`
pub fn minimal_docx(text: &str) -> Vec<u8> {
    DocxBuilder::new().body(text).build()
}
