//! A word-processing package and its text-bearing parts

use std::path::Path;

use crate::archive::{OoxmlArchive, DOCUMENT_PART};
use crate::error::Result;
use crate::fill::{FillReport, FillValues};
use crate::part::{DocumentPart, PartKind};
use crate::placeholder::{discover, Placeholder};

/// Content type of a `.docx` package
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// An unpacked `.docx` document
///
/// The package is never modified by filling: [`DocumentPackage::fill`]
/// returns a new blob.
#[derive(Debug, Clone)]
pub struct DocumentPackage {
    archive: OoxmlArchive,
}

/// Result of filling a whole package
#[derive(Debug, Clone)]
pub struct FilledPackage {
    /// The repacked document
    pub bytes: Vec<u8>,
    /// Substitution counts summed over every part
    pub report: FillReport,
    /// Names of the parts that were rewritten, body first
    ///
    /// A part without substitutions keeps its original bytes.
    pub parts: Vec<String>,
}

impl DocumentPackage {
    /// Unpack an in-memory document
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_archive(OoxmlArchive::from_bytes(bytes)?))
    }

    /// Open a document from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_archive(OoxmlArchive::open(path)?))
    }

    pub fn from_archive(archive: OoxmlArchive) -> Self {
        Self { archive }
    }

    pub fn archive(&self) -> &OoxmlArchive {
        &self.archive
    }

    /// The main body part
    ///
    /// A package without one is not a word-processing document.
    pub fn body(&self) -> Result<DocumentPart> {
        let xml = self.archive.document_xml()?;
        Ok(DocumentPart::new(DOCUMENT_PART, PartKind::Body, xml))
    }

    /// Header parts, in name order
    pub fn headers(&self) -> Vec<DocumentPart> {
        self.parts_named(self.archive.header_names(), PartKind::Header)
    }

    /// Footer parts, in name order
    pub fn footers(&self) -> Vec<DocumentPart> {
        self.parts_named(self.archive.footer_names(), PartKind::Footer)
    }

    /// Parts that are not valid UTF-8 are skipped and left as they are
    fn parts_named(&self, names: Vec<&str>, kind: PartKind) -> Vec<DocumentPart> {
        names
            .into_iter()
            .filter_map(|name| match self.archive.get_str(name) {
                Ok(xml) => xml.map(|xml| DocumentPart::new(name, kind, xml)),
                Err(e) => {
                    tracing::warn!(part = name, "skipping undecodable part: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Every part that may contain placeholders: body, headers, footers
    pub fn text_parts(&self) -> Result<Vec<DocumentPart>> {
        let mut parts = vec![self.body()?];
        parts.extend(self.headers());
        parts.extend(self.footers());
        Ok(parts)
    }

    /// Flattened text used for placeholder discovery
    ///
    /// The body always comes first; header and footer text follows when
    /// `include_headers_footers` is set.
    pub fn discovery_text(&self, include_headers_footers: bool) -> Result<String> {
        let mut text = self.body()?.text()?;
        if include_headers_footers {
            for part in self.headers().into_iter().chain(self.footers()) {
                text.push_str(&part.text()?);
            }
        }
        Ok(text)
    }

    /// Placeholders discovered in [`DocumentPackage::discovery_text`]
    pub fn placeholders(&self, include_headers_footers: bool) -> Result<Vec<Placeholder>> {
        Ok(discover(&self.discovery_text(include_headers_footers)?))
    }

    /// Substitute `values` in the body and every header and footer, then repack
    pub fn fill(&self, values: &FillValues) -> Result<FilledPackage> {
        let mut archive = self.archive.clone();
        let mut report = FillReport::default();
        let mut parts = Vec::new();

        for part in self.text_parts()? {
            if part.is_empty() {
                continue;
            }
            let (filled, part_report) = part.fill(values);
            let changed = part_report.total() > 0;
            report.merge(part_report);
            if changed {
                archive.set_string(filled.name(), filled.xml());
                parts.push(filled.name().to_string());
            }
        }

        tracing::info!(
            parts = parts.len(),
            substitutions = report.total(),
            "filled document package"
        );

        Ok(FilledPackage {
            bytes: archive.to_bytes()?,
            report,
            parts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OoxmlError;
    use crate::test_utils::DocxBuilder;

    #[test]
    fn test_missing_body_is_an_invalid_document() {
        let bytes = DocxBuilder::new()
            .without_body()
            .part("word/styles.xml", "<w:styles/>")
            .build();
        let package = DocumentPackage::from_bytes(&bytes).unwrap();
        assert!(matches!(package.body(), Err(OoxmlError::MissingFile(_))));
        assert!(package.fill(&FillValues::new()).is_err());
    }

    #[test]
    fn test_fill_body_header_and_footer() {
        let bytes = DocxBuilder::new()
            .body("Hello {{name}}")
            .header(1, "Ref [ref]")
            .footer(2, "Page for {name}")
            .build();
        let package = DocumentPackage::from_bytes(&bytes).unwrap();
        let values: FillValues = [("name", "Alex"), ("ref", "R-1")].into_iter().collect();

        let filled = package.fill(&values).unwrap();
        assert_eq!(
            filled.parts,
            vec!["word/document.xml", "word/header1.xml", "word/footer2.xml"]
        );
        assert_eq!(filled.report.total(), 3);

        let out = DocumentPackage::from_bytes(&filled.bytes).unwrap();
        assert_eq!(out.body().unwrap().text().unwrap(), "Hello Alex\n\n");
        assert_eq!(out.headers()[0].text().unwrap(), "Ref R-1\n\n");
        assert_eq!(out.headers()[0].kind(), PartKind::Header);
        assert_eq!(out.footers()[0].text().unwrap(), "Page for Alex\n\n");

        // The source package is untouched
        assert!(package.body().unwrap().xml().contains("{{name}}"));
    }

    #[test]
    fn test_other_parts_survive_repack() {
        let bytes = DocxBuilder::new()
            .body("{{x}}")
            .part("word/styles.xml", "<w:styles>{{x}}</w:styles>")
            .build();
        let package = DocumentPackage::from_bytes(&bytes).unwrap();
        let values: FillValues = [("x", "1")].into_iter().collect();

        let filled = package.fill(&values).unwrap();
        let out = DocumentPackage::from_bytes(&filled.bytes).unwrap();
        assert_eq!(
            out.archive().get_str("word/styles.xml").unwrap(),
            Some("<w:styles>{{x}}</w:styles>")
        );
        assert!(out.archive().contains("[Content_Types].xml"));
    }

    #[test]
    fn test_discovery_text_optionally_includes_headers_and_footers() {
        let bytes = DocxBuilder::new()
            .body("Body {{a}}")
            .header(1, "Header [b]")
            .build();
        let package = DocumentPackage::from_bytes(&bytes).unwrap();

        let keys = |include: bool| -> Vec<String> {
            package
                .placeholders(include)
                .unwrap()
                .into_iter()
                .map(|p| p.key)
                .collect()
        };
        assert_eq!(keys(false), vec!["a"]);
        assert_eq!(keys(true), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_header_is_skipped() {
        let bytes = DocxBuilder::new()
            .body("{{x}}")
            .part("word/header1.xml", "")
            .build();
        let package = DocumentPackage::from_bytes(&bytes).unwrap();
        let values: FillValues = [("x", "1")].into_iter().collect();
        let filled = package.fill(&values).unwrap();
        assert_eq!(filled.parts, vec!["word/document.xml"]);
    }

    #[test]
    fn test_parts_without_substitutions_keep_their_bytes() {
        let footer = "<w:ftr>   <w:p><w:r><w:t>Page</w:t></w:r></w:p></w:ftr>";
        let bytes = DocxBuilder::new()
            .body("Hello {{name}}")
            .part("word/footer1.xml", footer)
            .build();
        let package = DocumentPackage::from_bytes(&bytes).unwrap();
        let values: FillValues = [("name", "Alex")].into_iter().collect();

        let filled = package.fill(&values).unwrap();
        assert_eq!(filled.parts, vec!["word/document.xml"]);
        let out = DocumentPackage::from_bytes(&filled.bytes).unwrap();
        assert_eq!(out.archive().get_str("word/footer1.xml").unwrap(), Some(footer));
    }

    #[test]
    fn test_undecodable_header_is_left_untouched() {
        let raw = b"<w:hdr>{{x}} \xff</w:hdr>".to_vec();
        let bytes = DocxBuilder::new()
            .body("{{x}}")
            .raw_part("word/header1.xml", raw.clone())
            .build();
        let package = DocumentPackage::from_bytes(&bytes).unwrap();
        assert!(package.headers().is_empty());

        let values: FillValues = [("x", "1")].into_iter().collect();
        let filled = package.fill(&values).unwrap();
        assert_eq!(filled.parts, vec!["word/document.xml"]);

        let out = DocumentPackage::from_bytes(&filled.bytes).unwrap();
        assert_eq!(out.archive().get("word/header1.xml"), Some(raw.as_slice()));
    }

    #[test]
    fn test_undecodable_body_is_an_invalid_document() {
        let bytes = DocxBuilder::new()
            .raw_part("word/document.xml", vec![0xfe, 0xff])
            .build();
        let package = DocumentPackage::from_bytes(&bytes).unwrap();
        let err = package.body().unwrap_err();
        assert!(err.is_invalid_document());
        assert!(package.placeholders(false).is_err());
    }
}
