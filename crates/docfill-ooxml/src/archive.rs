//! Archive handling for DOCX files
//!
//! DOCX files are ZIP archives containing XML parts and resources.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::read::ZipArchive;
use zip::write::ZipWriter;
use zip::CompressionMethod;

use crate::error::{OoxmlError, Result};

/// Path of the main document body part
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Name prefix shared by every header part (`word/header1.xml`, ...)
pub const HEADER_PREFIX: &str = "word/header";

/// Name prefix shared by every footer part (`word/footer1.xml`, ...)
pub const FOOTER_PREFIX: &str = "word/footer";

/// Represents an unpacked OOXML document
#[derive(Debug, Clone, Default)]
pub struct OoxmlArchive {
    /// All files in the archive, keyed by path
    files: HashMap<String, Vec<u8>>,
}

impl OoxmlArchive {
    /// Open and unpack a DOCX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Unpack an in-memory DOCX blob
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut files = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            files.insert(name, contents);
        }

        Ok(Self { files })
    }

    /// Get a file's contents by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// Get a file's contents as UTF-8 text
    ///
    /// Fails with [`OoxmlError::InvalidStructure`] when the part is not valid
    /// UTF-8; such a part is never decoded lossily.
    pub fn get_str(&self, path: &str) -> Result<Option<&str>> {
        match self.files.get(path) {
            Some(bytes) => std::str::from_utf8(bytes).map(Some).map_err(|e| {
                OoxmlError::InvalidStructure(format!("{} is not valid UTF-8: {}", path, e))
            }),
            None => Ok(None),
        }
    }

    /// Get the main document content (word/document.xml)
    pub fn document_xml(&self) -> Result<&str> {
        self.get_str(DOCUMENT_PART)?
            .ok_or_else(|| OoxmlError::MissingFile(DOCUMENT_PART.to_string()))
    }

    /// Names of all header parts, sorted
    pub fn header_names(&self) -> Vec<&str> {
        self.names_with_prefix(HEADER_PREFIX)
    }

    /// Names of all footer parts, sorted
    pub fn footer_names(&self) -> Vec<&str> {
        self.names_with_prefix(FOOTER_PREFIX)
    }

    fn names_with_prefix(&self, prefix: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .files
            .keys()
            .map(|s| s.as_str())
            .filter(|name| name.starts_with(prefix) && name.ends_with(".xml"))
            .collect();
        names.sort();
        names
    }

    /// Check if a file exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Set a file's contents from a string
    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into().into_bytes());
    }

    /// Repack the archive into a new in-memory blob
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Write the archive to any writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated);

        // [Content_Types].xml first, then sorted keys for deterministic output
        let mut paths: Vec<_> = self.files.keys().collect();
        let is_types = |p: &String| p.as_str() == "[Content_Types].xml";
        paths.sort_by(|a, b| is_types(*b).cmp(&is_types(*a)).then_with(|| a.cmp(b)));

        for path in paths {
            let contents = &self.files[path];
            zip.start_file(path.as_str(), options)?;
            zip.write_all(contents)?;
        }

        zip.finish()?;
        Ok(())
    }
}
