//! Upload and download services
//!
//! Upload stores the untouched blob plus a record of the placeholders found
//! in it. Download reloads the blob and runs the substitution engine over
//! its body, headers and footers.

use docfill_ooxml::{
    discover, DocumentPackage, FillReport, FillValues, Placeholder, DOCX_CONTENT_TYPE,
};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::{Result, ServiceError};
use crate::record::DocumentRecord;
use crate::store::DocumentStore;

/// Extension an uploaded file name must carry
pub const DOCX_EXTENSION: &str = ".docx";

/// Accepts uploads and records their placeholders
#[derive(Debug, Clone)]
pub struct UploadService {
    store: DocumentStore,
    include_headers_footers: bool,
}

impl UploadService {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store,
            include_headers_footers: false,
        }
    }

    /// Build from settings, opening the configured store
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(DocumentStore::open(&settings.store.root)?)
            .with_headers_footers(settings.scan.include_headers_footers))
    }

    /// Also discover placeholders in header and footer text
    pub fn with_headers_footers(mut self, include: bool) -> Self {
        self.include_headers_footers = include;
        self
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Store a new document and return its record
    pub fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<DocumentRecord> {
        if bytes.is_empty() {
            return Err(ServiceError::Validation("No file provided".into()));
        }
        if !file_name.ends_with(DOCX_EXTENSION) {
            return Err(ServiceError::Validation("File must be a .docx file".into()));
        }

        let package = DocumentPackage::from_bytes(bytes)?;
        let text = package.discovery_text(self.include_headers_footers)?;
        let placeholders = discover(&text);

        let id = DocumentStore::new_id();
        let record = DocumentRecord::new(id.as_str(), text, placeholders);

        // Blob first: a record never points at a missing blob
        self.store.save_blob(&id, bytes)?;
        self.store.save_record(&record)?;

        tracing::info!(
            document = %id,
            file = file_name,
            placeholders = record.placeholders.len(),
            "document uploaded"
        );
        Ok(record)
    }
}

/// Body of a download request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub placeholders: Vec<Placeholder>,
}

impl DownloadRequest {
    pub fn new(document_id: impl Into<String>, placeholders: Vec<Placeholder>) -> Self {
        Self {
            document_id: Some(document_id.into()),
            placeholders,
        }
    }
}

/// A regenerated document ready to be sent
#[derive(Debug, Clone)]
pub struct FilledDocument {
    /// `filled-document-<id>.docx`
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    /// Per-key substitution counts
    pub report: FillReport,
}

/// Regenerates stored documents with values substituted
#[derive(Debug, Clone)]
pub struct DownloadService {
    store: DocumentStore,
}

impl DownloadService {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(DocumentStore::open(&settings.store.root)?))
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Fill the stored document with the request's placeholder values
    pub fn download(&self, request: &DownloadRequest) -> Result<FilledDocument> {
        let id = request
            .document_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ServiceError::Validation("No document ID provided".into()))?;

        self.generate(id, &FillValues::from_placeholders(&request.placeholders))
    }

    /// Fill the stored document with the values saved in its record
    pub fn download_stored(&self, id: &str) -> Result<FilledDocument> {
        let record = self.store.load_record(id)?;
        self.generate(&record.id, &record.values())
    }

    fn generate(&self, id: &str, values: &FillValues) -> Result<FilledDocument> {
        let bytes = self.store.load_blob(id)?;
        let package = DocumentPackage::from_bytes(&bytes)?;
        let filled = package.fill(values)?;

        tracing::info!(
            document = %id,
            keys = values.len(),
            substitutions = filled.report.total(),
            "document generated"
        );

        Ok(FilledDocument {
            file_name: format!("filled-document-{}.docx", id),
            content_type: DOCX_CONTENT_TYPE,
            bytes: filled.bytes,
            report: filled.report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfill_ooxml::test_utils::{minimal_docx, DocxBuilder};
    use tempfile::TempDir;

    fn services() -> (TempDir, UploadService, DownloadService) {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        (
            dir,
            UploadService::new(store.clone()),
            DownloadService::new(store),
        )
    }

    #[test]
    fn test_upload_rejects_empty_body() {
        let (_dir, upload, _) = services();
        let err = upload.upload("letter.docx", &[]).unwrap_err();
        assert_eq!(err.to_string(), "No file provided");
    }

    #[test]
    fn test_upload_rejects_other_extensions() {
        let (_dir, upload, _) = services();
        let bytes = minimal_docx("{{x}}");
        for name in ["letter.doc", "letter.pdf", "letter.docx.txt", "docx"] {
            let err = upload.upload(name, &bytes).unwrap_err();
            assert_eq!(err.to_string(), "File must be a .docx file");
        }
    }

    #[test]
    fn test_upload_records_placeholders() {
        let (_dir, upload, _) = services();
        let bytes = minimal_docx("Dear {{name}},\nPay [amount] by {date}.");

        let record = upload.upload("letter.docx", &bytes).unwrap();
        let keys: Vec<&str> = record.placeholders.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "amount", "date"]);
        assert_eq!(record.filled_text, record.original_text);

        assert_eq!(upload.store().load_record(&record.id).unwrap(), record);
        assert_eq!(upload.store().load_blob(&record.id).unwrap(), bytes);
    }

    #[test]
    fn test_upload_header_discovery_is_opt_in() {
        let (_dir, upload, _) = services();
        let bytes = DocxBuilder::new()
            .body("{{a}}")
            .footer(1, "{{b}}")
            .build();

        let record = upload.upload("x.docx", &bytes).unwrap();
        assert_eq!(record.placeholders.len(), 1);

        let record = upload
            .with_headers_footers(true)
            .upload("x.docx", &bytes)
            .unwrap();
        assert_eq!(record.placeholders.len(), 2);
    }

    #[test]
    fn test_download_requires_document_id() {
        let (_dir, _, download) = services();
        for document_id in [None, Some(String::new()), Some("  ".to_string())] {
            let request = DownloadRequest {
                document_id,
                placeholders: Vec::new(),
            };
            let err = download.download(&request).unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
            assert_eq!(err.to_string(), "No document ID provided");
        }
    }

    #[test]
    fn test_download_unknown_document() {
        let (_dir, _, download) = services();
        let request = DownloadRequest::new(DocumentStore::new_id(), Vec::new());
        assert!(matches!(
            download.download(&request),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_download_blob_without_body_is_invalid_format() {
        let (_dir, _, download) = services();
        let id = DocumentStore::new_id();
        let bytes = DocxBuilder::new().without_body().build();
        download.store().save_blob(&id, &bytes).unwrap();

        let err = download
            .download(&DownloadRequest::new(id, Vec::new()))
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidFormat(_)));
    }

    #[test]
    fn test_download_fills_request_values() {
        let (_dir, upload, download) = services();
        let record = upload
            .upload("letter.docx", &minimal_docx("Dear {{name}}"))
            .unwrap();

        let placeholders = record
            .placeholders
            .iter()
            .cloned()
            .map(|p| p.with_value("Alex"))
            .collect();
        let filled = download
            .download(&DownloadRequest::new(record.id.clone(), placeholders))
            .unwrap();

        assert_eq!(filled.file_name, format!("filled-document-{}.docx", record.id));
        assert_eq!(filled.content_type, DOCX_CONTENT_TYPE);
        let text = DocumentPackage::from_bytes(&filled.bytes)
            .unwrap()
            .discovery_text(false)
            .unwrap();
        assert_eq!(text, "Dear Alex\n\n");
    }

    #[test]
    fn test_download_stored_uses_record_values() {
        let (_dir, upload, download) = services();
        let mut record = upload
            .upload("letter.docx", &minimal_docx("Hi [who]"))
            .unwrap();
        let id = record.placeholders[0].id.clone();
        record.set_value(&id, "there");
        upload.store().save_record(&record).unwrap();

        let filled = download.download_stored(&record.id).unwrap();
        assert_eq!(filled.report.total(), 1);
    }
}
