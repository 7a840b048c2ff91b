//! End-to-end tests: upload, converse, download
//!
//! Everything runs against a store in a temporary directory.

use docfill_core::{
    Conversation, DocumentStore, DownloadRequest, DownloadService, ServiceError, UploadService,
};
use docfill_ooxml::test_utils::DocxBuilder;
use docfill_ooxml::DocumentPackage;
use tempfile::TempDir;

fn services(dir: &TempDir) -> (UploadService, DownloadService) {
    let store = DocumentStore::open(dir.path().join("uploads")).unwrap();
    (
        UploadService::new(store.clone()).with_headers_footers(true),
        DownloadService::new(store),
    )
}

fn letter() -> Vec<u8> {
    DocxBuilder::new()
        .body("Dear {{name}},\nYou owe [amount] to O'Brien & Co.")
        .header(1, "Ref: {ref}")
        .footer(1, "Prepared for {{name}}")
        .build()
}

#[test]
fn test_upload_converse_download() {
    let dir = TempDir::new().unwrap();
    let (upload, download) = services(&dir);

    let bytes = letter();
    let record = upload.upload("letter.docx", &bytes).unwrap();
    let keys: Vec<&str> = record.placeholders.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["name", "amount", "ref"]);

    let mut chat = Conversation::new(record);
    chat.answer("Alex & Sam").unwrap();
    chat.answer("set it to $5").unwrap();
    chat.answer("R-7").unwrap();
    assert_eq!(chat.progress(), (3, 3));
    let record = chat.into_record();
    upload.store().save_record(&record).unwrap();

    let filled = download.download_stored(&record.id).unwrap();
    let out = DocumentPackage::from_bytes(&filled.bytes).unwrap();
    assert_eq!(
        out.body().unwrap().text().unwrap(),
        "Dear Alex & Sam,\n\nYou owe $5 to O'Brien & Co.\n\n"
    );
    assert_eq!(out.headers()[0].text().unwrap(), "Ref: R-7\n\n");
    assert_eq!(out.footers()[0].text().unwrap(), "Prepared for Alex & Sam\n\n");
    assert!(out.body().unwrap().xml().contains("Alex &amp; Sam"));

    // The stored original is untouched
    let original = upload.store().load_blob(&record.id).unwrap();
    assert_eq!(original, bytes);
}

#[test]
fn test_download_request_from_json() {
    let dir = TempDir::new().unwrap();
    let (upload, download) = services(&dir);
    let record = upload.upload("letter.docx", &letter()).unwrap();

    let json = serde_json::json!({
        "documentId": record.id,
        "placeholders": [
            {"id": "x", "key": "name", "value": "Alex"},
            {"key": "amount", "value": ""}
        ]
    });
    let request: DownloadRequest = serde_json::from_value(json).unwrap();
    let filled = download.download(&request).unwrap();

    let text = DocumentPackage::from_bytes(&filled.bytes)
        .unwrap()
        .discovery_text(false)
        .unwrap();
    assert_eq!(text, "Dear Alex,\n\nYou owe [amount] to O'Brien & Co.\n\n");
}

#[test]
fn test_missing_document_id_in_json() {
    let dir = TempDir::new().unwrap();
    let (_, download) = services(&dir);

    let request: DownloadRequest =
        serde_json::from_value(serde_json::json!({"placeholders": []})).unwrap();
    assert!(matches!(
        download.download(&request),
        Err(ServiceError::Validation(_))
    ));
}

#[test]
fn test_upload_of_non_zip_fails_without_storing() {
    let dir = TempDir::new().unwrap();
    let (upload, _) = services(&dir);

    let err = upload.upload("fake.docx", b"not a zip").unwrap_err();
    assert!(matches!(err, ServiceError::Internal(_)));
    let stored = std::fs::read_dir(upload.store().root()).unwrap().count();
    assert_eq!(stored, 0);
}
