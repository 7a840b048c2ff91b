//! Filesystem document store
//!
//! Each document is two files in one directory: `<id>.docx` holds the
//! uploaded blob untouched and `<id>.json` holds its [`DocumentRecord`].
//! Every write goes to a temporary file in the same directory and is then
//! renamed over the target, so a reader sees either the old or the new
//! contents and never a partial file.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::error::{Result, ServiceError};
use crate::record::DocumentRecord;

/// Directory-backed store of uploaded documents
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Open (and create if needed) a store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A fresh document id
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.blob_path(id).map(|p| p.is_file()).unwrap_or(false)
    }

    pub fn save_blob(&self, id: &str, bytes: &[u8]) -> Result<()> {
        let path = self.blob_path(id)?;
        self.write_atomic(&path, bytes)
    }

    pub fn load_blob(&self, id: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(id)?;
        read_existing(&path, id)
    }

    pub fn save_record(&self, record: &DocumentRecord) -> Result<()> {
        let path = self.record_path(&record.id)?;
        let json = serde_json::to_vec_pretty(record)?;
        self.write_atomic(&path, &json)
    }

    pub fn load_record(&self, id: &str) -> Result<DocumentRecord> {
        let path = self.record_path(id)?;
        let json = read_existing(&path, id)?;
        Ok(serde_json::from_slice(&json)?)
    }

    fn blob_path(&self, id: &str) -> Result<PathBuf> {
        Ok(self.root.join(format!("{}.docx", checked_id(id)?)))
    }

    fn record_path(&self, id: &str) -> Result<PathBuf> {
        Ok(self.root.join(format!("{}.json", checked_id(id)?)))
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = NamedTempFile::new_in(&self.root)?;
        file.write_all(bytes)?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| ServiceError::from(e.error))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "stored file");
        Ok(())
    }
}

/// Only canonical UUIDs name stored files; anything else cannot exist
fn checked_id(id: &str) -> Result<String> {
    Uuid::parse_str(id)
        .map(|uuid| uuid.hyphenated().to_string())
        .map_err(|_| ServiceError::NotFound(id.to_string()))
}

fn read_existing(path: &Path, id: &str) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ServiceError::NotFound(id.to_string()),
        _ => ServiceError::from(e),
    })
}
