//! # docfill-core
//!
//! Services around the placeholder engine in `docfill-ooxml`:
//!
//! - [`DocumentStore`]: uploaded blobs and their records on disk
//! - [`UploadService`]: accept a `.docx`, discover its placeholders, store it
//! - [`DownloadService`]: regenerate a stored document with values filled in
//! - [`Conversation`]: the question-by-question fill flow
//! - [`Settings`]: `docfill.toml` configuration
//!
//! # Example
//!
//! ```no_run
//! use docfill_core::{DocumentStore, DownloadRequest, DownloadService, UploadService};
//!
//! let store = DocumentStore::open("uploads")?;
//! let upload = UploadService::new(store.clone());
//! let record = upload.upload("letter.docx", &std::fs::read("letter.docx")?)?;
//!
//! let placeholders = record
//!     .placeholders
//!     .into_iter()
//!     .map(|p| p.with_value("Alex"))
//!     .collect();
//! let filled = DownloadService::new(store)
//!     .download(&DownloadRequest::new(record.id, placeholders))?;
//! std::fs::write(&filled.file_name, &filled.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod conversation;
pub mod error;
pub mod record;
pub mod service;
pub mod store;

pub use config::Settings;
pub use conversation::Conversation;
pub use error::{Result, ServiceError};
pub use record::DocumentRecord;
pub use service::{DownloadRequest, DownloadService, FilledDocument, UploadService};
pub use store::DocumentStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
