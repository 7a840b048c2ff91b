//! docfill CLI - Command-line interface library
//!
//! This library provides the CLI functionality for docfill:
//! - Scan: list the placeholders in a DOCX file
//! - Fill: substitute values from a JSON or TOML file
//! - Upload / Download: store a document and regenerate it later
//! - Chat: answer a stored document's placeholders one at a time
//!
//! # Binary Usage
//!
//! ```bash
//! # List placeholders
//! docfill scan letter.docx --format json
//!
//! # Fill from a values file
//! docfill fill letter.docx --values values.toml --output final.docx
//!
//! # Store, answer, regenerate
//! docfill upload letter.docx
//! docfill chat <id>
//! docfill download <id>
//! ```

pub mod app;

pub use app::{
    chat_command, download_command, fill_command, fill_document, load_values, run_chat,
    run_cli, scan_command, scan_document, upload_command, OutputFormat,
};
