//! # docfill-ooxml
//!
//! Placeholder discovery and substitution for `.docx` packages.
//!
//! This crate provides functionality to:
//! - Read and repack DOCX files
//! - Flatten the body, headers and footers to plain text
//! - Discover `{{key}}`, `[key]` and `{key}` placeholders
//! - Substitute values into the XML parts, including placeholders that Word
//!   split across several runs
//!
//! ## Example: Filling a Document
//!
//! ```no_run
//! use docfill_ooxml::{DocumentPackage, FillValues};
//!
//! let package = DocumentPackage::open("letter.docx")?;
//! let placeholders = package.placeholders(false)?;
//! for p in &placeholders {
//!     println!("{}", p.key);
//! }
//!
//! let values: FillValues = [("name", "Alex")].into_iter().collect();
//! let filled = package.fill(&values)?;
//! std::fs::write("letter-filled.docx", filled.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod archive;
pub mod error;
pub mod fill;
pub mod grammar;
pub mod package;
pub mod part;
pub mod placeholder;
pub mod preview;
#[doc(hidden)]
pub mod test_utils;

pub use archive::OoxmlArchive;
pub use error::{OoxmlError, Result};
pub use fill::{fill_xml, fill_xml_with_report, FillReport, FillValues, KeyOutcome, KeyState};
pub use grammar::{escape_xml, Bracket};
pub use package::{DocumentPackage, FilledPackage, DOCX_CONTENT_TYPE};
pub use part::{DocumentPart, PartKind};
pub use placeholder::{discover, discover_keys, Placeholder};
pub use preview::fill_text;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
