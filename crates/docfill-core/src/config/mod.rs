//! Configuration
//!
//! Settings are loaded from `docfill.toml`:
//!
//! ```toml
//! [store]
//! root = "uploads"
//!
//! [scan]
//! include_headers_footers = false
//!
//! [server]
//! bind = "127.0.0.1:3000"
//! ```
//!
//! `DOCFILL_STORE` and `DOCFILL_BIND` override the file.

mod settings;


pub use settings::{
    ConfigError, ScanSettings, ServerSettings, Settings, StoreSettings, BIND_ENV, CONFIG_FILE,
    STORE_ENV,
};
