//! crates/sc_io/src/lib.rs
//! I/O crate for the scrutini engine.
//!
//! - Shared error type (`IoError`) with `From` conversions used across modules.
//! - CSV tables in (`loader`), CSV/text artifacts out (`writer`).
//! - Canonical JSON + atomic writes (`canonical_json`), params files (`params`).
//! - Anonymization digests and file fingerprints (`hasher`).

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for sc_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, create_dir_all, rename, fsync, etc.)
    #[error("io/path error: {0}")]
    Path(String),

    /// CSV decoding/encoding errors.
    #[error("csv error: {0}")]
    Csv(String),

    /// JSON serialization/deserialization errors with an optional JSON Pointer.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Params file rejected by domain validation.
    #[error("params error: {0}")]
    Params(String),

    /// Generic validation / invariants.
    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

/* ---------------- From conversions (used by file modules) ---------------- */

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps line/column, not a pointer; report at root.
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

impl From<csv::Error> for IoError {
    fn from(e: csv::Error) -> Self {
        IoError::Csv(e.to_string())
    }
}

impl From<sc_core::CoreError> for IoError {
    fn from(e: sc_core::CoreError) -> Self {
        IoError::Invalid(e.to_string())
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod loader;
pub mod params;
pub mod writer;

/// Returns true if `s` looks like a URL (any `<scheme>://`, including `file://`).
#[inline]
pub fn looks_like_url_strict(s: &str) -> bool {
    s.trim().contains("://")
}

pub mod prelude {
    pub use crate::{looks_like_url_strict, IoError, IoResult};

    pub use crate::canonical_json::{to_canonical_json_bytes, write_atomic, write_canonical_file};
    pub use crate::hasher::{anonymize, sha256_file, sha256_stream};
    pub use crate::loader::{load_table, parse_table};
    pub use crate::params::load_params;
    pub use crate::writer::{write_csv, write_lines};
}
