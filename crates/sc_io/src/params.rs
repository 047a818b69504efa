//! Params file loading: JSON object, unknown keys rejected, domains validated.

use std::fs;
use std::path::Path;

use sc_core::variables::{validate_domains, Params};
use tracing::debug;

use crate::{looks_like_url_strict, IoError, IoResult};

/// Parse params from JSON text. Missing keys take their defaults.
pub fn parse_params(text: &str) -> IoResult<Params> {
    let p: Params = serde_json::from_str(text)?;
    validate_domains(&p).map_err(|e| IoError::Params(e.to_string()))?;
    Ok(p)
}

pub fn load_params(path: &Path) -> IoResult<Params> {
    let shown = path.to_string_lossy();
    if looks_like_url_strict(&shown) {
        return Err(IoError::Path(format!("non-local path rejected: {shown}")));
    }
    let text = fs::read_to_string(path)?;
    let p = parse_params(&text)?;
    debug!(path = %shown, ?p, "params loaded");
    Ok(p)
}
