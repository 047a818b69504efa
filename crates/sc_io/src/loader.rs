//! Loader: read a local CSV export into a `sc_core::Table`.
//!
//! School software exports disagree on the field separator, so it is sniffed
//! from the header line (`,` `;` tab `|`). A UTF-8 BOM is dropped. Short rows
//! are padded with "", extra trailing cells are dropped. No network I/O.

#![forbid(unsafe_code)]

use std::fs;
use std::path::Path;

use csv::ReaderBuilder;
use sc_core::Table;
use tracing::{debug, warn};

use crate::{looks_like_url_strict, IoError, IoResult};

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Most frequent candidate separator in the first non-empty line; `,` on ties or none.
pub fn sniff_delimiter(text: &str) -> u8 {
    let first = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let mut best = (b',', 0usize);
    for d in CANDIDATE_DELIMITERS {
        let n = first.bytes().filter(|b| *b == d).count();
        if n > best.1 {
            best = (d, n);
        }
    }
    best.0
}

/// Parse CSV text (first record is the header).
pub fn parse_table(text: &str) -> IoResult<Table> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let delimiter = sniff_delimiter(text);

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let width = headers.len();

    let mut rows = Vec::new();
    let mut truncated = 0usize;
    for rec in rdr.records() {
        let rec = rec?;
        let mut cells: Vec<String> = rec.iter().map(str::to_string).collect();
        if cells.len() > width {
            cells.truncate(width);
            truncated += 1;
        }
        rows.push(cells);
    }
    if truncated > 0 {
        warn!(truncated, "rows wider than the header were truncated");
    }
    debug!(delimiter = %char::from(delimiter), columns = width, rows = rows.len(), "csv parsed");

    Ok(Table::new(headers, rows)?)
}

/// Read and parse a local CSV file. URL-like paths are rejected.
pub fn load_table(path: &Path) -> IoResult<Table> {
    let shown = path.to_string_lossy();
    if looks_like_url_strict(&shown) {
        return Err(IoError::Path(format!("non-local path rejected: {shown}")));
    }
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes)
        .map_err(|e| IoError::Csv(format!("{shown}: not valid UTF-8 ({e})")))?;
    parse_table(&text)
}
