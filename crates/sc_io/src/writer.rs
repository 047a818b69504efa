//! Output artifacts: CSV export of output rows and the plain-text report.
//! Both go through `write_atomic`, so a failed run never leaves half a file.

use std::path::Path;

use csv::WriterBuilder;

use crate::canonical_json::write_atomic;
use crate::IoResult;

/// Encode a header + rows as comma-separated CSV (LF line endings, minimal quoting).
pub fn to_csv_bytes<R, C>(headers: &[&str], rows: R) -> IoResult<Vec<u8>>
where
    R: IntoIterator<Item = C>,
    C: IntoIterator,
    C::Item: AsRef<[u8]>,
{
    let mut w = WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    w.write_record(headers)?;
    for row in rows {
        w.write_record(row)?;
    }
    w.into_inner().map_err(|e| crate::IoError::Csv(e.to_string()))
}

pub fn write_csv<R, C>(path: &Path, headers: &[&str], rows: R) -> IoResult<()>
where
    R: IntoIterator<Item = C>,
    C: IntoIterator,
    C::Item: AsRef<[u8]>,
{
    let bytes = to_csv_bytes(headers, rows)?;
    write_atomic(path, &bytes)
}

/// Report lines joined with `\n`, trailing newline included.
pub fn lines_to_text(lines: &[String]) -> String {
    let mut s = lines.join("\n");
    s.push('\n');
    s
}

pub fn write_lines(path: &Path, lines: &[String]) -> IoResult<()> {
    write_atomic(path, lines_to_text(lines).as_bytes())
}
