//! Parsed tabular input: ordered headers and string cells.
//!
//! Columns are resolved once per run into `ColumnRef` indices; rows are then
//! read positionally. An unresolved optional column reads as "".

use crate::errors::CoreError;

/// Index of a resolved column.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ColumnRef(pub usize);

/// One source line. Cells beyond the row's width read as "".
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Record {
    cells: Vec<String>,
}

impl Record {
    pub fn new(cells: Vec<String>) -> Self { Self { cells } }

    /// Cell at `col`, untrimmed. `None` (column absent) reads as "".
    #[inline]
    pub fn get(&self, col: Option<ColumnRef>) -> &str {
        col.and_then(|c| self.cells.get(c.0)).map(String::as_str).unwrap_or("")
    }

    /// Trimmed cell.
    #[inline]
    pub fn get_trim(&self, col: Option<ColumnRef>) -> &str {
        self.get(col).trim()
    }

    pub fn cells(&self) -> &[String] { &self.cells }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    /// Rows shorter than the header are padded; longer rows are rejected.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, CoreError> {
        let width = headers.len();
        let mut records = Vec::with_capacity(rows.len());
        for (i, mut cells) in rows.into_iter().enumerate() {
            if cells.len() > width {
                return Err(CoreError::RaggedRow { row: i + 1, cells: cells.len(), headers: width });
            }
            cells.resize(width, String::new());
            records.push(Record::new(cells));
        }
        Ok(Self { headers, records })
    }

    /// Convenience constructor over borrowed strings.
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Result<Self, CoreError> {
        Self::new(
            headers.iter().map(|h| (*h).to_string()).collect(),
            rows.iter().map(|r| r.iter().map(|c| (*c).to_string()).collect()).collect(),
        )
    }

    pub fn headers(&self) -> &[String] { &self.headers }

    pub fn header(&self, col: ColumnRef) -> &str {
        self.headers.get(col.0).map(String::as_str).unwrap_or("")
    }

    pub fn records(&self) -> &[Record] { &self.records }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}
