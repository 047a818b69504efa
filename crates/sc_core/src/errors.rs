//! Minimal error set for core-domain validation & parsing.

use core::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoreError {
    DomainOutOfRange(&'static str),
    RaggedRow { row: usize, cells: usize, headers: usize },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
            CoreError::RaggedRow { row, cells, headers } => {
                write!(f, "row {row} has {cells} cells but the header has {headers}")
            }
        }
    }
}

impl std::error::Error for CoreError {}
