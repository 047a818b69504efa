//! Fatal input errors of the two flows. `Display` is the exact user-facing message.

use core::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MergeError {
    EmptyDeferred,
    EmptyRoster,
    MissingDeferredColumns,
    MissingRosterColumns,
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::EmptyDeferred => write!(f, "Il file degli scrutini differiti è vuoto"),
            MergeError::EmptyRoster => write!(f, "Il file completo è vuoto"),
            MergeError::MissingDeferredColumns => {
                write!(f, "Nel file differiti non trovo almeno uno tra: cognome, nome, materia")
            }
            MergeError::MissingRosterColumns => {
                write!(f, "Nel file completo non trovo almeno uno tra: materia/materia_desc, valore")
            }
        }
    }
}

impl std::error::Error for MergeError {}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PeriodError {
    Empty,
    MissingIdentifierColumn,
    MissingSubjectColumn,
}

impl fmt::Display for PeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodError::Empty => write!(f, "Il file è vuoto"),
            PeriodError::MissingIdentifierColumn => write!(
                f,
                "Colonna Codice Fiscale non trovata (cercate: codicefiscalealunno, codice_fiscale, cf, codicefiscale)"
            ),
            PeriodError::MissingSubjectColumn => write!(
                f,
                "Colonna Materia non trovata (cercate: descrizionemateria, materia_desc, materia, disciplina)"
            ),
        }
    }
}

impl std::error::Error for PeriodError {}
