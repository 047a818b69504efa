// crates/sc_algo/src/period.rs
//
// Single-period transform: one anonymized row per (student, subject).
//
// Per row, in this order:
//   1. clean the subject; skip + count if it matches the exclusion list;
//   2. skip + count if the identifier is empty or fails validation;
//   3. derive year/section from year+section columns, else from a class sigla;
//   4. copy the grade channels verbatim plus numeric-or-empty forms.
// Output sorted by (hash, year, section, subject) under `collate_cmp`.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;
use sc_core::determinism::collate_cmp;
use sc_core::text::{clean_subject, squash_upper};
use sc_core::{is_valid_identifier, numeric_or_empty, ColumnRef, Params, Record, Table};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::columns::{aliases as al, resolve_column};
use crate::errors::PeriodError;

static SIGLA_MULTI: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([1-5])([A-Z]+)$").expect("static regex"));

/// Non-academic subjects, matched as case-insensitive substrings.
pub const EXCLUDED_SUBJECTS: &[&str] = &[
    "RELIGIONE",
    "ATTIVITA ALTERNATIVA",
    "ATTIVITÀ ALTERNATIVA",
    "EDUCAZIONE CIVICA",
    "ED. CIVICA",
];

/// Conduct grades; excluded unless `Params::exclude_conduct` is off.
pub const CONDUCT_SUBJECTS: &[&str] = &["COMPORTAMENTO", "CONDOTTA"];

/// Default period marker when the file has no period column.
pub const DEFAULT_TERM: &str = "1";

// ----------------------------- Column resolution -------------------------------------

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PeriodColumns {
    pub code: Option<ColumnRef>,
    pub subject: Option<ColumnRef>,
    /// Set only when BOTH year and section were found.
    pub year: Option<ColumnRef>,
    pub section: Option<ColumnRef>,
    /// Used only when year/section are not both available.
    pub class_sigla: Option<ColumnRef>,
    pub term: Option<ColumnRef>,
    pub written: Option<ColumnRef>,
    pub oral: Option<ColumnRef>,
    pub practical: Option<ColumnRef>,
    pub absence: Option<ColumnRef>,
    /// Report lines: "CF: <header>", "Materia: <header>", ...
    pub found: Vec<String>,
    pub missing: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn resolve_period_columns(t: &Table) -> Result<PeriodColumns, PeriodError> {
    if t.is_empty() {
        return Err(PeriodError::Empty);
    }
    let h = t.headers();
    let mut c = PeriodColumns::default();

    let code = resolve_column(h, al::PERIOD_CODE, true).ok_or(PeriodError::MissingIdentifierColumn)?;
    c.found.push(format!("CF: {}", t.header(code)));
    let subject = resolve_column(h, al::PERIOD_SUBJECT, true).ok_or(PeriodError::MissingSubjectColumn)?;
    c.found.push(format!("Materia: {}", t.header(subject)));
    c.code = Some(code);
    c.subject = Some(subject);

    let year = resolve_column(h, al::PERIOD_YEAR, false);
    let section = resolve_column(h, al::PERIOD_SECTION, false);
    let sigla = resolve_column(h, al::PERIOD_CLASS_SIGLA, true);

    match (year, section, sigla) {
        (Some(y), Some(s), _) => {
            c.found.push(format!("Anno: {}", t.header(y)));
            c.found.push(format!("Sezione: {}", t.header(s)));
            c.year = Some(y);
            c.section = Some(s);
        }
        (_, _, Some(k)) => {
            c.found.push(format!("Classe: {} (will extract Anno/Sezione)", t.header(k)));
            c.class_sigla = Some(k);
        }
        _ => {
            c.missing.push("Anno/Sezione o Classe_Sigla".to_string());
            c.warnings.push("Colonne Anno/Sezione o Classe non trovate - la classe sarà vuota".to_string());
        }
    }

    let mut optional = |aliases: &[&str], label: &str, missing_label: &str| -> Option<ColumnRef> {
        match resolve_column(h, aliases, true) {
            Some(col) => {
                c.found.push(format!("{label}: {}", t.header(col)));
                Some(col)
            }
            None => {
                c.missing.push(missing_label.to_string());
                None
            }
        }
    };
    let term = optional(al::PERIOD_TERM, "Quadrimestre", "Quadrimestre (default: 1)");
    let written = optional(al::PERIOD_WRITTEN, "VotoScritto", "VotoScritto");
    let oral = optional(al::PERIOD_ORAL, "VotoOrale", "VotoOrale");
    let practical = optional(al::PERIOD_PRACTICAL, "VotoPratico", "VotoPratico");
    let absence = optional(al::PERIOD_ABSENCE, "OreAssenza", "OreAssenza");
    c.term = term;
    c.written = written;
    c.oral = oral;
    c.practical = practical;
    c.absence = absence;

    debug!(found = ?c.found, missing = ?c.missing, "period columns resolved");
    Ok(c)
}

// ----------------------------- Output row --------------------------------------------

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PeriodRow {
    pub hash: String,
    pub class_label: String,
    pub year: String,
    pub section: String,
    pub term: String,
    pub subject: String,
    pub written: String,
    pub written_numeric: String,
    pub oral: String,
    pub oral_numeric: String,
    pub practical: String,
    pub practical_numeric: String,
    pub absence: String,
    pub absence_numeric: String,
}

impl PeriodRow {
    pub const CSV_HEADERS: [&'static str; 14] = [
        "Hash",
        "Classe_Sigla",
        "Anno",
        "Sezione",
        "Quadrimestre",
        "Materia",
        "VotoScritto",
        "VotoScrittoNumerico",
        "VotoOrale",
        "VotoOraleNumerico",
        "VotoPratico",
        "VotoPraticoNumerico",
        "OreAssenza",
        "OreAssenzaNumerico",
    ];

    pub fn csv_record(&self) -> [&str; 14] {
        [
            &self.hash,
            &self.class_label,
            &self.year,
            &self.section,
            &self.term,
            &self.subject,
            &self.written,
            &self.written_numeric,
            &self.oral,
            &self.oral_numeric,
            &self.practical,
            &self.practical_numeric,
            &self.absence,
            &self.absence_numeric,
        ]
    }
}

// ----------------------------- Plan --------------------------------------------------

/// Row counters surfaced in the report (never in `errors`).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PeriodCounters {
    pub rows_in_file: usize,
    pub processed: usize,
    pub skipped_invalid_identifier: usize,
    /// Non-empty identifiers failing validation, over ALL rows (excluded ones too).
    pub invalid_identifiers: usize,
    pub excluded_subjects: usize,
    pub unique_students: usize,
}

#[derive(Clone, Debug)]
struct PendingRow {
    identifier: String,
    row: PeriodRow,
}

#[derive(Clone, Debug, Default)]
pub struct PeriodPlan {
    pending: Vec<PendingRow>,
    unique_identifiers: BTreeSet<String>,
    pub counters: PeriodCounters,
}

fn exclusion_list(params: &Params) -> Vec<String> {
    let mut v: Vec<String> = EXCLUDED_SUBJECTS.iter().map(|s| s.to_string()).collect();
    if params.exclude_conduct {
        v.extend(CONDUCT_SUBJECTS.iter().map(|s| s.to_string()));
    }
    v.extend(params.extra_excluded_subjects.iter().map(|s| s.trim().to_uppercase()));
    v
}

fn is_excluded(subject: &str, list: &[String]) -> bool {
    let upper = subject.to_uppercase();
    let upper = upper.trim();
    list.iter().any(|e| upper.contains(e.as_str()))
}

fn class_parts(rec: &Record, cols: &PeriodColumns) -> (String, String) {
    if cols.year.is_some() && cols.section.is_some() {
        return (rec.get_trim(cols.year).to_string(), rec.get_trim(cols.section).to_uppercase());
    }
    if cols.class_sigla.is_some() {
        let sigla = squash_upper(rec.get_trim(cols.class_sigla));
        return match SIGLA_MULTI.captures(&sigla) {
            Some(m) => (m[1].to_string(), m[2].to_string()),
            None => (sigla, String::new()),
        };
    }
    (String::new(), String::new())
}

pub fn plan_period(t: &Table, cols: &PeriodColumns, params: &Params) -> PeriodPlan {
    let excluded = exclusion_list(params);
    let mut plan = PeriodPlan::default();
    plan.counters.rows_in_file = t.len();

    for rec in t.records() {
        let code = rec.get_trim(cols.code).to_uppercase();
        if !code.is_empty() {
            if is_valid_identifier(&code) {
                plan.unique_identifiers.insert(code);
            } else {
                plan.counters.invalid_identifiers += 1;
            }
        }
    }
    plan.counters.unique_students = plan.unique_identifiers.len();

    for rec in t.records() {
        let code = rec.get_trim(cols.code).to_uppercase();
        let subject = clean_subject(rec.get(cols.subject));

        if is_excluded(&subject, &excluded) {
            plan.counters.excluded_subjects += 1;
            continue;
        }
        if code.is_empty() || !is_valid_identifier(&code) {
            plan.counters.skipped_invalid_identifier += 1;
            continue;
        }

        let (year, section) = class_parts(rec, cols);
        let class_label = match (year.is_empty(), section.is_empty()) {
            (false, false) => format!("{year}{section}"),
            (false, true) => year.clone(),
            _ => section.clone(),
        };
        let term = match rec.get_trim(cols.term) {
            "" => DEFAULT_TERM.to_string(),
            t => t.to_string(),
        };
        let channel = |col: Option<ColumnRef>| {
            let raw = rec.get_trim(col).to_string();
            let num = numeric_or_empty(&raw);
            (raw, num)
        };
        let (written, written_numeric) = channel(cols.written);
        let (oral, oral_numeric) = channel(cols.oral);
        let (practical, practical_numeric) = channel(cols.practical);
        let (absence, absence_numeric) = channel(cols.absence);

        plan.pending.push(PendingRow {
            identifier: code,
            row: PeriodRow {
                hash: String::new(),
                class_label,
                year,
                section,
                term,
                subject,
                written,
                written_numeric,
                oral,
                oral_numeric,
                practical,
                practical_numeric,
                absence,
                absence_numeric,
            },
        });
        plan.counters.processed += 1;
    }

    debug!(counters = ?plan.counters, "period plan built");
    plan
}

impl PeriodPlan {
    /// Distinct valid identifiers seen anywhere in the file (sorted).
    pub fn identifiers_to_hash(&self) -> Vec<String> {
        self.unique_identifiers.iter().cloned().collect()
    }

    pub fn assemble(self, digests: &BTreeMap<String, String>) -> (Vec<PeriodRow>, PeriodCounters) {
        let mut rows: Vec<PeriodRow> = self
            .pending
            .into_iter()
            .map(|p| PeriodRow { hash: digests.get(&p.identifier).cloned().unwrap_or_default(), ..p.row })
            .collect();
        rows.sort_by(|a, b| {
            collate_cmp(&a.hash, &b.hash)
                .then_with(|| collate_cmp(&a.year, &b.year))
                .then_with(|| collate_cmp(&a.section, &b.section))
                .then_with(|| collate_cmp(&a.subject, &b.subject))
        });
        (rows, self.counters)
    }
}
