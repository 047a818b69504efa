// crates/sc_algo/src/merge.rs
//
// Merge engine: deferred-exam file ⋈ full roster on derived keys.
//
// Contract:
// - One output row per roster row, sorted by (identifier, year, section,
//   outcome-last, subject) under `collate_cmp`.
// - Per-subject grades come from the deferred file when its row_key is there,
//   otherwise from the roster value (never revisited).
// - Outcome maps keep the LAST non-empty value per student; the digest map keeps
//   the FIRST valid identifier per student. The asymmetry is intentional.
// - Digests are computed by the caller between `plan_merge` and `assemble`.

use std::collections::{BTreeMap, BTreeSet};

use sc_core::determinism::collate_cmp;
use sc_core::text::{normalize_spaces_upper, strip_subject_suffix};
use sc_core::{derive_initials, is_valid_identifier, numeric_or_empty, ColumnRef, PseudoId, Record, Table};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::class_label::{extract_class_label, split_label, ClassColumns};
use crate::columns::{aliases as al, exact_header, resolve_column};
use crate::errors::MergeError;
use crate::is_outcome_subject;
use crate::keys::DerivedKey;

/// Marker forcing spreadsheet text interpretation of the digest column.
pub const TEXT_MARKER: char = '\'';

// ----------------------------- Column resolution -------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DeferredColumns {
    pub surname: ColumnRef,
    pub name: ColumnRef,
    pub subject: ColumnRef,
    pub class: ClassColumns,
    pub grade: Option<ColumnRef>,
    pub exam_grade: Option<ColumnRef>,
    pub outcome: Option<ColumnRef>,
    pub exam_outcome: Option<ColumnRef>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RosterColumns {
    pub code: Option<ColumnRef>,
    pub subject: ColumnRef,
    pub value: ColumnRef,
    pub class: ClassColumns,
    pub surname: Option<ColumnRef>,
    pub name: Option<ColumnRef>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MergeColumns {
    pub deferred: DeferredColumns,
    pub roster: RosterColumns,
}

/// Resolve both sides once. Empty inputs and missing required columns are fatal.
pub fn resolve_merge_columns(deferred: &Table, roster: &Table) -> Result<MergeColumns, MergeError> {
    if deferred.is_empty() {
        return Err(MergeError::EmptyDeferred);
    }
    if roster.is_empty() {
        return Err(MergeError::EmptyRoster);
    }

    let dh = deferred.headers();
    let (surname, name, subject) = match (
        resolve_column(dh, al::DEFERRED_SURNAME, false),
        resolve_column(dh, al::DEFERRED_NAME, false),
        resolve_column(dh, al::DEFERRED_SUBJECT, true),
    ) {
        (Some(s), Some(n), Some(m)) => (s, n, m),
        _ => return Err(MergeError::MissingDeferredColumns),
    };
    let d = DeferredColumns {
        surname,
        name,
        subject,
        class: ClassColumns {
            sigla: exact_header(dh, al::CLASS_SIGLA),
            year: exact_header(dh, al::CLASS_YEAR),
            desc: exact_header(dh, al::DEFERRED_CLASS_DESC),
            class: exact_header(dh, al::CLASS),
        },
        grade: resolve_column(dh, al::DEFERRED_GRADE, true),
        exam_grade: resolve_column(dh, al::DEFERRED_EXAM_GRADE, true),
        outcome: resolve_column(dh, al::DEFERRED_OUTCOME, false),
        exam_outcome: resolve_column(dh, al::DEFERRED_EXAM_OUTCOME, true),
    };

    let rh = roster.headers();
    let (subject, value) = match (
        resolve_column(rh, al::ROSTER_SUBJECT, true),
        resolve_column(rh, al::ROSTER_VALUE, true),
    ) {
        (Some(m), Some(v)) => (m, v),
        _ => return Err(MergeError::MissingRosterColumns),
    };
    let r = RosterColumns {
        code: resolve_column(rh, al::ROSTER_CODE, true),
        subject,
        value,
        class: ClassColumns {
            sigla: exact_header(rh, al::CLASS_SIGLA),
            year: exact_header(rh, al::CLASS_YEAR),
            desc: exact_header(rh, al::ROSTER_CLASS_DESC),
            class: exact_header(rh, al::CLASS),
        },
        surname: resolve_column(rh, al::DEFERRED_SURNAME, false),
        name: resolve_column(rh, al::DEFERRED_NAME, false),
    };

    debug!(deferred = ?d, roster = ?r, "merge columns resolved");
    Ok(MergeColumns { deferred: d, roster: r })
}

// ----------------------------- Output row --------------------------------------------

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MergedRow {
    /// Raw roster identifier, kept for cross-referencing only; never exported.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub identifier: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub student_key: String,
    pub hash: String,
    pub subject: String,
    pub class_label: String,
    pub year: String,
    pub section: String,
    pub initial: String,
    pub initial_numeric: String,
    pub final_value: String,
    pub final_numeric: String,
}

impl MergedRow {
    pub const CSV_HEADERS: [&'static str; 9] = [
        "Hash",
        "Materia",
        "Classe_Sigla",
        "Anno",
        "Sezione",
        "EsitoIniziale",
        "EsitoInizialeNumerico",
        "EsitoFinale",
        "EsitoFinaleNumerico",
    ];

    pub fn csv_record(&self) -> [&str; 9] {
        [
            &self.hash,
            &self.subject,
            &self.class_label,
            &self.year,
            &self.section,
            &self.initial,
            &self.initial_numeric,
            &self.final_value,
            &self.final_numeric,
        ]
    }

    /// Student identity used by the coherence battery: raw identifier, else student key.
    pub fn student_ref(&self) -> &str {
        if self.identifier.is_empty() {
            &self.student_key
        } else {
            &self.identifier
        }
    }

    pub fn is_outcome(&self) -> bool {
        is_outcome_subject(&self.subject)
    }
}

// ----------------------------- Plan ---------------------------------------------------

#[derive(Clone, Debug)]
struct RosterEntry {
    key: DerivedKey,
    identifier: String,
    subject: String,
}

/// Keys and lookup maps built from both inputs; digests still pending.
#[derive(Clone, Debug, Default)]
pub struct MergePlan {
    roster: Vec<RosterEntry>,
    keys_in_deferred: BTreeSet<String>,
    grade_initial: BTreeMap<String, String>,
    grade_deferred: BTreeMap<String, String>,
    outcome_initial: BTreeMap<String, String>,
    outcome_deferred: BTreeMap<String, String>,
    roster_values: BTreeMap<String, String>,
    /// student_key → first valid identifier (trimmed, upper-cased).
    hash_source: BTreeMap<String, String>,
}

fn deferred_key(rec: &Record, c: &DeferredColumns) -> DerivedKey {
    DerivedKey::new(
        derive_initials(rec.get(Some(c.surname)), rec.get(Some(c.name))),
        extract_class_label(rec, &c.class),
        normalize_spaces_upper(rec.get(Some(c.subject))),
    )
}

fn roster_key(rec: &Record, c: &RosterColumns) -> DerivedKey {
    let code = rec.get(c.code);
    let pseudo_id = if !code.is_empty() {
        PseudoId::from_code_prefix(code)
    } else if c.surname.is_some() && c.name.is_some() {
        derive_initials(rec.get(c.surname), rec.get(c.name))
    } else {
        PseudoId::default()
    };
    DerivedKey::new(
        pseudo_id,
        extract_class_label(rec, &c.class),
        normalize_spaces_upper(rec.get(Some(c.subject))),
    )
}

/// Last non-empty trimmed value of `col` per student key.
fn last_non_empty_by_student(
    rows: &[(DerivedKey, &Record)],
    col: Option<ColumnRef>,
) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    if col.is_none() {
        return out;
    }
    for (k, rec) in rows {
        let v = rec.get_trim(col);
        if !v.is_empty() {
            out.insert(k.student_key(), v.to_string());
        }
    }
    out
}

/// Last-write-wins trimmed value of `col` per row key.
fn last_by_row(rows: &[(DerivedKey, &Record)], col: Option<ColumnRef>) -> BTreeMap<String, String> {
    if col.is_none() {
        return BTreeMap::new();
    }
    rows.iter().map(|(k, rec)| (k.row_key(), rec.get_trim(col).to_string())).collect()
}

pub fn plan_merge(deferred: &Table, roster: &Table, cols: &MergeColumns) -> MergePlan {
    let d: Vec<(DerivedKey, &Record)> =
        deferred.records().iter().map(|r| (deferred_key(r, &cols.deferred), r)).collect();
    let a: Vec<(DerivedKey, &Record)> =
        roster.records().iter().map(|r| (roster_key(r, &cols.roster), r)).collect();

    let keys_in_deferred: BTreeSet<String> = d.iter().map(|(k, _)| k.row_key()).collect();

    let grade_initial = last_by_row(&d, cols.deferred.grade);
    let grade_deferred = last_by_row(&d, cols.deferred.exam_grade);
    let outcome_initial = last_non_empty_by_student(&d, cols.deferred.outcome);
    let outcome_deferred = last_non_empty_by_student(&d, cols.deferred.exam_outcome);

    // Untrimmed on purpose: trimming happens where the value is read.
    let roster_values: BTreeMap<String, String> = a
        .iter()
        .map(|(k, rec)| (k.row_key(), rec.get(Some(cols.roster.value)).to_string()))
        .collect();

    let mut hash_source = BTreeMap::new();
    if cols.roster.code.is_some() {
        for (k, rec) in &a {
            let code = rec.get_trim(cols.roster.code).to_uppercase();
            let sk = k.student_key();
            if !hash_source.contains_key(&sk) && !code.is_empty() && is_valid_identifier(&code) {
                hash_source.insert(sk, code);
            }
        }
    }

    let roster_entries: Vec<RosterEntry> = a
        .into_iter()
        .map(|(key, rec)| RosterEntry {
            identifier: rec.get_trim(cols.roster.code).to_string(),
            subject: rec.get(Some(cols.roster.subject)).to_string(),
            key,
        })
        .collect();

    debug!(
        deferred_rows = d.len(),
        roster_rows = roster_entries.len(),
        deferred_keys = keys_in_deferred.len(),
        students_with_identifier = hash_source.len(),
        "merge plan built"
    );

    MergePlan {
        roster: roster_entries,
        keys_in_deferred,
        grade_initial,
        grade_deferred,
        outcome_initial,
        outcome_deferred,
        roster_values,
        hash_source,
    }
}

impl MergePlan {
    /// Distinct identifiers that need a digest (sorted).
    pub fn identifiers_to_hash(&self) -> Vec<String> {
        let set: BTreeSet<&String> = self.hash_source.values().collect();
        set.into_iter().cloned().collect()
    }

    /// Build and sort output rows. `digests` maps identifier → digest; a missing
    /// digest leaves the hash empty.
    pub fn assemble(&self, digests: &BTreeMap<String, String>) -> Vec<MergedRow> {
        let mut out: Vec<MergedRow> = self.roster.iter().map(|e| self.row_for(e, digests)).collect();
        sort_merged(&mut out);
        out
    }

    fn row_for(&self, e: &RosterEntry, digests: &BTreeMap<String, String>) -> MergedRow {
        let row_key = e.key.row_key();
        let student_key = e.key.student_key();
        let (initial, final_value) = if e.key.subject_key == crate::OUTCOME_SUBJECT {
            let initial = or_else(
                get(&self.outcome_initial, &student_key),
                get(&self.roster_values, &row_key),
            )
            .trim()
            .to_string();
            let fin = or_else(get(&self.outcome_deferred, &student_key), &initial).trim().to_string();
            (initial, fin)
        } else if self.keys_in_deferred.contains(&row_key) {
            let initial = get(&self.grade_initial, &row_key).trim().to_string();
            let fin = or_else(get(&self.grade_deferred, &row_key).trim(), &initial);
            (initial, fin)
        } else {
            let v = get(&self.roster_values, &row_key).trim().to_string();
            (v.clone(), v)
        };

        let hash = self
            .hash_source
            .get(&student_key)
            .and_then(|code| digests.get(code))
            .filter(|d| !d.is_empty())
            .map(|d| format!("{TEXT_MARKER}{d}"))
            .unwrap_or_default();

        let parts = split_label(&e.key.class_label);
        let class_label =
            if parts.is_split() { format!("{}{}", parts.year, parts.section) } else { e.key.class_label.clone() };

        MergedRow {
            identifier: e.identifier.clone(),
            student_key,
            hash,
            subject: strip_subject_suffix(&e.subject).to_string(),
            class_label,
            year: parts.year,
            section: parts.section,
            initial_numeric: numeric_or_empty(&initial),
            final_numeric: numeric_or_empty(&final_value),
            initial,
            final_value,
        }
    }
}

fn get<'a>(m: &'a BTreeMap<String, String>, k: &str) -> &'a str {
    m.get(k).map(String::as_str).unwrap_or("")
}

/// `a || b` on strings.
fn or_else(a: &str, b: &str) -> String {
    (if a.is_empty() { b } else { a }).to_string()
}

/// Stable sort: identifier, year, section, outcome rows last, subject.
pub fn sort_merged(rows: &mut [MergedRow]) {
    rows.sort_by(|a, b| {
        collate_cmp(&a.identifier, &b.identifier)
            .then_with(|| collate_cmp(&a.year, &b.year))
            .then_with(|| collate_cmp(&a.section, &b.section))
            .then_with(|| a.is_outcome().cmp(&b.is_outcome()))
            .then_with(|| collate_cmp(&a.subject, &b.subject))
    });
}
