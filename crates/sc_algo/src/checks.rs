// crates/sc_algo/src/checks.rs
//
// Coherence battery over merged rows (final-outcome flow only).
//
//   1   suspended           → at least one academic initial grade below threshold
//   2   suspended+admitted  → no academic final grade below threshold
//   3a  suspended+admitted  → every changed academic grade goes from failing to
//                             passing without decreasing
//   3b  suspended+rejected  → at least one academic final grade below threshold
//
// Students are grouped by `MergedRow::student_ref`, visited in first-seen order
// over the (already sorted) rows. Anomaly lists are complete; truncation happens
// at render time.

use sc_core::{dedup_first_seen, parse_number, Params};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::merge::MergedRow;

/// Pseudo-subjects skipped by every check (substring, case-insensitive).
pub const NON_ACADEMIC: &[&str] = &["ESITO", "ASSENZE", "CREDITO"];

pub const SUSPENDED: &str = "sospeso";
pub const ADMITTED: &str = "ammesso";

pub fn is_academic(subject: &str) -> bool {
    let upper = subject.to_uppercase();
    !NON_ACADEMIC.iter().any(|x| upper.contains(x))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChangeReason {
    AlreadySufficient,
    StillInsufficient,
    Decreased,
}

impl ChangeReason {
    pub fn label(self) -> &'static str {
        match self {
            ChangeReason::AlreadySufficient => "Voto iniziale già sufficiente",
            ChangeReason::StillInsufficient => "Voto finale ancora insufficiente",
            ChangeReason::Decreased => "Voto finale diminuito",
        }
    }
}

/// Student whose lowest grade contradicts the outcome (checks 1 and 3b).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MinGradeAnomaly {
    pub student: String,
    pub min_grade: f64,
}

/// First failing subject of an admitted student (check 2).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FailingSubject {
    pub student: String,
    pub subject: String,
    pub grade: f64,
}

/// Changed grade violating the failing→passing rule (check 3a).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChangeAnomaly {
    pub student: String,
    pub subject: String,
    pub initial: f64,
    pub final_grade: f64,
    pub reason: ChangeReason,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoherenceReport {
    /// Initial outcome "sospeso", first-seen order.
    pub suspended: Vec<String>,
    /// Suspended, final outcome "ammesso".
    pub admitted: Vec<String>,
    /// Suspended, any other final outcome.
    pub not_admitted: Vec<String>,
    pub check1: Vec<MinGradeAnomaly>,
    pub check2: Vec<FailingSubject>,
    /// Academic rows of admitted students whose initial and final text differ.
    pub changed_admitted: usize,
    pub check3a: Vec<ChangeAnomaly>,
    pub check3b: Vec<MinGradeAnomaly>,
}

impl CoherenceReport {
    pub fn anomaly_count(&self) -> usize {
        self.check1.len() + self.check2.len() + self.check3a.len() + self.check3b.len()
    }
}

fn academic_rows<'a>(rows: &'a [MergedRow], student: &'a str) -> impl Iterator<Item = &'a MergedRow> + 'a {
    rows.iter().filter(move |r| r.student_ref() == student && is_academic(&r.subject))
}

fn min_of(it: impl Iterator<Item = f64>) -> Option<f64> {
    it.fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.min(v))))
}

pub fn run_checks(rows: &[MergedRow], params: &Params) -> CoherenceReport {
    let pass = params.sufficiency_threshold;
    let outcomes: Vec<&MergedRow> = rows.iter().filter(|r| r.is_outcome()).collect();

    let suspended_rows = || outcomes.iter().filter(|r| r.initial.to_lowercase() == SUSPENDED);
    let suspended = dedup_first_seen(suspended_rows().map(|r| r.student_ref()));
    let admitted =
        dedup_first_seen(suspended_rows().filter(|r| r.final_value.to_lowercase() == ADMITTED).map(|r| r.student_ref()));
    let not_admitted =
        dedup_first_seen(suspended_rows().filter(|r| r.final_value.to_lowercase() != ADMITTED).map(|r| r.student_ref()));

    let mut report = CoherenceReport::default();

    for s in &suspended {
        if let Some(min) = min_of(academic_rows(rows, s).filter_map(|r| parse_number(&r.initial_numeric))) {
            if min >= pass {
                report.check1.push(MinGradeAnomaly { student: s.clone(), min_grade: min });
            }
        }
    }

    for s in &admitted {
        let failing = academic_rows(rows, s)
            .find_map(|r| parse_number(&r.final_numeric).filter(|v| *v < pass).map(|v| (r, v)));
        if let Some((r, grade)) = failing {
            report.check2.push(FailingSubject { student: s.clone(), subject: r.subject.clone(), grade });
        }
    }

    let changed: Vec<&MergedRow> = rows
        .iter()
        .filter(|r| admitted.iter().any(|s| s == r.student_ref()))
        .filter(|r| is_academic(&r.subject) && r.initial != r.final_value)
        .collect();
    report.changed_admitted = changed.len();
    for r in changed {
        let (Some(initial), Some(final_grade)) = (parse_number(&r.initial_numeric), parse_number(&r.final_numeric))
        else {
            continue;
        };
        let reason = if initial >= pass {
            ChangeReason::AlreadySufficient
        } else if final_grade < pass {
            ChangeReason::StillInsufficient
        } else if final_grade < initial {
            ChangeReason::Decreased
        } else {
            continue;
        };
        report.check3a.push(ChangeAnomaly {
            student: r.student_ref().to_string(),
            subject: r.subject.clone(),
            initial,
            final_grade,
            reason,
        });
    }

    for s in &not_admitted {
        if let Some(min) = min_of(academic_rows(rows, s).filter_map(|r| parse_number(&r.final_numeric))) {
            if min >= pass {
                report.check3b.push(MinGradeAnomaly { student: s.clone(), min_grade: min });
            }
        }
    }

    report.suspended = suspended;
    report.admitted = admitted;
    report.not_admitted = not_admitted;

    debug!(
        suspended = report.suspended.len(),
        admitted = report.admitted.len(),
        not_admitted = report.not_admitted.len(),
        anomalies = report.anomaly_count(),
        "coherence checks done"
    );
    report
}
