// crates/sc_algo/src/stats.rs
//
// Aggregates over already-produced output rows. Pure; empty input gives a zeroed
// snapshot and empty distributions.
//
// "Best grade" of a single-period row = mean of whichever of oral / written /
// practical numeric channels are present. NC rows count toward a subject's total
// and its NC tally, never toward means or failure rates.

use std::collections::{BTreeMap, BTreeSet};

use sc_core::determinism::collate_cmp;
use sc_core::{format_number, parse_number, Params};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::merge::MergedRow;
use crate::period::PeriodRow;

/// Not-graded markers (compared trimmed, upper-cased).
pub const NC_MARKERS: &[&str] = &["NC", "N.C.", "N/C", "NON CLASSIFICATO"];

pub fn is_nc(cell: &str) -> bool {
    let upper = cell.trim().to_uppercase();
    NC_MARKERS.contains(&upper.as_str())
}

fn has_nc(r: &PeriodRow) -> bool {
    is_nc(&r.oral) || is_nc(&r.written) || is_nc(&r.practical)
}

pub fn best_grade(r: &PeriodRow) -> Option<f64> {
    let grades: Vec<f64> =
        [&r.oral_numeric, &r.written_numeric, &r.practical_numeric].into_iter().filter_map(|c| parse_number(c)).collect();
    if grades.is_empty() {
        None
    } else {
        Some(grades.iter().sum::<f64>() / grades.len() as f64)
    }
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

// ----------------------------- Snapshot types ----------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubjectStats {
    pub subject: String,
    /// Graded rows plus NC rows.
    pub total: usize,
    pub failures: usize,
    /// Over graded rows only.
    pub failure_pct: f64,
    pub mean: f64,
    pub nc: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistributionBucket {
    pub label: String,
    pub count: usize,
    pub pct: f64,
}

/// Student singled out by a dashboard signal (NC grades, absences).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlaggedStudent {
    pub hash: String,
    pub class_label: String,
    pub problem: String,
    pub detail: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatsSnapshot {
    pub total_students: usize,
    pub total_classes: usize,
    pub total_subjects: usize,
    pub total_rows: usize,
    /// Sorted by failure percentage, highest first.
    pub subjects: Vec<SubjectStats>,
    pub distribution: Vec<DistributionBucket>,
    pub distribution_by_year: BTreeMap<String, Vec<DistributionBucket>>,
    pub students_by_year: BTreeMap<String, usize>,
    pub oral_mean: f64,
    pub written_mean: f64,
    /// Failures over all best grades.
    pub failure_pct: f64,
    pub nc_students: Vec<FlaggedStudent>,
    pub high_absence: Vec<FlaggedStudent>,
    pub nc_total: usize,
    pub absence_threshold: f64,
}

impl StatsSnapshot {
    pub fn bucket_count(&self, label: &str) -> usize {
        self.distribution.iter().find(|b| b.label == label).map_or(0, |b| b.count)
    }
}

pub const BUCKET_LABELS: [&str; 5] =
    ["Nessuna insuff.", "1 insufficienza", "2 insufficienze", "3 insufficienze", "4+ insufficienze"];

/// Five fixed buckets (0, 1, 2, 3, 4+). Empty cohort → no buckets.
pub fn distribution(failures_per_student: &[usize]) -> Vec<DistributionBucket> {
    if failures_per_student.is_empty() {
        return Vec::new();
    }
    let mut counts = [0usize; 5];
    for &n in failures_per_student {
        counts[n.min(4)] += 1;
    }
    BUCKET_LABELS
        .iter()
        .zip(counts)
        .map(|(label, count)| DistributionBucket {
            label: label.to_string(),
            count,
            pct: pct(count, failures_per_student.len()),
        })
        .collect()
}

// ----------------------------- Single-period statistics ------------------------------

#[derive(Default)]
struct SubjectAcc {
    total: usize,
    failures: usize,
    sum: f64,
    nc: usize,
}

pub fn compute_stats(rows: &[PeriodRow], params: &Params) -> StatsSnapshot {
    let pass = params.sufficiency_threshold;

    let students: BTreeSet<&str> = rows.iter().map(|r| r.hash.as_str()).collect();
    let classes: BTreeSet<&str> = rows.iter().map(|r| r.class_label.as_str()).collect();
    let subjects: BTreeSet<&str> = rows.iter().map(|r| r.subject.as_str()).collect();

    let mut by_year: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    for r in rows {
        by_year.entry(r.year.clone()).or_default().insert(r.hash.as_str());
    }
    let students_by_year = by_year.iter().map(|(y, s)| (y.clone(), s.len())).collect();

    // per subject
    let mut acc: BTreeMap<&str, SubjectAcc> = BTreeMap::new();
    for r in rows {
        let a = acc.entry(r.subject.as_str()).or_default();
        if has_nc(r) {
            a.nc += 1;
            a.total += 1;
        } else if let Some(v) = best_grade(r) {
            a.total += 1;
            a.sum += v;
            if v < pass {
                a.failures += 1;
            }
        }
    }
    let mut subject_stats: Vec<SubjectStats> = acc
        .into_iter()
        .map(|(subject, a)| {
            let graded = a.total - a.nc;
            SubjectStats {
                subject: subject.to_string(),
                total: a.total,
                failures: a.failures,
                failure_pct: pct(a.failures, graded),
                mean: if graded > 0 { a.sum / graded as f64 } else { 0.0 },
                nc: a.nc,
            }
        })
        .collect();
    subject_stats
        .sort_by(|a, b| b.failure_pct.total_cmp(&a.failure_pct).then_with(|| collate_cmp(&a.subject, &b.subject)));

    // per student (first graded row fixes the year)
    let mut per_student: BTreeMap<&str, (&str, usize)> = BTreeMap::new();
    for r in rows {
        let Some(v) = best_grade(r) else { continue };
        let e = per_student.entry(r.hash.as_str()).or_insert((r.year.as_str(), 0));
        if v < pass {
            e.1 += 1;
        }
    }
    let counts: Vec<usize> = per_student.values().map(|(_, n)| *n).collect();
    let distribution_by_year = by_year
        .keys()
        .map(|y| {
            let in_year: Vec<usize> = per_student.values().filter(|(yy, _)| *yy == y.as_str()).map(|(_, n)| *n).collect();
            (y.clone(), distribution(&in_year))
        })
        .collect();

    let oral: Vec<f64> = rows.iter().filter_map(|r| parse_number(&r.oral_numeric)).collect();
    let written: Vec<f64> = rows.iter().filter_map(|r| parse_number(&r.written_numeric)).collect();
    let best: Vec<f64> = rows.iter().filter_map(best_grade).collect();
    let best_failures = best.iter().filter(|v| **v < pass).count();

    // NC students, first-seen order
    let mut nc_total = 0;
    let mut nc_order: Vec<&str> = Vec::new();
    let mut nc_info: BTreeMap<&str, (&str, Vec<&str>)> = BTreeMap::new();
    for r in rows.iter().filter(|r| has_nc(r)) {
        nc_total += 1;
        let e = nc_info.entry(r.hash.as_str()).or_insert_with(|| {
            nc_order.push(r.hash.as_str());
            (r.class_label.as_str(), Vec::new())
        });
        e.1.push(r.subject.as_str());
    }
    let nc_students = nc_order
        .iter()
        .filter_map(|h| nc_info.get(h).map(|info| (*h, info)))
        .map(|(hash, (class_label, subjects))| {
            let shown = subjects.iter().take(3).copied().collect::<Vec<_>>().join(", ");
            let more = if subjects.len() > 3 { "..." } else { "" };
            FlaggedStudent {
                hash: hash.to_string(),
                class_label: class_label.to_string(),
                problem: "NC".into(),
                detail: format!("{} materie: {shown}{more}", subjects.len()),
            }
        })
        .collect();

    // absences
    let mut abs_order: Vec<&str> = Vec::new();
    let mut abs: BTreeMap<&str, (&str, f64)> = BTreeMap::new();
    for r in rows {
        let Some(h) = parse_number(&r.absence_numeric) else { continue };
        let e = abs.entry(r.hash.as_str()).or_insert_with(|| {
            abs_order.push(r.hash.as_str());
            (r.class_label.as_str(), 0.0)
        });
        e.1 += h;
    }
    let mut heavy: Vec<(&str, &str, f64)> = abs_order
        .iter()
        .filter_map(|h| abs.get(h).map(|(c, t)| (*h, *c, *t)))
        .filter(|(_, _, t)| *t >= params.absence_threshold_hours)
        .collect();
    heavy.sort_by(|a, b| b.2.total_cmp(&a.2));
    let high_absence = heavy
        .into_iter()
        .map(|(hash, class_label, total)| FlaggedStudent {
            hash: hash.to_string(),
            class_label: class_label.to_string(),
            problem: "Assenze".into(),
            detail: format!("{} ore totali", format_number(total)),
        })
        .collect();

    StatsSnapshot {
        total_students: students.len(),
        total_classes: classes.len(),
        total_subjects: subjects.len(),
        total_rows: rows.len(),
        subjects: subject_stats,
        distribution: distribution(&counts),
        distribution_by_year,
        students_by_year,
        oral_mean: mean(&oral),
        written_mean: mean(&written),
        failure_pct: pct(best_failures, best.len()),
        nc_students,
        high_absence,
        nc_total,
        absence_threshold: params.absence_threshold_hours,
    }
}

// ----------------------------- Report-level summaries --------------------------------

/// One grade channel of the single-period report ("Voti Orali", ...).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelSummary {
    pub count: usize,
    pub mean: f64,
    pub failures: usize,
}

impl ChannelSummary {
    pub fn failure_pct(&self) -> f64 {
        pct(self.failures, self.count)
    }
}

pub fn channel_summary<'a>(cells: impl IntoIterator<Item = &'a str>, pass: f64) -> ChannelSummary {
    let grades: Vec<f64> = cells.into_iter().filter_map(parse_number).collect();
    ChannelSummary { count: grades.len(), mean: mean(&grades), failures: grades.iter().filter(|v| **v < pass).count() }
}

/// Section A of the final-outcome report.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MergeSummary {
    /// Subject rows exist (year/section/class tallies are meaningful).
    pub has_subject_rows: bool,
    pub students_by_year: BTreeMap<String, usize>,
    pub students_by_section: BTreeMap<String, usize>,
    pub students_by_class: BTreeMap<String, usize>,
    pub outcome_rows: usize,
    /// Non-empty initial outcomes.
    pub initial_outcomes: BTreeMap<String, usize>,
    /// Outcome rows with initial "sospeso" (rows, not distinct students).
    pub suspended_rows: usize,
    /// Non-empty final outcomes among those rows.
    pub suspended_final: BTreeMap<String, usize>,
}

pub fn merge_summary(rows: &[MergedRow]) -> MergeSummary {
    let mut s = MergeSummary::default();

    let mut seen: BTreeSet<(&str, &str, &str)> = BTreeSet::new();
    for r in rows.iter().filter(|r| !r.is_outcome()) {
        s.has_subject_rows = true;
        if seen.insert((r.student_ref(), r.year.as_str(), r.section.as_str())) {
            *s.students_by_year.entry(r.year.clone()).or_default() += 1;
            *s.students_by_section.entry(r.section.clone()).or_default() += 1;
            *s.students_by_class.entry(format!("{}{}", r.year, r.section)).or_default() += 1;
        }
    }

    for r in rows.iter().filter(|r| r.is_outcome()) {
        s.outcome_rows += 1;
        if !r.initial.is_empty() {
            *s.initial_outcomes.entry(r.initial.clone()).or_default() += 1;
        }
        if r.initial.to_lowercase() == crate::checks::SUSPENDED {
            s.suspended_rows += 1;
            if !r.final_value.is_empty() {
                *s.suspended_final.entry(r.final_value.clone()).or_default() += 1;
            }
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sc_core::numeric_or_empty;

    fn prow(hash: &str, year: &str, subject: &str, oral: &str, written: &str, absence: &str) -> PeriodRow {
        PeriodRow {
            hash: hash.into(),
            class_label: format!("{year}A"),
            year: year.into(),
            section: "A".into(),
            term: "1".into(),
            subject: subject.into(),
            oral: oral.into(),
            oral_numeric: numeric_or_empty(oral),
            written: written.into(),
            written_numeric: numeric_or_empty(written),
            absence: absence.into(),
            absence_numeric: numeric_or_empty(absence),
            ..PeriodRow::default()
        }
    }

    #[test]
    fn empty_input_is_zeroed() {
        let s = compute_stats(&[], &Params::default());
        assert_eq!(s.total_rows, 0);
        assert!(s.distribution.is_empty());
        assert!(s.subjects.is_empty());
        assert_eq!(s.oral_mean, 0.0);
        assert_eq!(s.absence_threshold, 50.0);
    }

    #[test]
    fn best_grade_averages_present_channels() {
        assert_eq!(best_grade(&prow("h", "1", "M", "5", "7", "")), Some(6.0));
        assert_eq!(best_grade(&prow("h", "1", "M", "", "8", "")), Some(8.0));
        assert_eq!(best_grade(&prow("h", "1", "M", "NC", "", "")), None);
    }

    #[test]
    fn subjects_exclude_nc_from_rates() {
        let rows = vec![
            prow("a", "1", "MATEMATICA", "4", "", ""),
            prow("b", "1", "MATEMATICA", "8", "", ""),
            prow("c", "1", "MATEMATICA", "N.C.", "", ""),
            prow("a", "1", "STORIA", "7", "", ""),
        ];
        let s = compute_stats(&rows, &Params::default());
        let m = &s.subjects[0];
        assert_eq!(m.subject, "MATEMATICA");
        assert_eq!((m.total, m.failures, m.nc), (3, 1, 1));
        assert_eq!(m.failure_pct, 50.0);
        assert_eq!(m.mean, 6.0);
        assert_eq!(s.subjects[1].failure_pct, 0.0);
        assert_eq!(s.nc_total, 1);
        assert_eq!(s.nc_students[0].detail, "1 materie: MATEMATICA");
    }

    #[test]
    fn distribution_buckets_students() {
        let mut rows = Vec::new();
        for subj in ["A", "B", "C", "D", "E"] {
            rows.push(prow("bad", "2", subj, "3", "", ""));
        }
        rows.push(prow("good", "1", "A", "9", "", ""));
        rows.push(prow("nograde", "1", "A", "", "", ""));
        let s = compute_stats(&rows, &Params::default());
        assert_eq!(s.bucket_count("Nessuna insuff."), 1);
        assert_eq!(s.bucket_count("4+ insufficienze"), 1);
        assert_eq!(s.distribution.iter().map(|b| b.count).sum::<usize>(), 2);
        assert_eq!(s.distribution_by_year["2"][4].count, 1);
        assert_eq!(s.distribution_by_year["1"][0].pct, 100.0);
        assert_eq!(s.students_by_year["1"], 2);
        assert_eq!(s.total_students, 3);
    }

    #[test]
    fn nc_detail_truncates_after_three() {
        let rows: Vec<PeriodRow> =
            ["A", "B", "C", "D"].iter().map(|m| prow("h", "1", m, "nc", "", "")).collect();
        let s = compute_stats(&rows, &Params::default());
        assert_eq!(s.nc_students[0].detail, "4 materie: A, B, C...");
    }

    #[test]
    fn absences_sum_and_sort_descending() {
        let rows = vec![
            prow("x", "1", "A", "", "", "30"),
            prow("x", "1", "B", "", "", "20,5"),
            prow("y", "1", "A", "", "", "80"),
            prow("z", "1", "A", "", "", "49"),
        ];
        let s = compute_stats(&rows, &Params::default());
        let got: Vec<(&str, &str)> = s.high_absence.iter().map(|f| (f.hash.as_str(), f.detail.as_str())).collect();
        assert_eq!(got, vec![("y", "80 ore totali"), ("x", "50.5 ore totali")]);
    }

    #[test]
    fn channel_summary_counts_failures() {
        let c = channel_summary(["4", "", "8", "NC", "6"], 6.0);
        assert_eq!((c.count, c.failures), (3, 1));
        assert_eq!(c.mean, 6.0);
        assert!((c.failure_pct() - 33.333).abs() < 0.01);
    }

    #[test]
    fn merge_summary_counts_unique_students() {
        let mk = |id: &str, subj: &str, year: &str, ini: &str, fin: &str| MergedRow {
            identifier: id.into(),
            subject: subj.into(),
            year: year.into(),
            section: "A".into(),
            initial: ini.into(),
            final_value: fin.into(),
            ..MergedRow::default()
        };
        let rows = vec![
            mk("a", "MAT", "3", "4", "6"),
            mk("a", "ITA", "3", "7", "7"),
            mk("a", "ESITO", "", "sospeso", "ammesso"),
            mk("b", "MAT", "4", "8", "8"),
            mk("b", "ESITO", "", "ammesso", "ammesso"),
        ];
        let s = merge_summary(&rows);
        assert!(s.has_subject_rows);
        assert_eq!(s.students_by_year.get("3"), Some(&1));
        assert_eq!(s.students_by_class.get("4A"), Some(&1));
        assert_eq!(s.students_by_section.get("A"), Some(&2));
        assert_eq!(s.outcome_rows, 2);
        assert_eq!(s.suspended_rows, 1);
        assert_eq!(s.suspended_final.get("ammesso"), Some(&1));
    }

    proptest! {
        #[test]
        fn distribution_partitions_cohort(counts in proptest::collection::vec(0usize..8, 1..60)) {
            let d = distribution(&counts);
            prop_assert_eq!(d.len(), 5);
            prop_assert_eq!(d.iter().map(|b| b.count).sum::<usize>(), counts.len());
            let total: f64 = d.iter().map(|b| b.pct).sum();
            prop_assert!((total - 100.0).abs() < 1e-6);
        }
    }
}
