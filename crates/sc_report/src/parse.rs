// crates/sc_report/src/parse.rs
//
// Companion parser: turns final-outcome report text back into structured
// sections. Matching is by fixed literals and per-line regexes; unknown lines
// are ignored.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use sc_core::{ControlResult, ControlStatus};

use crate::{OK_MARK, SECTION_CHECKS, SECTION_OUTCOMES, SECTION_STATS, SECTION_SUMMARY, TIMESTAMP_PREFIX, WARN_MARK};

macro_rules! re {
    ($name:ident, $pat:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($pat).expect("static regex"));
    };
}

re!(YEAR, r"Anno ([0-9]): ([0-9]+) studenti");
re!(SECTION, r"Sezione ([A-Z]): ([0-9]+) studenti");
re!(CLASS, r"Classe ([0-9][A-Z]): ([0-9]+) studenti");
re!(INITIAL, r"^\s*([A-Za-z\s]+): ([0-9]+) studenti$");
re!(SUSPENDED_TOTAL, r"Totale studenti con scrutinio sospeso: ([0-9]+)");
re!(FINAL, r"^\s*([A-Za-z\s]+): ([0-9]+) studenti \(([0-9]+\.?[0-9]*)%\)$");
re!(CHECK, r"^([0-9]+)\) (.+):$");
re!(SUB_CHECK, r"^([0-9]+[a-z])\) (.+)");
re!(SUSPENDED_IN_CHECKS, r"Studenti con scrutinio sospeso: ([0-9]+)");
re!(ROWS_TOTAL, r"Righe totali output: ([0-9]+)");
re!(STUDENTS_TOTAL, r"Studenti totali: ([0-9]+)");
re!(STUDENTS_SUSPENDED, r"Studenti sospesi: ([0-9]+)");

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StudentCounts {
    pub by_year: BTreeMap<String, usize>,
    pub by_section: BTreeMap<String, usize>,
    pub by_class: BTreeMap<String, usize>,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FinalOutcome {
    pub count: usize,
    pub pct: f64,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutcomeAnalysis {
    pub initial: BTreeMap<String, usize>,
    /// Sum of the initial-outcome counts.
    pub total_students: usize,
    pub total_suspended: usize,
    pub suspended_final: BTreeMap<String, FinalOutcome>,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportSummary {
    pub total_rows: usize,
    pub total_students: usize,
    pub suspended: usize,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportData {
    pub generated_at: String,
    pub statistics: StudentCounts,
    pub outcomes: OutcomeAnalysis,
    pub controls: Vec<ControlResult>,
    pub summary: ReportSummary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    None,
    Stats,
    Outcomes,
    Checks,
    Summary,
}

fn count(m: &regex::Captures<'_>, i: usize) -> usize {
    m.get(i).and_then(|x| x.as_str().parse().ok()).unwrap_or(0)
}

/// Parse report lines. Lines may carry embedded `\n`; each is trimmed first.
pub fn parse_report_lines<S: AsRef<str>>(lines: &[S]) -> ReportData {
    let mut out = ReportData::default();
    let mut section = Section::None;

    for raw in lines {
        let line = raw.as_ref().trim();

        if let Some(rest) = line.strip_prefix(TIMESTAMP_PREFIX) {
            out.generated_at = rest.trim().to_string();
            continue;
        }
        if line.starts_with(SECTION_STATS) {
            section = Section::Stats;
            continue;
        }
        if line.starts_with(SECTION_OUTCOMES) {
            section = Section::Outcomes;
            continue;
        }
        if line.starts_with(SECTION_CHECKS) {
            section = Section::Checks;
            continue;
        }
        if line.starts_with(SECTION_SUMMARY) {
            section = Section::Summary;
            continue;
        }

        match section {
            Section::None => {}
            Section::Stats => {
                let st = &mut out.statistics;
                if let Some(m) = YEAR.captures(line) {
                    st.by_year.insert(m[1].to_string(), count(&m, 2));
                }
                if let Some(m) = SECTION.captures(line) {
                    st.by_section.insert(m[1].to_string(), count(&m, 2));
                }
                if let Some(m) = CLASS.captures(line) {
                    st.by_class.insert(m[1].to_string(), count(&m, 2));
                }
            }
            Section::Outcomes => {
                let o = &mut out.outcomes;
                if !line.contains('%') {
                    if let Some(m) = INITIAL.captures(line) {
                        o.initial.insert(m[1].trim().to_string(), count(&m, 2));
                    }
                }
                if let Some(m) = SUSPENDED_TOTAL.captures(line) {
                    o.total_suspended = count(&m, 1);
                }
                if let Some(m) = FINAL.captures(line) {
                    let pct = m[3].parse().unwrap_or(0.0);
                    o.suspended_final.insert(m[1].trim().to_string(), FinalOutcome { count: count(&m, 2), pct });
                }
            }
            Section::Checks => {
                if parse_check_line(line, &mut out.controls) {
                    continue;
                }
                if let Some(m) = SUSPENDED_IN_CHECKS.captures(line) {
                    out.summary.suspended = count(&m, 1);
                }
            }
            Section::Summary => {
                if let Some(m) = ROWS_TOTAL.captures(line) {
                    out.summary.total_rows = count(&m, 1);
                }
                if let Some(m) = STUDENTS_TOTAL.captures(line) {
                    out.summary.total_students = count(&m, 1);
                }
                if let Some(m) = STUDENTS_SUSPENDED.captures(line) {
                    out.summary.suspended = count(&m, 1);
                }
            }
        }
    }

    out.outcomes.total_students = out.outcomes.initial.values().sum();
    out
}

/// Applies one section-B line to the control list. Returns true when the line
/// was consumed (no further matching on it).
fn parse_check_line(line: &str, controls: &mut Vec<ControlResult>) -> bool {
    if let Some(m) = CHECK.captures(line) {
        controls.push(ControlResult::new(format!("{}) {}", &m[1], &m[2])));
        return true;
    }
    if let Some(m) = SUB_CHECK.captures(line) {
        controls.push(ControlResult::new(format!("{}) {}", &m[1], &m[2])));
        return true;
    }
    let Some(c) = controls.last_mut() else {
        return false;
    };

    if line.len() >= 2 && line.starts_with('(') && line.ends_with(')') {
        c.description = line[1..line.len() - 1].to_string();
        return true;
    }
    if line.contains("OK:") || line.contains(OK_MARK) {
        c.status = ControlStatus::Ok;
        c.push_detail(line.replacen(OK_MARK, "", 1).replacen("OK:", "", 1).trim().to_string());
        return true;
    }
    if line.contains("ANOMALIA") || line.contains(WARN_MARK) {
        c.status = ControlStatus::Warning;
        c.push_detail(line.replacen(WARN_MARK, "", 1).trim().to_string());
        return true;
    }
    if line.starts_with("CF:") || line.contains("...") {
        c.push_detail(line.to_string());
    }
    if line.contains("studenti") && !line.contains(':') {
        c.push_detail(line.to_string());
    }
    false
}
