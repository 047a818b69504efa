// crates/sc_report/src/period.rs
//
// "REPORT ELABORAZIONE PRIMO PERIODO" for the single-period transform.

use std::collections::{BTreeMap, BTreeSet};

use sc_algo::{channel_summary, ChannelSummary, PeriodColumns, PeriodCounters, PeriodRow};
use sc_core::{format_fixed, format_number, Params};

use crate::{heavy_rule, light_rule, OK_MARK, SECTION_STATS, SECTION_SUMMARY, TIMESTAMP_PREFIX, WARN_MARK};

const UNSPECIFIED_CLASS: &str = "(classe non specificata)";

/// One grade channel of section B.
#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelLine {
    /// "Orali", "Scritti", "Pratici".
    pub label: &'static str,
    pub column_present: bool,
    pub summary: ChannelSummary,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug)]
pub struct PeriodReport {
    pub generated_at: String,
    pub columns_found: Vec<String>,
    pub columns_missing: Vec<String>,
    pub warnings: Vec<String>,
    pub counters: PeriodCounters,
    pub output_rows: usize,
    /// Distinct hashes per class label ("(classe non specificata)" for blanks).
    pub students_by_class: BTreeMap<String, usize>,
    pub subjects: usize,
    pub channels: Vec<ChannelLine>,
    #[cfg_attr(feature = "render_json", serde(skip))]
    threshold: f64,
}

impl PeriodReport {
    pub fn build(
        cols: &PeriodColumns,
        counters: &PeriodCounters,
        rows: &[PeriodRow],
        params: &Params,
        generated_at: &str,
    ) -> Self {
        let mut by_class: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
        for r in rows {
            let key = if r.class_label.is_empty() { UNSPECIFIED_CLASS } else { r.class_label.as_str() };
            by_class.entry(key.to_string()).or_default().insert(r.hash.as_str());
        }
        let subjects: BTreeSet<&str> = rows.iter().map(|r| r.subject.as_str()).collect();

        let pass = params.sufficiency_threshold;
        let channels = vec![
            ChannelLine {
                label: "Orali",
                column_present: cols.oral.is_some(),
                summary: channel_summary(rows.iter().map(|r| r.oral_numeric.as_str()), pass),
            },
            ChannelLine {
                label: "Scritti",
                column_present: cols.written.is_some(),
                summary: channel_summary(rows.iter().map(|r| r.written_numeric.as_str()), pass),
            },
            ChannelLine {
                label: "Pratici",
                column_present: cols.practical.is_some(),
                summary: channel_summary(rows.iter().map(|r| r.practical_numeric.as_str()), pass),
            },
        ];

        Self {
            generated_at: generated_at.to_string(),
            columns_found: cols.found.clone(),
            columns_missing: cols.missing.clone(),
            warnings: cols.warnings.clone(),
            counters: *counters,
            output_rows: rows.len(),
            students_by_class: by_class.into_iter().map(|(k, v)| (k, v.len())).collect(),
            subjects: subjects.len(),
            channels,
            threshold: pass,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let c = &self.counters;
        let mut out = vec![
            heavy_rule(),
            "REPORT ELABORAZIONE PRIMO PERIODO".to_string(),
            format!("{TIMESTAMP_PREFIX} {}", self.generated_at),
            heavy_rule(),
            String::new(),
        ];

        out.push("RILEVAMENTO COLONNE".into());
        out.push(light_rule());
        out.push(format!("\n{OK_MARK} Colonne trovate:"));
        out.extend(self.columns_found.iter().map(|x| format!("   - {x}")));
        if !self.columns_missing.is_empty() {
            out.push(format!("\n{WARN_MARK}  Colonne non trovate (opzionali):"));
            out.extend(self.columns_missing.iter().map(|x| format!("   - {x}")));
        }
        if !self.warnings.is_empty() {
            out.push(format!("\n{WARN_MARK}  Avvisi:"));
            out.extend(self.warnings.iter().map(|x| format!("   - {x}")));
        }

        // ----- A) -----
        out.push(format!("\n{}", light_rule()));
        out.push(format!("\n{SECTION_STATS}"));
        out.push(light_rule());
        out.push(format!("\nRighe nel file originale: {}", c.rows_in_file));
        out.push(format!("Righe elaborate: {}", c.processed));
        out.push(format!("Righe skippate (CF non valido): {}", c.skipped_invalid_identifier));
        out.push(format!("CF non validi trovati: {}", c.invalid_identifiers));
        out.push(format!("Materie escluse (non didattiche): {}", c.excluded_subjects));
        out.push(format!("Studenti unici (CF validi): {}", c.unique_students));

        out.push("\nNumero studenti per Classe:".into());
        out.extend(self.students_by_class.iter().map(|(k, n)| format!("  Classe {k}: {n} studenti")));
        out.push(format!("\nMaterie elaborate: {}", self.subjects));

        // ----- B) -----
        out.push(format!("\n{}", light_rule()));
        out.push("\nB) ANALISI VOTI".into());
        out.push(light_rule());
        let pass = format_number(self.threshold);
        for ch in &self.channels {
            let s = &ch.summary;
            if s.count > 0 {
                out.push(format!("\nVoti {}:", ch.label));
                out.push(format!("  Totale voti: {}", s.count));
                out.push(format!("  Media: {}", format_fixed(s.mean, 2)));
                out.push(format!("  Insufficienze (<{pass}): {} ({}%)", s.failures, format_fixed(s.failure_pct(), 1)));
            } else if ch.column_present {
                out.push(format!("\nVoti {}: nessun voto numerico trovato", ch.label));
            } else {
                out.push(format!("\nVoti {}: colonna non presente nel file", ch.label));
            }
        }

        // ----- Summary -----
        out.push(format!("\n{}", heavy_rule()));
        out.push(format!("\n{SECTION_SUMMARY}"));
        out.push(light_rule());
        out.push(format!("Righe output: {}", self.output_rows));
        out.push(format!("Studenti: {}", c.unique_students));
        out.push(format!("Classi: {}", self.students_by_class.len()));
        out.push(format!("Materie: {}", self.subjects));
        out.push(format!("\n{OK_MARK} Codici fiscali anonimizzati con hash"));
        out.push(format!("{OK_MARK} Materie non didattiche rimosse"));
        out
    }
}
