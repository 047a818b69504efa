// crates/sc_report/src/finali.rs
//
// "REPORT CONTROLLI POST-PROCESSING" for the final-outcome merge.

use sc_algo::{merge_summary, run_checks, CoherenceReport, MergeSummary, MergedRow};
use sc_core::{format_fixed, ControlResult, Params};

use crate::blocks::{coherence_blocks, CheckBlock};
use crate::{heavy_rule, light_rule, SECTION_CHECKS, SECTION_STATS, SECTION_SUMMARY, TIMESTAMP_PREFIX};

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug)]
pub struct FinaliReport {
    pub generated_at: String,
    pub total_rows: usize,
    pub summary: MergeSummary,
    /// Holds raw identifiers; serialized output carries only `controls`.
    #[cfg_attr(feature = "render_json", serde(skip))]
    pub coherence: CoherenceReport,
    pub controls: Vec<ControlResult>,
    #[cfg_attr(feature = "render_json", serde(skip))]
    blocks: Vec<CheckBlock>,
}

impl FinaliReport {
    /// Runs the summary and the coherence battery over sorted merged rows.
    pub fn build(rows: &[MergedRow], params: &Params, generated_at: &str) -> Self {
        let summary = merge_summary(rows);
        let coherence = run_checks(rows, params);
        let blocks = coherence_blocks(&coherence, params);
        let controls = blocks.iter().map(CheckBlock::to_control).collect();
        Self { generated_at: generated_at.to_string(), total_rows: rows.len(), summary, coherence, controls, blocks }
    }

    pub fn warning_count(&self) -> usize {
        self.controls.iter().filter(|c| c.is_warning()).count()
    }

    pub fn lines(&self) -> Vec<String> {
        let s = &self.summary;
        let mut out = vec![
            heavy_rule(),
            "REPORT CONTROLLI POST-PROCESSING".to_string(),
            format!("{TIMESTAMP_PREFIX} {}", self.generated_at),
            heavy_rule(),
            String::new(),
        ];

        // ----- A) -----
        out.push(SECTION_STATS.to_string());
        out.push(light_rule());
        if s.has_subject_rows {
            out.push("\nNumero studenti per Anno:".into());
            out.extend(s.students_by_year.iter().map(|(k, n)| format!("  Anno {k}: {n} studenti")));
            out.push("\nNumero studenti per Sezione:".into());
            out.extend(s.students_by_section.iter().map(|(k, n)| format!("  Sezione {k}: {n} studenti")));
            out.push("\nNumero studenti per Classe (Anno+Sezione):".into());
            out.extend(s.students_by_class.iter().map(|(k, n)| format!("  Classe {k}: {n} studenti")));
        }

        if s.outcome_rows > 0 {
            out.push(format!("\n{}", light_rule()));
            out.push("\nAnalisi ESITI iniziali e finali:".into());
            out.push("\nEsiti iniziali (giugno):".into());
            out.extend(s.initial_outcomes.iter().map(|(k, n)| format!("  {k}: {n} studenti")));
            out.push(format!("\nTotale studenti con scrutinio sospeso: {}", s.suspended_rows));
            if s.suspended_rows > 0 {
                out.push("\nEsiti finali degli studenti sospesi:".into());
                for (k, n) in &s.suspended_final {
                    let pct = *n as f64 / s.suspended_rows as f64 * 100.0;
                    out.push(format!("  {k}: {n} studenti ({}%)", format_fixed(pct, 1)));
                }
            }
        }

        // ----- B) -----
        out.push(format!("\n{}", heavy_rule()));
        out.push(format!("\n{SECTION_CHECKS}"));
        out.push(light_rule());
        if self.coherence.suspended.is_empty() {
            out.push("\nNessuno studente con scrutinio sospeso trovato.".into());
        } else {
            out.push(format!("\nStudenti con scrutinio sospeso: {}", self.coherence.suspended.len()));
            for b in &self.blocks {
                out.extend(b.render());
            }
        }

        // ----- Summary -----
        out.push(format!("\n{}", heavy_rule()));
        out.push(format!("\n{SECTION_SUMMARY}"));
        out.push(light_rule());
        out.push(format!("Righe totali output: {}", self.total_rows));
        out.push(format!("Studenti totali: {}", s.outcome_rows));
        out.push(format!("Studenti sospesi: {}", self.coherence.suspended.len()));
        out
    }
}
