//! sc_report: Report text producers, the companion parser, structured controls.
//!
//! Rules:
//! - No I/O here. Callers pass output rows already in memory and the timestamp
//!   to print on the `Data/ora:` line.
//! - Report lines are a bit-exact contract with [`parse::parse_report_lines`]:
//!   a wording change in a producer must land together with the parser.
//! - Coherence controls are built from the same blocks the text is rendered
//!   from, so `parse(render(x)).controls == controls(x)`.
//!
//! JSON rendering of the report models is gated behind `render_json`.

#![deny(unsafe_code)]

pub mod blocks;
pub mod dashboard;
pub mod finali;
pub mod parse;
pub mod period;

#[cfg(feature = "render_json")]
pub mod render_json;

pub use blocks::{coherence_blocks, coherence_controls, BlockLine, CheckBlock};
pub use dashboard::dashboard_controls;
pub use finali::FinaliReport;
pub use parse::{parse_report_lines, FinalOutcome, OutcomeAnalysis, ReportData, ReportSummary, StudentCounts};
pub use period::{ChannelLine, PeriodReport};

#[cfg(feature = "render_json")]
pub use render_json::{render_json, render_value};

// ===== Errors =====
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Serializer refused the model.
    Render(&'static str),
}

impl core::fmt::Display for ReportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReportError::Render(what) => write!(f, "report render failed: {what}"),
        }
    }
}

impl std::error::Error for ReportError {}

// ===== Shared literals =====

/// Heavy banner (60 × `=`).
pub fn heavy_rule() -> String {
    "=".repeat(60)
}

/// Light separator (40 × `-`).
pub fn light_rule() -> String {
    "-".repeat(40)
}

pub const OK_MARK: &str = "✅";
pub const WARN_MARK: &str = "⚠️";

pub const TIMESTAMP_PREFIX: &str = "Data/ora:";
pub const SECTION_STATS: &str = "A) STATISTICHE GENERALI";
pub const SECTION_OUTCOMES: &str = "Analisi ESITI";
pub const SECTION_CHECKS: &str = "B) CONTROLLI DI COERENZA";
pub const SECTION_SUMMARY: &str = "RIEPILOGO";

/// First six characters of a student reference, as printed in anomaly lines.
pub(crate) fn short_ref(s: &str) -> String {
    s.chars().take(6).collect()
}
