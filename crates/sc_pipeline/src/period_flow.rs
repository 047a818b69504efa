// crates/sc_pipeline/src/period_flow.rs
//
// Single-period transform: one roster file → anonymized, filtered rows,
// "REPORT ELABORAZIONE PRIMO PERIODO", dashboard controls.

use sc_algo::{compute_stats, plan_period, resolve_period_columns, PeriodRow, StatsSnapshot};
use sc_core::{Params, Table};
use sc_report::{dashboard_controls, PeriodReport};
use tracing::{info, warn};

use crate::{digest_all, PipelineError, ProcessingResult, RunOptions};

pub type PeriodResult = ProcessingResult<PeriodRow, PeriodReport>;

pub fn transform_single_period(table: &Table, opts: &RunOptions) -> PeriodResult {
    match run(table, opts) {
        Ok((rows, report)) => {
            let stats = compute_statistics(&rows, &opts.params);
            info!(
                rows = rows.len(),
                students = report.counters.unique_students,
                excluded = report.counters.excluded_subjects,
                skipped = report.counters.skipped_invalid_identifier,
                "single-period transform done"
            );
            ProcessingResult {
                report_lines: report.lines(),
                controls: dashboard_controls(&stats, &opts.params),
                output_rows: rows,
                errors: Vec::new(),
                report: Some(report),
            }
        }
        Err(e) => {
            warn!(error = %e, "single-period transform aborted");
            ProcessingResult::failed(e)
        }
    }
}

fn run(table: &Table, opts: &RunOptions) -> Result<(Vec<PeriodRow>, PeriodReport), PipelineError> {
    let cols = resolve_period_columns(table)?;
    let plan = plan_period(table, &cols, &opts.params);
    let digests = digest_all(plan.identifiers_to_hash());
    let (rows, counters) = plan.assemble(&digests);
    let report = PeriodReport::build(&cols, &counters, &rows, &opts.params, &opts.generated_at);
    Ok((rows, report))
}

/// Dashboard statistics over transformed rows. Empty input → zeroed snapshot.
pub fn compute_statistics(rows: &[PeriodRow], params: &Params) -> StatsSnapshot {
    compute_stats(rows, params)
}
