// crates/sc_pipeline/src/merge_flow.rs
//
// Final-outcome merge: deferred-session file + full roster → merged rows,
// "REPORT CONTROLLI POST-PROCESSING", coherence controls.

use sc_algo::{plan_merge, resolve_merge_columns, MergedRow};
use sc_core::Table;
use sc_report::FinaliReport;
use tracing::{info, warn};

use crate::{digest_all, PipelineError, ProcessingResult, RunOptions};

pub type MergeResult = ProcessingResult<MergedRow, FinaliReport>;

pub fn merge_voti_files(deferred: &Table, roster: &Table, opts: &RunOptions) -> MergeResult {
    match run(deferred, roster, opts) {
        Ok((rows, report)) => {
            info!(
                rows = rows.len(),
                suspended = report.coherence.suspended.len(),
                anomalies = report.coherence.anomaly_count(),
                "merge done"
            );
            ProcessingResult {
                report_lines: report.lines(),
                controls: report.controls.clone(),
                output_rows: rows,
                errors: Vec::new(),
                report: Some(report),
            }
        }
        Err(e) => {
            warn!(error = %e, "merge aborted");
            ProcessingResult::failed(e)
        }
    }
}

fn run(deferred: &Table, roster: &Table, opts: &RunOptions) -> Result<(Vec<MergedRow>, FinaliReport), PipelineError> {
    let cols = resolve_merge_columns(deferred, roster)?;
    let plan = plan_merge(deferred, roster, &cols);
    let digests = digest_all(plan.identifiers_to_hash());
    let rows = plan.assemble(&digests);
    let report = FinaliReport::build(&rows, &opts.params, &opts.generated_at);
    Ok((rows, report))
}
