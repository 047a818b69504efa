//! sc_pipeline: the public flows of the scrutini engine.
//!
//! Each flow is: resolve columns → plan (keys, lookup maps) → digest fan-out
//! over distinct identifiers (join barrier) → assemble sorted rows → report.
//! This crate stays I/O-free: tables arrive parsed, artifacts leave in memory.
//! Stages return `Result` internally; the public entry points collapse a fatal
//! error into `ProcessingResult::errors` with no output rows.

#![forbid(unsafe_code)]

use thiserror::Error;

use sc_algo::{MergeError, PeriodError};
use sc_core::{ControlResult, Params};

pub mod digest;
pub mod merge_flow;
pub mod period_flow;
pub mod run_record;

pub use digest::digest_all;
pub use merge_flow::merge_voti_files;
pub use period_flow::{compute_statistics, transform_single_period};
pub use run_record::{ArtifactDigest, EngineMeta, RunCounts, RunRecord};

/// Single error surface for the flow stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Merge(#[from] MergeError),
    #[error("{0}")]
    Period(#[from] PeriodError),
}

/// Per-run inputs that are not tables.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub params: Params,
    /// Printed verbatim on the report's `Data/ora:` line.
    pub generated_at: String,
}

impl RunOptions {
    pub fn new(params: Params, generated_at: impl Into<String>) -> Self {
        Self { params, generated_at: generated_at.into() }
    }
}

/// Outcome of one flow. Fatal errors leave `output_rows`, `report_lines`,
/// `controls` empty and `report` unset.
#[derive(Debug, Clone)]
pub struct ProcessingResult<R, M> {
    pub output_rows: Vec<R>,
    pub report_lines: Vec<String>,
    pub errors: Vec<String>,
    pub controls: Vec<ControlResult>,
    pub report: Option<M>,
}

impl<R, M> ProcessingResult<R, M> {
    pub(crate) fn failed(e: PipelineError) -> Self {
        Self { output_rows: Vec::new(), report_lines: Vec::new(), errors: vec![e.to_string()], controls: Vec::new(), report: None }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.controls.iter().filter(|c| c.is_warning()).count()
    }
}
