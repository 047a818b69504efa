// crates/sc_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Pure algorithms over parsed tables. No I/O, no hashing: flows are split into
//! a `plan` step (keys, maps, identifiers that need a digest) and an `assemble`
//! step that receives the digests computed by the caller.

// ----------------------------- Building blocks --------------------------------------

pub mod class_label;
pub mod columns;
pub mod errors;
pub mod keys;

// ----------------------------- Flows -------------------------------------------------

pub mod merge;
pub mod period;

// ----------------------------- Consumers of output rows ------------------------------

pub mod checks;
pub mod stats;

// Tight, explicit re-exports (avoid wildcard export drift).
pub use class_label::{extract_class_label, split_label, ClassColumns, ClassParts};
pub use columns::{exact_header, resolve_column};
pub use errors::{MergeError, PeriodError};
pub use keys::{DerivedKey, KEY_SEP};

pub use merge::{plan_merge, resolve_merge_columns, sort_merged, MergeColumns, MergePlan, MergedRow};
pub use period::{
    plan_period, resolve_period_columns, PeriodColumns, PeriodCounters, PeriodPlan, PeriodRow,
};

pub use checks::{run_checks, ChangeAnomaly, ChangeReason, CoherenceReport, FailingSubject, MinGradeAnomaly};
pub use stats::{
    channel_summary, compute_stats, merge_summary, ChannelSummary, DistributionBucket, FlaggedStudent, MergeSummary,
    StatsSnapshot, SubjectStats,
};

/// Outcome pseudo-subject marker.
pub const OUTCOME_SUBJECT: &str = "ESITO";

/// True when a subject cell denotes the outcome pseudo-subject.
#[inline]
pub fn is_outcome_subject(subject: &str) -> bool {
    sc_core::text::normalize_spaces_upper(subject) == OUTCOME_SUBJECT
}
