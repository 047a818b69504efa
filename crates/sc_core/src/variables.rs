//! variables.rs: Params: policy knobs with safe defaults + domain validation.
//!
//! Every knob defaults to the fixed constant the two flows were built around,
//! so `Params::default()` reproduces the reference behavior exactly.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// ------------ Params ------------

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Params {
    /// A numeric grade strictly below this is a failure ("insufficienza").
    pub sufficiency_threshold: f64,
    /// Total absence hours at or above this flag a student.
    pub absence_threshold_hours: f64,
    /// Detail lines kept per coherence check.
    pub report_detail_limit: usize,
    /// Treat COMPORTAMENTO/CONDOTTA as non-academic in the single-period flow.
    pub exclude_conduct: bool,
    /// Extra case-insensitive substrings excluded in the single-period flow.
    pub extra_excluded_subjects: Vec<String>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            sufficiency_threshold: 6.0,
            absence_threshold_hours: 50.0,
            report_detail_limit: 5,
            exclude_conduct: true,
            extra_excluded_subjects: Vec::new(),
        }
    }
}

/// ------------ Validation ------------

/// Reject thresholds that are non-finite or negative, and a zero detail limit.
pub fn validate_domains(p: &Params) -> Result<(), CoreError> {
    if !p.sufficiency_threshold.is_finite() || p.sufficiency_threshold < 0.0 {
        return Err(CoreError::DomainOutOfRange("sufficiency_threshold"));
    }
    if !p.absence_threshold_hours.is_finite() || p.absence_threshold_hours < 0.0 {
        return Err(CoreError::DomainOutOfRange("absence_threshold_hours"));
    }
    if p.report_detail_limit == 0 {
        return Err(CoreError::DomainOutOfRange("report_detail_limit"));
    }
    if p.extra_excluded_subjects.iter().any(|s| s.trim().is_empty()) {
        return Err(CoreError::DomainOutOfRange("extra_excluded_subjects"));
    }
    Ok(())
}
