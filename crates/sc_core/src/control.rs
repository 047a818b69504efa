//! Check outcomes shared by the coherence battery, the report parser and the
//! single-period dashboard.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ControlStatus {
    Ok,
    Warning,
    #[default]
    Info,
}

/// One check verdict. Immutable once the check has run.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlResult {
    pub status: ControlStatus,
    pub title: String,
    pub description: String,
    pub details: Vec<String>,
    /// Headline figure (dashboard controls only).
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub value: Option<String>,
}

impl ControlResult {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    pub fn with_description(mut self, d: impl Into<String>) -> Self {
        self.description = d.into();
        self
    }

    pub fn with_status(mut self, s: ControlStatus) -> Self {
        self.status = s;
        self
    }

    pub fn with_value(mut self, v: impl Into<String>) -> Self {
        self.value = Some(v.into());
        self
    }

    pub fn push_detail(&mut self, d: impl Into<String>) {
        self.details.push(d.into());
    }

    pub fn is_warning(&self) -> bool {
        self.status == ControlStatus::Warning
    }
}
