// crates/sc_algo/src/keys.rs
//
// Join keys for the merge flow.
//   row_key     = pseudo_id § CLASS § SUBJECT   (per-subject granularity)
//   student_key = pseudo_id § CLASS             (outcome fields)
// `§` never occurs in any component.

use sc_core::PseudoId;

pub const KEY_SEP: char = '§';

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DerivedKey {
    pub pseudo_id: PseudoId,
    /// Canonical class label as extracted (may be "").
    pub class_label: String,
    /// `normalize_spaces_upper` of the subject cell.
    pub subject_key: String,
}

impl DerivedKey {
    pub fn new(pseudo_id: PseudoId, class_label: String, subject_key: String) -> Self {
        Self { pseudo_id, class_label, subject_key }
    }

    pub fn student_key(&self) -> String {
        format!("{}{KEY_SEP}{}", self.pseudo_id, self.class_label.to_uppercase())
    }

    pub fn row_key(&self) -> String {
        format!("{}{KEY_SEP}{}", self.student_key(), self.subject_key)
    }
}
