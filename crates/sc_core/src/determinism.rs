//! Determinism utilities: stable collation & first-seen dedup.
//!
//! Output ordering must not depend on map iteration or on the host locale.
//! Text comparisons go through `collate_cmp`, a fixed stand-in for an
//! Italian locale compare: accent-stripped lowercase first, raw text second.

use core::cmp::Ordering;
use std::collections::BTreeSet;

use crate::text::strip_accents;

/* -------------------------------------------------------------------------- */
/*                               Stable Ordering                              */
/* -------------------------------------------------------------------------- */

/// Total order on text: "matematica" < "Musica" < "Òptica" < "storia".
#[inline]
pub fn collate_cmp(a: &str, b: &str) -> Ordering {
    let fa = strip_accents(a).to_lowercase();
    let fb = strip_accents(b).to_lowercase();
    fa.cmp(&fb).then_with(|| a.cmp(b))
}

/* -------------------------------------------------------------------------- */
/*                              First-seen dedup                              */
/* -------------------------------------------------------------------------- */

/// Unique values in first-seen order.
pub fn dedup_first_seen<I, S>(it: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for s in it {
        let s = s.into();
        if seen.insert(s.clone()) {
            out.push(s);
        }
    }
    out
}

/* ---------------------------------- Tests --------------------------------- */
