// crates/sc_algo/src/class_label.rs
//
// Canonical class label ("3A") from whichever class columns an export carries.
//
// Precedence, first success wins:
//   1. sigla column, whitespace removed, is exactly digit 1-5 + letter;
//   2. a `[1-5][A-Z]` pair anywhere in the squashed description / class cells;
//   3. a year digit (from the year column) followed by optional spaces and a letter
//      in the same cells;
//   4. "".

use once_cell::sync::Lazy;
use regex::Regex;
use sc_core::text::squash_upper;
use sc_core::{ColumnRef, Record};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

static LABEL_EXACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([1-5])([A-Z])$").expect("static regex"));
static LABEL_ANYWHERE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([1-5])([A-Z])").expect("static regex"));

/// Class columns resolved on one input file (any may be absent).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ClassColumns {
    pub sigla: Option<ColumnRef>,
    pub year: Option<ColumnRef>,
    pub desc: Option<ColumnRef>,
    pub class: Option<ColumnRef>,
}

pub fn extract_class_label(rec: &Record, cols: &ClassColumns) -> String {
    // 1) direct sigla
    let sigla = rec.get(cols.sigla);
    if !sigla.trim().is_empty() {
        if let Some(m) = LABEL_EXACT.captures(&squash_upper(sigla.trim())) {
            return format!("{}{}", &m[1], &m[2]);
        }
    }

    // 2) inference from free text
    let year_cell = rec.get(cols.year);
    let year = if year_cell.trim().is_empty() {
        None
    } else {
        year_cell.chars().find(|c| ('1'..='5').contains(c))
    };

    let candidates: Vec<&str> =
        [rec.get(cols.desc), rec.get(cols.class)].into_iter().filter(|c| !c.is_empty()).collect();

    for c in &candidates {
        if let Some(m) = LABEL_ANYWHERE.captures(&squash_upper(c)) {
            return format!("{}{}", &m[1], &m[2]);
        }
    }

    // 3) year digit + optional whitespace + letter
    if let Some(y) = year {
        for c in &candidates {
            if let Some(section) = section_after_year(&c.to_uppercase(), y) {
                return format!("{y}{section}");
            }
        }
    }

    String::new()
}

/// First `{year}\s*[A-Z]` occurrence in `text`; returns the letter.
fn section_after_year(text: &str, year: char) -> Option<char> {
    let chars: Vec<char> = text.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c != year {
            continue;
        }
        let next = chars[i + 1..].iter().copied().find(|ch| !ch.is_whitespace());
        if let Some(l) = next.filter(char::is_ascii_uppercase) {
            return Some(l);
        }
    }
    None
}

/// Year + section of a canonical label; both empty unless the label is exactly
/// one digit 1-5 and one letter.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassParts {
    pub year: String,
    pub section: String,
}

impl ClassParts {
    pub fn is_split(&self) -> bool {
        !self.year.is_empty() && !self.section.is_empty()
    }
}

pub fn split_label(label: &str) -> ClassParts {
    match LABEL_EXACT.captures(&squash_upper(label.trim())) {
        Some(m) => ClassParts { year: m[1].to_string(), section: m[2].to_string() },
        None => ClassParts::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::Table;

    fn label(headers: &[&str], row: &[&str]) -> String {
        let t = Table::from_rows(headers, &[row]).unwrap();
        let col = |n: &str| headers.iter().position(|h| *h == n).map(ColumnRef);
        let cols = ClassColumns {
            sigla: col("classe_sigla"),
            year: col("classe_anno_corso"),
            desc: col("classe_desc"),
            class: col("classe"),
        };
        extract_class_label(&t.records()[0], &cols)
    }

    #[test]
    fn direct_sigla_wins() {
        assert_eq!(label(&["classe_sigla", "classe"], &[" 3 a ", "5B"]), "3A");
    }

    #[test]
    fn invalid_sigla_falls_through_to_text() {
        assert_eq!(label(&["classe_sigla", "classe"], &["6A", "4 b liceo"]), "4B");
        assert_eq!(label(&["classe_desc"], &["Classe 2C Informatica"]), "2C");
    }

    #[test]
    fn year_plus_letter_in_text() {
        // No adjacent [1-5][A-Z] pair once squashed; year column pins the digit.
        assert_eq!(label(&["classe_anno_corso", "classe_desc"], &["anno 3", "3-a"]), "");
        assert_eq!(label(&["classe_anno_corso", "classe_desc"], &["3", "sez. 3\tf"]), "3F");
    }

    #[test]
    fn nothing_resolvable_is_empty() {
        assert_eq!(label(&["classe"], &["quinta"]), "");
        assert_eq!(label(&["altro"], &["x"]), "");
    }

    #[test]
    fn split_is_strict() {
        assert_eq!(split_label("3A"), ClassParts { year: "3".into(), section: "A".into() });
        assert_eq!(split_label(" 3 a"), ClassParts { year: "3".into(), section: "A".into() });
        assert!(!split_label("3AB").is_split());
        assert!(!split_label("").is_split());
        assert!(!split_label("6A").is_split());
    }
}
