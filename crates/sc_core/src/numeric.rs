//! Numeric coercion of grade cells. Never fails: unparseable input yields "".

use once_cell::sync::Lazy;
use regex::Regex;

static NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*-?[0-9]+(?:[.,][0-9]+)?\s*$").expect("static regex"));

/// Trimmed decimal string with `,` normalized to `.`, or "" when the cell is not a plain number.
pub fn numeric_or_empty(raw: &str) -> String {
    let s = raw.trim();
    if s.is_empty() || !NUMERIC.is_match(s) {
        return String::new();
    }
    s.replacen(',', ".", 1)
}

/// `numeric_or_empty` followed by a float parse.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = numeric_or_empty(raw);
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Shortest round-trip text: `6.0` → "6", `6.5` → "6.5".
pub fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Fixed decimals, as in report lines ("6.25", "33.3").
pub fn format_fixed(v: f64, decimals: usize) -> String {
    format!("{v:.decimals$}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_plain_decimals() {
        assert_eq!(numeric_or_empty(" 7 "), "7");
        assert_eq!(numeric_or_empty("6,5"), "6.5");
        assert_eq!(numeric_or_empty("-2.25"), "-2.25");
        assert_eq!(numeric_or_empty("10"), "10");
    }

    #[test]
    fn rejects_everything_else() {
        for s in ["", "  ", "NC", "6+", "6,", ".5", "1e3", "6.5.1", "sei", "٣"] {
            assert_eq!(numeric_or_empty(s), "", "{s:?}");
        }
    }

    #[test]
    fn parse_and_format() {
        assert_eq!(parse_number("6,5"), Some(6.5));
        assert_eq!(parse_number("NC"), None);
        assert_eq!(format_number(6.0), "6");
        assert_eq!(format_number(6.5), "6.5");
        assert_eq!(format_number(-1.0), "-1");
        assert_eq!(format_fixed(6.0 + 1.0 / 3.0, 2), "6.33");
    }

    proptest! {
        #[test]
        fn numeric_or_empty_is_idempotent(s in "\\PC{0,12}") {
            let once = numeric_or_empty(&s);
            prop_assert_eq!(numeric_or_empty(&once), once);
        }

        #[test]
        fn numbers_survive(n in -1000i32..1000, d in 0u32..100, comma in any::<bool>()) {
            let sep = if comma { ',' } else { '.' };
            let s = format!("{n}{sep}{d}");
            prop_assert_eq!(numeric_or_empty(&s), format!("{n}.{d}"));
        }
    }
}
