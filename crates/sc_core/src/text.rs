//! Text normalization shared by key derivation, column resolution and ordering.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Suffix some school exports append to subject names ("MATEMATICA_U").
pub const SUBJECT_SUFFIX: &str = "_U";

static TRAILING_PARENS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(.*?\)\s*$").expect("static regex"));

static TRAILING_SUFFIX_CI: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)_U$").expect("static regex"));

#[inline]
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Decompose (NFD) and drop combining diacritical marks: "NICCOLÒ" → "NICCOLO".
pub fn strip_accents(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Accent-stripped, upper-cased, letters A–Z only.
pub fn az_upper(s: &str) -> String {
    strip_accents(s)
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase())
        .collect()
}

/// Split `az_upper(s)` into (consonants, vowels), each in original order.
pub fn consonants_vowels(s: &str) -> (String, String) {
    let upper = az_upper(s);
    let (mut cons, mut vows) = (String::new(), String::new());
    for c in upper.chars() {
        if matches!(c, 'A' | 'E' | 'I' | 'O' | 'U') {
            vows.push(c);
        } else {
            cons.push(c);
        }
    }
    (cons, vows)
}

/// Collapse internal whitespace runs to a single space and trim.
pub fn collapse_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Subject key: trim, drop a trailing `_U`, upper-case, collapse whitespace.
pub fn normalize_spaces_upper(s: &str) -> String {
    let t = s.trim();
    let t = t.strip_suffix(SUBJECT_SUFFIX).unwrap_or(t);
    collapse_spaces(&t.to_uppercase())
}

/// Display form of a subject in the merge output: only the `_U` suffix is removed.
pub fn strip_subject_suffix(s: &str) -> &str {
    s.strip_suffix(SUBJECT_SUFFIX).unwrap_or(s)
}

/// Subject cleaning for single-period exports: trailing `_U` (any case), a trailing
/// parenthesized note, and repeated whitespace are removed.
pub fn clean_subject(s: &str) -> String {
    let t = s.trim();
    let t = TRAILING_SUFFIX_CI.replace(t, "");
    let t = TRAILING_PARENS.replace(&t, "");
    collapse_spaces(&t)
}

/// Header normalization used by column resolution.
pub fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase()
}

/// Remove every whitespace char and upper-case.
pub fn squash_upper(s: &str) -> String {
    s.to_uppercase().chars().filter(|c| !c.is_whitespace()).collect()
}
