//! Identity tokens: Italian fiscal codes (codice fiscale) and 6-char pseudo-ids.
//!
//! A pseudo-id is the surname/given-name block of a fiscal code. It is either
//! derived from names (`derive_initials`) or copied from the first six chars
//! of a code present in the row. The two paths are not reconciled.

use crate::text::consonants_vowels;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Position-weighted values for odd (1-indexed) positions.
fn odd_value(c: u8) -> u32 {
    match c {
        b'A' | b'0' => 1,
        b'B' | b'1' => 0,
        b'C' | b'2' => 5,
        b'D' | b'3' => 7,
        b'E' | b'4' => 9,
        b'F' | b'5' => 13,
        b'G' | b'6' => 15,
        b'H' | b'7' => 17,
        b'I' | b'8' => 19,
        b'J' | b'9' => 21,
        b'K' => 2,
        b'L' => 4,
        b'M' => 18,
        b'N' => 20,
        b'O' => 11,
        b'P' => 3,
        b'Q' => 6,
        b'R' => 8,
        b'S' => 12,
        b'T' => 14,
        b'U' => 16,
        b'V' => 10,
        b'W' => 22,
        b'X' => 25,
        b'Y' => 24,
        b'Z' => 23,
        _ => 0,
    }
}

/// Values for even positions: digits map to themselves, letters to A=0..Z=25.
fn even_value(c: u8) -> u32 {
    match c {
        b'0'..=b'9' => u32::from(c - b'0'),
        b'A'..=b'Z' => u32::from(c - b'A'),
        _ => 0,
    }
}

/// Month letter → max day of month (February tolerates 29).
fn month_max_days(c: u8) -> Option<u32> {
    match c {
        b'A' | b'C' | b'E' | b'L' | b'M' | b'R' | b'T' => Some(31),
        b'D' | b'H' | b'P' | b'S' => Some(30),
        b'B' => Some(29),
        _ => None,
    }
}

/// Control character over the first 15 chars.
pub fn check_char(first15: &[u8]) -> char {
    let total: u32 = first15
        .iter()
        .enumerate()
        .map(|(i, &c)| if (i + 1) % 2 == 1 { odd_value(c) } else { even_value(c) })
        .sum();
    char::from(b'A' + (total % 26) as u8)
}

/// Leading-digit integer parse of a short slice ("4A" → 4, "A4" → None).
fn leading_number(bytes: &[u8]) -> Option<u32> {
    let digits: Vec<u8> = bytes.iter().copied().take_while(u8::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.iter().try_fold(0u32, |acc, d| acc.checked_mul(10)?.checked_add(u32::from(d - b'0')))
}

/// Fiscal-code check. The input is trimmed and upper-cased first.
pub fn is_valid_identifier(code: &str) -> bool {
    let cf = code.trim().to_uppercase();
    let b = cf.as_bytes();
    if b.len() != 16 || !b.iter().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return false;
    }
    let Some(max_days) = month_max_days(b[8]) else { return false };

    let Some(d) = leading_number(&b[9..11]) else { return false };
    if !((1..=31).contains(&d) || (41..=71).contains(&d)) {
        return false;
    }
    let day = if d <= 31 { d } else { d - 40 };
    if day < 1 || day > max_days {
        return false;
    }

    check_char(&b[..15]) == char::from(b[15])
}

/// 6-char surname/name block. Usually `[A-Z]{6}`; the tax-code path may carry
/// whatever the source column held in its first six chars.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PseudoId(String);

impl PseudoId {
    pub fn as_str(&self) -> &str { &self.0 }

    /// First six chars of a raw tax-code cell (trimmed, upper-cased).
    pub fn from_code_prefix(raw: &str) -> Self {
        PseudoId(raw.trim().to_uppercase().chars().take(6).collect())
    }
}

impl fmt::Display for PseudoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn pad3(letters: String) -> String {
    let mut out: String = letters.chars().take(3).collect();
    while out.len() < 3 {
        out.push('X');
    }
    out
}

/// Fiscal-code name encoding at 6 chars: 3 from the surname, 3 from the given name.
/// Total: empty inputs yield "XXXXXX".
pub fn derive_initials(surname: &str, given_name: &str) -> PseudoId {
    let (s_cons, s_vows) = consonants_vowels(surname);
    let surname3 = pad3(s_cons + &s_vows);

    let (n_cons, n_vows) = consonants_vowels(given_name);
    let name3 = if n_cons.len() >= 4 {
        let c = n_cons.as_bytes();
        [c[0], c[2], c[3]].iter().map(|&b| char::from(b)).collect()
    } else {
        pad3(n_cons + &n_vows)
    };

    PseudoId(surname3 + &name3)
}
