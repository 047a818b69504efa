//! crates/sc_io/src/hasher.rs
//!
//! Two unrelated digests live here:
//! - `anonymize(..)`: the short student digest written into output rows. HMAC-SHA1
//!   keyed with the identifier itself over the same bytes, standard base64, first
//!   5 chars. Irreversible in practice and stable across runs.
//! - `sha256_*`: lowercase hex fingerprints of input/output files for the run record.

#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use digest::Digest;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

use crate::IoResult;

type HmacSha1 = Hmac<Sha1>;

/// Chars of the base64 digest kept in output rows.
pub const DIGEST_LEN: usize = 5;

/* ------------------------------- Anonymization ------------------------------- */

/// Short keyed digest of a (validated) identifier. Never fails; an unusable key
/// yields "".
pub fn anonymize(identifier: &str) -> String {
    let data = identifier.as_bytes();
    let Ok(mut mac) = HmacSha1::new_from_slice(data) else {
        return String::new();
    };
    mac.update(data);
    let b64 = STANDARD.encode(mac.finalize().into_bytes());
    b64.chars().take(DIGEST_LEN).collect()
}

/* ------------------------------- Raw hashing ------------------------------- */

/// SHA-256 over a reader stream.
pub fn sha256_stream<R: Read>(reader: &mut R) -> IoResult<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// SHA-256 over a file’s raw bytes.
pub fn sha256_file(path: &Path) -> IoResult<String> {
    let f = File::open(path)?;
    let mut r = BufReader::new(f);
    sha256_stream(&mut r)
}
