// crates/sc_pipeline/src/digest.rs
//
// Digest fan-out: every distinct identifier is anonymized independently, and
// the map is complete before any row is assembled.

use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use sc_io::hasher::anonymize;
use tracing::debug;

/// identifier → digest for every input identifier.
pub fn digest_all(identifiers: Vec<String>) -> BTreeMap<String, String> {
    let n = identifiers.len();

    #[cfg(feature = "parallel")]
    let out: BTreeMap<String, String> = identifiers
        .into_par_iter()
        .map(|id| {
            let d = anonymize(&id);
            (id, d)
        })
        .collect();

    #[cfg(not(feature = "parallel"))]
    let out: BTreeMap<String, String> = identifiers
        .into_iter()
        .map(|id| {
            let d = anonymize(&id);
            (id, d)
        })
        .collect();

    debug!(identifiers = n, "digests computed");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_digest_per_identifier() {
        let ids = vec!["RSSMRA85T10A562S".to_string(), "VRDLGU90A41H501W".to_string()];
        let m = digest_all(ids.clone());
        assert_eq!(m.len(), 2);
        for id in &ids {
            assert_eq!(m[id], anonymize(id));
            assert_eq!(m[id].chars().count(), 5);
        }
    }

    #[test]
    fn empty_input_empty_map() {
        assert!(digest_all(Vec::new()).is_empty());
    }
}
