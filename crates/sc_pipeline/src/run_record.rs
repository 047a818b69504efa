// crates/sc_pipeline/src/run_record.rs
//
// Provenance record for one run: flow, timestamp, engine, effective params,
// SHA-256 of every input and written artifact, headline counts. Digests are
// supplied by the caller (this crate never touches the filesystem).

use serde::Serialize;

use sc_core::Params;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineMeta {
    pub name: String,
    pub version: String,
}

impl EngineMeta {
    pub fn current() -> Self {
        Self { name: "scrutini".to_string(), version: env!("CARGO_PKG_VERSION").to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDigest {
    /// "deferred", "roster", "input", "output_csv", "report_txt", ...
    pub role: String,
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunCounts {
    pub output_rows: usize,
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    /// "finali" | "primo-periodo".
    pub flow: String,
    pub generated_at: String,
    pub engine: EngineMeta,
    pub params: Params,
    pub inputs: Vec<ArtifactDigest>,
    pub outputs: Vec<ArtifactDigest>,
    pub counts: RunCounts,
}

impl RunRecord {
    pub fn new(flow: &str, generated_at: &str, params: &Params) -> Self {
        Self {
            flow: flow.to_string(),
            generated_at: generated_at.to_string(),
            engine: EngineMeta::current(),
            params: params.clone(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            counts: RunCounts::default(),
        }
    }

    pub fn input(&mut self, role: &str, path: &str, sha256: String) -> &mut Self {
        self.inputs.push(ArtifactDigest { role: role.into(), path: path.into(), sha256 });
        self
    }

    pub fn output(&mut self, role: &str, path: &str, sha256: String) -> &mut Self {
        self.outputs.push(ArtifactDigest { role: role.into(), path: path.into(), sha256 });
        self
    }

    pub fn with_counts(mut self, counts: RunCounts) -> Self {
        self.counts = counts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifacts_keep_insertion_order() {
        let mut r = RunRecord::new("finali", "01/07/2026, 09:00:00", &Params::default());
        r.input("deferred", "a.csv", "aa".into()).input("roster", "b.csv", "bb".into());
        r.output("output_csv", "out/output.csv", "cc".into());
        let r = r.with_counts(RunCounts { output_rows: 3, errors: 0, warnings: 1 });
        let roles: Vec<&str> = r.inputs.iter().map(|a| a.role.as_str()).collect();
        assert_eq!(roles, ["deferred", "roster"]);
        assert_eq!(r.outputs[0].sha256, "cc");
        assert_eq!(r.counts.warnings, 1);
        assert_eq!(r.engine.name, "scrutini");
    }
}
