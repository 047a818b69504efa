//! sc_core: Core types, identity checks, normalization and ordering helpers.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! engine (`sc_io`, `sc_algo`, `sc_report`, `sc_pipeline`, `sc_cli`).
//!
//! - Tabular input: `Table`, `Record`, `ColumnRef`
//! - Identity: fiscal-code validation, 6-char pseudo-ids
//! - Text: accent stripping, subject normalization
//! - Numerics: `numeric_or_empty` and grade parsing
//! - Deterministic ordering helpers (collation, first-seen dedup)
//! - Policy knobs: `Params`
//! - Check outcomes: `ControlResult`
//!
//! Serialization derives are gated behind `serde` feature.

#![forbid(unsafe_code)]

pub mod control;
pub mod determinism;
pub mod errors;
pub mod ids;
pub mod numeric;
pub mod table;
pub mod text;
pub mod variables;

pub use control::{ControlResult, ControlStatus};
pub use errors::CoreError;
pub use ids::{derive_initials, is_valid_identifier, PseudoId};
pub use determinism::{collate_cmp, dedup_first_seen};
pub use numeric::{format_fixed, format_number, numeric_or_empty, parse_number};
pub use table::{ColumnRef, Record, Table};
pub use variables::{validate_domains, Params};
