// crates/sc_cli/src/args.rs
//
// Offline CLI argument surface: subcommands, shared output flags, path checks.
// - No networked paths (reject any scheme:// like http/https/file)
// - Input files must exist as regular files; --out may not exist yet
// - Output: --out dir, --render json

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "scrutini",
    version,
    disable_help_subcommand = true,
    about = "Offline anonymization and reconciliation of school grade exports"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Params JSON (thresholds, exclusion policy, detail limit). Defaults apply when omitted.
    #[arg(long, global = true)]
    pub params: Option<PathBuf>,

    /// Output directory for artifacts.
    #[arg(long, global = true, default_value = ".")]
    pub out: PathBuf,

    /// Extra renderers; `json` writes report.json next to the text report.
    #[arg(long, global = true, value_parser = ["json"])]
    pub render: Vec<String>,

    /// Text for the report's `Data/ora:` line (defaults to local time).
    #[arg(long, global = true)]
    pub generated_at: Option<String>,

    /// No summary on stderr.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Debug-level logging (overrides RUST_LOG).
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Merge a deferred-exam file with the full roster (final outcomes).
    Finali {
        /// Deferred-exam CSV (cognome, nome, materia, voto, voto_differito, ...).
        #[arg(long)]
        deferred: PathBuf,
        /// Full roster CSV (CF, materia, valore, classe, ...).
        #[arg(long)]
        roster: PathBuf,
    },
    /// Anonymize and filter one single-period grade file.
    PrimoPeriodo {
        #[arg(long)]
        input: PathBuf,
    },
    /// Parse a final-outcome report text back into JSON (stdout).
    ParseReport {
        #[arg(long)]
        report: PathBuf,
    },
}

impl Command {
    /// Stable flow name used in run records and log events.
    pub fn flow(&self) -> &'static str {
        match self {
            Command::Finali { .. } => "finali",
            Command::PrimoPeriodo { .. } => "primo-periodo",
            Command::ParseReport { .. } => "parse-report",
        }
    }
}

/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Reject any explicit URI scheme (e.g., http://, https://, file://).
#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

/// Input files with the flag that named them.
fn inputs(args: &Args) -> Vec<(&'static str, &Path)> {
    let mut v = Vec::with_capacity(3);
    match &args.command {
        Command::Finali { deferred, roster } => {
            v.push(("--deferred", deferred.as_path()));
            v.push(("--roster", roster.as_path()));
        }
        Command::PrimoPeriodo { input } => v.push(("--input", input.as_path())),
        Command::ParseReport { report } => v.push(("--report", report.as_path())),
    }
    if let Some(p) = &args.params {
        v.push(("--params", p.as_path()));
    }
    v
}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    validate(Args::parse())
}

/// Scheme + existence checks, then absolute paths everywhere.
pub fn validate(mut args: Args) -> Result<Args, CliError> {
    ensure_local_path(&args.out)?;
    for (label, p) in inputs(&args) {
        ensure_local_exists(p, label)?;
    }

    args.command = match args.command {
        Command::Finali { deferred, roster } => {
            Command::Finali { deferred: normalize_path(&deferred), roster: normalize_path(&roster) }
        }
        Command::PrimoPeriodo { input } => Command::PrimoPeriodo { input: normalize_path(&input) },
        Command::ParseReport { report } => Command::ParseReport { report: normalize_path(&report) },
    };
    args.params = args.params.take().map(|p| normalize_path(&p));
    args.out = normalize_path(&args.out);

    Ok(args)
}

/// Ensure a path is local (no scheme) and exists as a regular file.
fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    ensure_local_path(p)?;
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

/// Best-effort normalization to an absolute path.
/// If canonicalize fails (e.g., path doesn't exist yet), produce an absolute path relative to CWD.
fn normalize_path(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}
