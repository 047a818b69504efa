// crates/sc_cli/src/main.rs
//
// scrutini binary: exit codes, error mapping, logging setup, and the run path
// (params → load tables → flow → artifacts → run record).

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    /// Bad flags, missing/non-local files, malformed input, fatal flow errors.
    pub const VALIDATION: i32 = 2;
    /// Read/write failures, rendering.
    pub const IO: i32 = 4;
}

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use chrono::Local;
use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use args::{parse_and_validate as parse_cli, Args, Command};

use sc_algo::{MergedRow, PeriodRow};
use sc_core::{ControlResult, Params};
use sc_io::hasher::sha256_file;
use sc_io::loader::load_table;
use sc_io::params::load_params;
use sc_io::{canonical_json, writer, IoError};
use sc_pipeline::{merge_voti_files, transform_single_period, RunCounts, RunOptions, RunRecord};
use sc_report::{parse_report_lines, ReportError};

const FINALI_CSV: &str = "voti_finali.csv";
const FINALI_TXT: &str = "report_finali.txt";
const PERIOD_CSV: &str = "voti_primo_periodo.csv";
const PERIOD_TXT: &str = "report_primo_periodo.txt";
const REPORT_JSON: &str = "report.json";
const RUN_RECORD: &str = "run_record.json";

/// `Data/ora:` layout.
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Malformed input, params out of domain, fatal flow errors
    Validation(String),
    /// I/O errors (read/write/path)
    Io(String),
    /// Rendering errors (report build or output)
    Render(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) | MainError::Io(m) | MainError::Render(m) => f.write_str(m),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("scrutini: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };
    init_tracing(args.verbose);

    let rc = match run_once(&args) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("scrutini: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// Events go to stderr; stdout carries `parse-report` JSON only.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed (tests); keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Io(_) => IO,
        MainError::Render(_) => IO,
    }
}

/// Translate sc_io::IoError into MainError buckets for exit-code mapping.
fn map_io_err(e: IoError) -> MainError {
    use IoError::*;
    match e {
        Csv(m) => MainError::Validation(format!("csv: {m}")),
        Json { pointer, msg } => MainError::Validation(format!("json {pointer}: {msg}")),
        Params(m) => MainError::Validation(format!("params: {m}")),
        Invalid(m) => MainError::Validation(format!("invalid: {m}")),
        Path(m) => MainError::Io(format!("path: {m}")),
    }
}

fn map_report_err(e: ReportError) -> MainError {
    MainError::Render(format!("report: {e}"))
}

fn run_once(args: &Args) -> Result<(), MainError> {
    match &args.command {
        Command::Finali { deferred, roster } => run_finali(args, deferred, roster),
        Command::PrimoPeriodo { input } => run_period(args, input),
        Command::ParseReport { report } => run_parse_report(report),
    }
}

fn run_options(args: &Args) -> Result<RunOptions, MainError> {
    let params = match &args.params {
        Some(p) => load_params(p).map_err(map_io_err)?,
        None => Params::default(),
    };
    let generated_at = args
        .generated_at
        .clone()
        .unwrap_or_else(|| Local::now().format(TIMESTAMP_FORMAT).to_string());
    Ok(RunOptions::new(params, generated_at))
}

/// Fatal flow errors come back with no rows; anything else is a partial success.
fn check_fatal(errors: &[String], no_rows: bool) -> Result<(), MainError> {
    if !errors.is_empty() && no_rows {
        return Err(MainError::Validation(errors.join("; ")));
    }
    for e in errors {
        eprintln!("scrutini: warning: {e}");
    }
    Ok(())
}

fn digest_of(path: &Path) -> Result<String, MainError> {
    sha256_file(path).map_err(map_io_err)
}

fn run_finali(args: &Args, deferred: &Path, roster: &Path) -> Result<(), MainError> {
    let opts = run_options(args)?;
    let deferred_table = load_table(deferred).map_err(map_io_err)?;
    let roster_table = load_table(roster).map_err(map_io_err)?;
    debug!(deferred = deferred_table.len(), roster = roster_table.len(), "tables loaded");

    let res = merge_voti_files(&deferred_table, &roster_table, &opts);
    check_fatal(&res.errors, res.output_rows.is_empty())?;

    let mut record = RunRecord::new(args.command.flow(), &opts.generated_at, &opts.params);
    record
        .input("deferred", &deferred.to_string_lossy(), digest_of(deferred)?)
        .input("roster", &roster.to_string_lossy(), digest_of(roster)?);

    let csv = args.out.join(FINALI_CSV);
    writer::write_csv(
        &csv,
        &MergedRow::CSV_HEADERS,
        res.output_rows.iter().map(|r| r.csv_record()),
    )
    .map_err(|e| MainError::Io(format!("write {FINALI_CSV}: {e}")))?;

    let doc = if wants_json(args) {
        Some(report_document(args.command.flow(), res.report.as_ref(), &res.controls, &res.errors)?)
    } else {
        None
    };
    let counts = RunCounts { output_rows: res.output_rows.len(), errors: res.errors.len(), warnings: res.warning_count() };
    write_artifacts(args, record, &csv, FINALI_TXT, &res.report_lines, doc, counts)
}

fn run_period(args: &Args, input: &Path) -> Result<(), MainError> {
    let opts = run_options(args)?;
    let table = load_table(input).map_err(map_io_err)?;
    debug!(rows = table.len(), "table loaded");

    let res = transform_single_period(&table, &opts);
    check_fatal(&res.errors, res.output_rows.is_empty())?;

    let mut record = RunRecord::new(args.command.flow(), &opts.generated_at, &opts.params);
    record.input("input", &input.to_string_lossy(), digest_of(input)?);

    let csv = args.out.join(PERIOD_CSV);
    writer::write_csv(&csv, &PeriodRow::CSV_HEADERS, res.output_rows.iter().map(|r| r.csv_record()))
        .map_err(|e| MainError::Io(format!("write {PERIOD_CSV}: {e}")))?;

    let doc = if wants_json(args) {
        Some(report_document(args.command.flow(), res.report.as_ref(), &res.controls, &res.errors)?)
    } else {
        None
    };
    let counts = RunCounts { output_rows: res.output_rows.len(), errors: res.errors.len(), warnings: res.warning_count() };
    write_artifacts(args, record, &csv, PERIOD_TXT, &res.report_lines, doc, counts)
}

fn run_parse_report(report: &Path) -> Result<(), MainError> {
    let text = fs::read_to_string(report).map_err(|e| MainError::Io(format!("read {}: {e}", report.display())))?;
    let lines: Vec<&str> = text.lines().collect();
    let data = parse_report_lines(&lines);
    debug!(controls = data.controls.len(), "report parsed");
    println!("{}", parsed_json(&data)?);
    Ok(())
}

fn wants_json(args: &Args) -> bool {
    args.render.iter().any(|r| r == "json")
}

/// Text report, optional report.json, then run_record.json with digests of
/// everything written before it.
fn write_artifacts(
    args: &Args,
    mut record: RunRecord,
    csv: &Path,
    txt_name: &str,
    report_lines: &[String],
    doc: Option<Value>,
    counts: RunCounts,
) -> Result<(), MainError> {
    let out = &args.out;
    record.output("output_csv", &csv.to_string_lossy(), digest_of(csv)?);

    let txt = out.join(txt_name);
    writer::write_lines(&txt, report_lines).map_err(|e| MainError::Io(format!("write {txt_name}: {e}")))?;
    record.output("report_txt", &txt.to_string_lossy(), digest_of(&txt)?);

    if let Some(doc) = doc {
        let path = out.join(REPORT_JSON);
        canonical_json::write_canonical_file(&path, &doc)
            .map_err(|e| MainError::Io(format!("write {REPORT_JSON}: {e}")))?;
        record.output("report_json", &path.to_string_lossy(), digest_of(&path)?);
    }

    let record = record.with_counts(counts);
    let value = serde_json::to_value(&record).map_err(|e| MainError::Render(format!("run record: {e}")))?;
    canonical_json::write_canonical_file(&out.join(RUN_RECORD), &value)
        .map_err(|e| MainError::Io(format!("write {RUN_RECORD}: {e}")))?;

    info!(
        flow = %record.flow,
        rows = record.counts.output_rows,
        warnings = record.counts.warnings,
        "artifacts written"
    );
    if !args.quiet {
        eprintln!(
            "{}: {} righe, {} avvisi; artifacts written to {}",
            record.flow,
            record.counts.output_rows,
            record.counts.warnings,
            out.to_string_lossy()
        );
    }
    Ok(())
}

// Always accept the concrete inputs; gate bodies by feature.
#[cfg(feature = "report-json")]
fn report_document<M: serde::Serialize>(
    flow: &str,
    report: Option<&M>,
    controls: &[ControlResult],
    errors: &[String],
) -> Result<Value, MainError> {
    let report = match report {
        Some(m) => sc_report::render_value(m).map_err(map_report_err)?,
        None => Value::Null,
    };
    let controls = sc_report::render_value(controls).map_err(map_report_err)?;
    Ok(json!({ "flow": flow, "report": report, "controls": controls, "errors": errors }))
}

#[cfg(not(feature = "report-json"))]
fn report_document<M>(
    _flow: &str,
    _report: Option<&M>,
    _controls: &[ControlResult],
    _errors: &[String],
) -> Result<Value, MainError> {
    Err(MainError::Render("json renderer not enabled (build with feature `report-json`)".into()))
}

#[cfg(feature = "report-json")]
fn parsed_json(data: &sc_report::ReportData) -> Result<String, MainError> {
    sc_report::render_json(data).map_err(map_report_err)
}

#[cfg(not(feature = "report-json"))]
fn parsed_json(_data: &sc_report::ReportData) -> Result<String, MainError> {
    Err(MainError::Render("json renderer not enabled (build with feature `report-json`)".into()))
}
