//! End-to-end behavior of the two flows over in-memory tables.

use sc_core::{ControlStatus, Params, Table};
use sc_io::hasher::anonymize;
use sc_io::loader::load_table;
use sc_pipeline::{compute_statistics, merge_voti_files, transform_single_period, RunOptions};
use sc_report::parse_report_lines;

const MARIO: &str = "RSSMRA85T10A562S";
const LUIGIA: &str = "VRDLGU90A41H501W";
const GIOVANNI: &str = "BNCGVN80A01F205M";

fn opts() -> RunOptions {
    RunOptions::new(Params::default(), "12/09/2026, 10:15:00")
}

fn deferred_mario() -> Table {
    Table::from_rows(
        &["cognome", "nome", "materia", "voto", "voto_differito", "classe"],
        &[&["ROSSI", "MARIO", "MATEMATICA", "4", "7", "3A"]],
    )
    .unwrap()
}

fn roster() -> Table {
    Table::from_rows(
        &["CF", "Materia", "Valore", "classe"],
        &[
            &[MARIO, "MATEMATICA", "4", "3A"],
            &[MARIO, "ESITO", "sospeso", "3A"],
            &[LUIGIA, "ESITO", "ammesso", "4B"],
        ],
    )
    .unwrap()
}

#[test]
fn merge_scenario_carries_deferred_grade_and_outcome() {
    let r = merge_voti_files(&deferred_mario(), &roster(), &opts());
    assert!(r.is_ok(), "{:?}", r.errors);
    assert_eq!(r.output_rows.len(), 3);

    let math = r.output_rows.iter().find(|x| x.subject == "MATEMATICA").unwrap();
    assert_eq!((math.initial.as_str(), math.final_value.as_str()), ("4", "7"));
    assert_eq!((math.initial_numeric.as_str(), math.final_numeric.as_str()), ("4", "7"));
    assert_eq!(math.hash, format!("'{}", anonymize(MARIO)));
    assert_eq!((math.year.as_str(), math.section.as_str()), ("3", "A"));

    let outcome = r.output_rows.iter().find(|x| x.subject == "ESITO" && x.identifier == MARIO).unwrap();
    assert_eq!(outcome.initial, "sospeso");
    assert_eq!(outcome.final_value, "sospeso");

    let other = r.output_rows.iter().find(|x| x.identifier == LUIGIA).unwrap();
    assert_eq!(other.initial, "ammesso");
    assert_eq!(other.class_label, "4B");
}

#[test]
fn merge_rows_never_expose_identifier_in_csv() {
    let r = merge_voti_files(&deferred_mario(), &roster(), &opts());
    for row in &r.output_rows {
        assert!(!row.csv_record().iter().any(|c| c.contains(MARIO)));
    }
}

#[test]
fn merge_is_idempotent() {
    let a = merge_voti_files(&deferred_mario(), &roster(), &opts());
    let b = merge_voti_files(&deferred_mario(), &roster(), &opts());
    assert_eq!(a.output_rows, b.output_rows);
    assert_eq!(a.report_lines, b.report_lines);
    assert_eq!(a.controls, b.controls);
}

#[test]
fn suspended_without_failures_yields_one_check_one_anomaly() {
    let roster = Table::from_rows(
        &["CF", "Materia", "Valore", "classe"],
        &[
            &[GIOVANNI, "ITALIANO", "6", "2C"],
            &[GIOVANNI, "STORIA", "7", "2C"],
            &[GIOVANNI, "ESITO", "sospeso", "2C"],
        ],
    )
    .unwrap();
    let deferred = Table::from_rows(
        &["cognome", "nome", "materia", "voto", "voto_differito", "classe"],
        &[&["BIANCHI", "GIOVANNI", "ITALIANO", "6", "6", "2C"]],
    )
    .unwrap();
    let r = merge_voti_files(&deferred, &roster, &opts());
    let coherence = &r.report.as_ref().unwrap().coherence;
    assert_eq!(coherence.check1.len(), 1);
    assert_eq!(coherence.check1[0].student, GIOVANNI);
    assert_eq!(r.controls[0].status, ControlStatus::Warning);
    assert!(r.report_lines.contains(&"      CF: BNCGVN... - voto minimo: 6".to_string()));
}

#[test]
fn report_text_round_trips_through_parser() {
    let r = merge_voti_files(&deferred_mario(), &roster(), &opts());
    let text = r.report_lines.join("\n");
    let lines: Vec<&str> = text.split('\n').collect();
    let data = parse_report_lines(&lines);

    assert_eq!(data.generated_at, "12/09/2026, 10:15:00");
    assert_eq!(data.controls, r.controls);
    assert_eq!(data.summary.total_rows, 3);
    assert_eq!(data.summary.total_students, 2);
    assert_eq!(data.summary.suspended, 1);
    assert_eq!(data.outcomes.initial.get("sospeso"), Some(&1));
    assert_eq!(data.outcomes.total_students, 2);
    assert_eq!(data.statistics.by_class.get("3A"), Some(&1));
}

#[test]
fn merge_fatal_errors_short_circuit() {
    let empty = Table::from_rows(&["cognome", "nome", "materia"], &[]).unwrap();
    let r = merge_voti_files(&empty, &roster(), &opts());
    assert_eq!(r.errors, ["Il file degli scrutini differiti è vuoto"]);
    assert!(r.output_rows.is_empty() && r.report_lines.is_empty() && r.report.is_none());

    let bad = Table::from_rows(&["alunno", "materia"], &[&["X", "Y"]]).unwrap();
    let r = merge_voti_files(&bad, &roster(), &opts());
    assert_eq!(r.errors, ["Nel file differiti non trovo almeno uno tra: cognome, nome, materia"]);

    let bad_roster = Table::from_rows(&["CF", "classe"], &[&[MARIO, "3A"]]).unwrap();
    let r = merge_voti_files(&deferred_mario(), &bad_roster, &opts());
    assert_eq!(r.errors, ["Nel file completo non trovo almeno uno tra: materia/materia_desc, valore"]);
}

fn period_table() -> Table {
    Table::from_rows(
        &["CodiceFiscaleAlunno", "DescrizioneMateria", "Classe", "VotoOraleUnico", "VotoScritto"],
        &[
            &[MARIO, "RELIGIONE", "3A", "4", "4"],
            &[MARIO, "MATEMATICA", "3A", "NC", ""],
            &[LUIGIA, "MATEMATICA", "3A", "5", ""],
            &[GIOVANNI, "MATEMATICA", "3A", "7", "8"],
            &["NONVALIDO", "STORIA", "3A", "6", ""],
        ],
    )
    .unwrap()
}

#[test]
fn single_period_excludes_and_keeps_nc_out_of_rates() {
    let r = transform_single_period(&period_table(), &opts());
    assert!(r.is_ok(), "{:?}", r.errors);
    assert!(r.output_rows.iter().all(|x| x.subject != "RELIGIONE"));
    assert_eq!(r.output_rows.len(), 3);
    assert!(r.output_rows.iter().all(|x| !x.hash.is_empty()));

    let counters = r.report.as_ref().unwrap().counters;
    assert_eq!(counters.rows_in_file, 5);
    assert_eq!(counters.excluded_subjects, 1);
    assert_eq!(counters.skipped_invalid_identifier, 1);
    assert_eq!(counters.unique_students, 3);

    let stats = compute_statistics(&r.output_rows, &Params::default());
    assert_eq!(stats.nc_total, 1);
    let math = stats.subjects.iter().find(|s| s.subject == "MATEMATICA").unwrap();
    assert_eq!((math.total, math.nc), (3, 1));
    assert_eq!(math.failures, 1);
    assert_eq!(math.failure_pct, 50.0);

    // Only students with at least one graded subject are bucketed (Mario has NC only).
    let buckets: usize = stats.distribution.iter().map(|b| b.count).sum();
    assert_eq!(stats.total_students, 3);
    assert_eq!(buckets, 2);
}

#[test]
fn single_period_report_and_dashboard() {
    let r = transform_single_period(&period_table(), &opts());
    assert_eq!(r.report_lines[1], "REPORT ELABORAZIONE PRIMO PERIODO");
    assert!(r.report_lines.contains(&"Materie escluse (non didattiche): 1".to_string()));
    assert!(r.report_lines.contains(&"Righe skippate (CF non valido): 1".to_string()));
    assert!(r.report_lines.contains(&"\nVoti Pratici: colonna non presente nel file".to_string()));
    assert_eq!(r.controls.len(), 8);
    assert_eq!(r.controls[6].title, "Voti NC (Non Classificato)");
    assert_eq!(r.controls[6].status, ControlStatus::Warning);
}

#[test]
fn single_period_fatal_errors() {
    let empty = Table::from_rows(&["cf", "materia"], &[]).unwrap();
    assert_eq!(transform_single_period(&empty, &opts()).errors, ["Il file è vuoto"]);

    let no_subject = Table::from_rows(&["cf", "voto"], &[&[MARIO, "6"]]).unwrap();
    let r = transform_single_period(&no_subject, &opts());
    assert_eq!(
        r.errors,
        ["Colonna Materia non trovata (cercate: descrizionemateria, materia_desc, materia, disciplina)"]
    );
    assert!(r.output_rows.is_empty());
}

#[test]
fn single_period_from_semicolon_csv_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("primo.csv");
    let csv = format!("cf;materia;classe;voto_orale\n{MARIO};Matematica_U;3A;6,5\n{LUIGIA};Fisica (lab);4B;8\n");
    std::fs::write(&path, csv).unwrap();

    let table = load_table(&path).unwrap();
    let r = transform_single_period(&table, &opts());
    assert!(r.is_ok(), "{:?}", r.errors);
    let subjects: Vec<&str> = r.output_rows.iter().map(|x| x.subject.as_str()).collect();
    assert!(subjects.contains(&"MATEMATICA") || subjects.contains(&"Matematica"));
    let oral: Vec<&str> = r.output_rows.iter().map(|x| x.oral_numeric.as_str()).collect();
    assert!(oral.contains(&"6.5"));
}
