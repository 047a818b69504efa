//! Binary-level behavior: exit codes, artifacts, offline path checks.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const MARIO: &str = "RSSMRA85T10A562S";
const LUIGIA: &str = "VRDLGU90A41H501W";
const STAMP: &str = "01/09/2026, 10:00:00";

fn scrutini() -> Command {
    let mut c = Command::cargo_bin("scrutini").unwrap();
    c.env_remove("RUST_LOG");
    c
}

fn write_finali_inputs(dir: &Path) -> (String, String) {
    let deferred = dir.join("differiti.csv");
    fs::write(&deferred, "cognome;nome;materia;voto;voto_differito;classe\nROSSI;MARIO;MATEMATICA;4;7;3A\n").unwrap();
    let roster = dir.join("completo.csv");
    fs::write(
        &roster,
        format!("CF,Materia,Valore,classe\n{MARIO},MATEMATICA,4,3A\n{MARIO},ESITO,sospeso,3A\n{LUIGIA},ESITO,ammesso,4B\n"),
    )
    .unwrap();
    (deferred.to_string_lossy().into_owned(), roster.to_string_lossy().into_owned())
}

fn run_finali(dir: &Path, out: &Path) -> assert_cmd::assert::Assert {
    let (deferred, roster) = write_finali_inputs(dir);
    scrutini()
        .args(["finali", "--deferred", &deferred, "--roster", &roster, "--generated-at", STAMP, "--quiet"])
        .arg("--out")
        .arg(out)
        .assert()
}

#[test]
fn finali_writes_csv_report_and_run_record() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    run_finali(dir.path(), &out).success().stdout(predicate::str::is_empty());

    let csv = fs::read_to_string(out.join("voti_finali.csv")).unwrap();
    assert!(csv.starts_with("Hash,Materia,Classe_Sigla,Anno,Sezione,EsitoIniziale"));
    assert!(!csv.contains(MARIO));
    assert_eq!(csv.lines().count(), 4);

    let txt = fs::read_to_string(out.join("report_finali.txt")).unwrap();
    assert!(txt.contains("REPORT CONTROLLI POST-PROCESSING"));
    assert!(txt.contains(&format!("Data/ora: {STAMP}")));

    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("run_record.json")).unwrap()).unwrap();
    assert_eq!(record["flow"], "finali");
    assert_eq!(record["counts"]["output_rows"], 3);
    assert_eq!(record["inputs"].as_array().unwrap().len(), 2);
    assert_eq!(record["outputs"][0]["role"], "output_csv");
    assert_eq!(record["outputs"][0]["sha256"].as_str().unwrap().len(), 64);
    assert!(!out.join("report.json").exists());
}

#[test]
fn render_json_adds_report_document() {
    let dir = tempfile::tempdir().unwrap();
    let (deferred, roster) = write_finali_inputs(dir.path());
    scrutini()
        .args(["finali", "--deferred", &deferred, "--roster", &roster, "--render", "json", "--quiet"])
        .arg("--out")
        .arg(dir.path())
        .assert()
        .success();

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap()).unwrap();
    assert_eq!(doc["flow"], "finali");
    assert_eq!(doc["report"]["total_rows"], 3);
    assert!(doc["controls"].as_array().unwrap().len() >= 3);
}

#[test]
fn same_inputs_give_identical_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let (a, b) = (dir.path().join("a"), dir.path().join("b"));
    run_finali(dir.path(), &a).success();
    run_finali(dir.path(), &b).success();
    for name in ["voti_finali.csv", "report_finali.txt"] {
        assert_eq!(fs::read(a.join(name)).unwrap(), fs::read(b.join(name)).unwrap(), "{name}");
    }
}

#[test]
fn fatal_input_error_exits_2_with_message() {
    let dir = tempfile::tempdir().unwrap();
    let deferred = dir.path().join("vuoto.csv");
    fs::write(&deferred, "cognome,nome,materia,voto,voto_differito,classe\n").unwrap();
    let (_, roster) = write_finali_inputs(dir.path());
    scrutini()
        .args(["finali", "--roster", &roster, "--quiet"])
        .arg("--deferred")
        .arg(&deferred)
        .arg("--out")
        .arg(dir.path().join("out"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Il file degli scrutini differiti è vuoto"));
    assert!(!dir.path().join("out").join("voti_finali.csv").exists());
}

#[test]
fn url_inputs_are_rejected() {
    scrutini()
        .args(["primo-periodo", "--input", "https://example.org/voti.csv"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no scheme"));
}

#[test]
fn missing_input_names_the_flag() {
    scrutini()
        .args(["parse-report", "--report", "no/such/report.txt"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("file not found: --report"));
}

#[test]
fn out_of_domain_params_exit_2() {
    let dir = tempfile::tempdir().unwrap();
    let params = dir.path().join("params.json");
    fs::write(&params, r#"{"report_detail_limit": 0}"#).unwrap();
    let input = dir.path().join("primo.csv");
    fs::write(&input, format!("cf,materia,classe,voto_orale\n{MARIO},MATEMATICA,3A,6\n")).unwrap();
    scrutini()
        .arg("primo-periodo")
        .arg("--input")
        .arg(&input)
        .arg("--params")
        .arg(&params)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("report_detail_limit"));
}

#[test]
fn primo_periodo_anonymizes_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("primo.csv");
    fs::write(
        &input,
        format!("cf;materia;classe;voto_orale\n{MARIO};Matematica;3A;6,5\n{MARIO};Religione;3A;8\n{LUIGIA};Fisica;4B;5\n"),
    )
    .unwrap();
    scrutini()
        .arg("primo-periodo")
        .arg("--input")
        .arg(&input)
        .arg("--out")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("primo-periodo: 2 righe"));

    let csv = fs::read_to_string(dir.path().join("voti_primo_periodo.csv")).unwrap();
    assert!(csv.starts_with("Hash,Classe_Sigla,Anno,Sezione,Quadrimestre,Materia"));
    assert!(!csv.contains(MARIO) && !csv.contains(LUIGIA));
    assert!(!csv.to_uppercase().contains("RELIGIONE"));

    let txt = fs::read_to_string(dir.path().join("report_primo_periodo.txt")).unwrap();
    assert!(txt.contains("REPORT ELABORAZIONE PRIMO PERIODO"));
    assert!(txt.contains("Materie escluse (non didattiche): 1"));
}

#[test]
fn parse_report_prints_structured_json() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    run_finali(dir.path(), &out).success();

    let assert = scrutini()
        .arg("parse-report")
        .arg("--report")
        .arg(out.join("report_finali.txt"))
        .assert()
        .success();
    let data: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(data["generated_at"], STAMP);
    assert_eq!(data["summary"]["total_rows"], 3);
    assert_eq!(data["summary"]["suspended"], 1);
    assert_eq!(data["statistics"]["by_class"]["3A"], 1);
}
