//! On-disk behavior across modules: load a spreadsheet export, write it back,
//! fingerprint what was written.

use std::fs;

use sc_core::ColumnRef;
use sc_io::prelude::*;
use sc_io::writer::to_csv_bytes;

#[test]
fn exported_semicolon_file_reloads_as_comma_csv() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("export.csv");
    fs::write(&src, "\u{feff}CF;Materia;Valore\nRSSMRA85T10A562S;\"LINGUA; LETT.\";6,5\n").unwrap();

    let t = load_table(&src).unwrap();
    assert_eq!(t.headers(), ["CF", "Materia", "Valore"]);
    assert_eq!(t.records()[0].get(Some(ColumnRef(1))), "LINGUA; LETT.");

    let out = dir.path().join("out").join("copy.csv");
    let headers: Vec<&str> = t.headers().iter().map(String::as_str).collect();
    write_csv(&out, &headers, t.records().iter().map(|r| r.cells().to_vec())).unwrap();

    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text, "CF,Materia,Valore\nRSSMRA85T10A562S,LINGUA; LETT.,\"6,5\"\n");
    assert_eq!(load_table(&out).unwrap().records(), t.records());
}

#[test]
fn file_fingerprint_matches_written_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");
    let lines = vec!["Data/ora: 01/09/2026, 10:00:00".to_string(), "RIEPILOGO".to_string()];
    write_lines(&path, &lines).unwrap();

    let bytes = fs::read(&path).unwrap();
    let of_bytes = |b: &[u8]| sha256_stream(&mut std::io::Cursor::new(b.to_vec())).unwrap();
    assert_eq!(sha256_file(&path).unwrap(), of_bytes(&bytes));

    let csv = to_csv_bytes(&["Hash"], [["'cMDRt"]]).unwrap();
    assert_ne!(of_bytes(&csv), of_bytes(&bytes));
}

#[test]
fn canonical_run_record_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run_record.json");
    let v = serde_json::json!({ "flow": "finali", "counts": { "warnings": 1, "errors": 0 } });
    write_canonical_file(&path, &v).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"counts":{"errors":0,"warnings":1},"flow":"finali"}"#);
}
