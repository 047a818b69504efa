//! render_json.rs: JSON rendering of report models.
//!
//! Field order follows struct layout; maps are `BTreeMap`, so the output is
//! stable across runs for identical inputs.

use serde::Serialize;
use serde_json::Value;

use crate::ReportError;

/// Pretty JSON text of any report model (`FinaliReport`, `PeriodReport`,
/// `ReportData`, a control list).
pub fn render_json<T: Serialize + ?Sized>(model: &T) -> Result<String, ReportError> {
    serde_json::to_string_pretty(model).map_err(|_| ReportError::Render("json_serialize"))
}

/// Same as [`render_json`], as a value tree for callers that embed it.
pub fn render_value<T: Serialize + ?Sized>(model: &T) -> Result<Value, ReportError> {
    serde_json::to_value(model).map_err(|_| ReportError::Render("json_value"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_report_lines;
    use sc_core::{ControlResult, ControlStatus};

    #[test]
    fn controls_serialize_with_lowercase_status() {
        let c = vec![ControlResult::new("Dati Caricati").with_status(ControlStatus::Warning).with_value("0")];
        let v = render_value(&c[..]).unwrap();
        assert_eq!(v[0]["status"], "warning");
        assert_eq!(v[0]["value"], "0");
    }

    #[test]
    fn parsed_report_renders_sections() {
        let data = parse_report_lines(&["Data/ora: 01/01/2026, 00:00:00", "A) STATISTICHE GENERALI", "  Anno 1: 4 studenti"]);
        let v = render_value(&data).unwrap();
        assert_eq!(v["generated_at"], "01/01/2026, 00:00:00");
        assert_eq!(v["statistics"]["by_year"]["1"], 4);
        assert!(render_json(&data).unwrap().contains("\"summary\""));
    }

    #[test]
    fn finali_json_keeps_only_truncated_identifiers() {
        use sc_algo::MergedRow;
        use sc_core::Params;

        let id = "ZZZQQQ99A01F205X";
        let row = |subject: &str, value: &str| MergedRow {
            identifier: id.into(),
            student_key: format!("{id}§1A"),
            hash: "'h".into(),
            subject: subject.into(),
            class_label: "1A".into(),
            year: "1".into(),
            section: "A".into(),
            initial: value.into(),
            final_value: value.into(),
            ..MergedRow::default()
        };
        let rows = vec![row("ITALIANO", "7"), row("ESITO", "sospeso")];
        let report = crate::FinaliReport::build(&rows, &Params::default(), "t");
        let text = render_json(&report).unwrap();
        assert!(!text.contains(id));
        assert!(text.contains("ZZZQQQ..."));
    }
}
