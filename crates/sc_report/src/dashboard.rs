//! Single-period dashboard: eight controls derived from a `StatsSnapshot`.

use sc_algo::stats::BUCKET_LABELS;
use sc_algo::StatsSnapshot;
use sc_core::{format_fixed, format_number, ControlResult, ControlStatus, Params};

const FAILURE_RATE_WARN: f64 = 30.0;
const FAILURE_RATE_INFO: f64 = 20.0;
const CRITICAL_WARN: f64 = 15.0;
const CRITICAL_INFO: f64 = 10.0;

fn banded(v: f64, warn: f64, info: f64) -> ControlStatus {
    if v > warn {
        ControlStatus::Warning
    } else if v > info {
        ControlStatus::Info
    } else {
        ControlStatus::Ok
    }
}

fn ok_or_warn(ok: bool) -> ControlStatus {
    if ok {
        ControlStatus::Ok
    } else {
        ControlStatus::Warning
    }
}

pub fn dashboard_controls(s: &StatsSnapshot, params: &Params) -> Vec<ControlResult> {
    let mut out = Vec::with_capacity(8);

    out.push(
        ControlResult::new("Dati Caricati")
            .with_description(format!("{} righe elaborate correttamente", s.total_rows))
            .with_status(ok_or_warn(s.total_rows > 0))
            .with_value(s.total_rows.to_string()),
    );

    out.push(
        ControlResult::new("Studenti Identificati")
            .with_description(format!("{} studenti unici in {} classi", s.total_students, s.total_classes))
            .with_status(ControlStatus::Ok)
            .with_value(s.total_students.to_string()),
    );

    out.push(
        ControlResult::new("Materie Elaborate")
            .with_description(format!("{} materie analizzate", s.total_subjects))
            .with_status(ControlStatus::Ok)
            .with_value(s.total_subjects.to_string()),
    );

    let rate = s.failure_pct;
    out.push(
        ControlResult::new("Tasso Insufficienze")
            .with_description(if rate > FAILURE_RATE_WARN {
                "Percentuale elevata di insufficienze"
            } else {
                "Percentuale nella norma"
            })
            .with_status(banded(rate, FAILURE_RATE_WARN, FAILURE_RATE_INFO))
            .with_value(format!("{}%", format_fixed(rate, 1))),
    );

    let critical = s.bucket_count(BUCKET_LABELS[4]);
    let critical_pct =
        if s.total_students > 0 { critical as f64 / s.total_students as f64 * 100.0 } else { 0.0 };
    let mut c = ControlResult::new("Studenti Critici")
        .with_description("Studenti con 4 o più insufficienze")
        .with_status(banded(critical_pct, CRITICAL_WARN, CRITICAL_INFO))
        .with_value(critical.to_string());
    c.push_detail(format!("{}% del totale", format_fixed(critical_pct, 1)));
    out.push(c);

    let sufficient = s.oral_mean >= params.sufficiency_threshold;
    out.push(
        ControlResult::new("Media Voti Orali")
            .with_description(if sufficient { "Media sufficiente" } else { "Media insufficiente" })
            .with_status(ok_or_warn(sufficient))
            .with_value(format_fixed(s.oral_mean, 2)),
    );

    let nc = s.nc_students.len();
    let mut c = ControlResult::new("Voti NC (Non Classificato)")
        .with_status(ok_or_warn(nc == 0))
        .with_value(s.nc_total.to_string());
    if nc > 0 {
        c = c.with_description(format!("{nc} studenti con voti NC"));
        c.push_detail(format!("{nc} studenti coinvolti"));
    } else {
        c = c.with_description("Nessuno studente con voti NC");
    }
    out.push(c);

    let threshold = format_number(s.absence_threshold);
    let absent = s.high_absence.len();
    let mut c = ControlResult::new(format!("Assenze Elevate (>{threshold}h)"))
        .with_status(ok_or_warn(absent == 0))
        .with_value(absent.to_string());
    if absent > 0 {
        c = c.with_description(format!("{absent} studenti con molte assenze"));
        c.push_detail(format!("Soglia: {threshold} ore totali"));
    } else {
        c = c.with_description("Nessuno studente con assenze elevate");
    }
    out.push(c);

    out
}
