// crates/sc_algo/src/columns.rs
//
// Column resolution over heterogeneous export headers.
//
// Headers are normalized (trim + lowercase) once. The exact pass walks headers in
// order and stops at the first header equal to ANY alias, so header order wins
// over alias order. The substring pass (optional) walks headers again and, per
// header, scans the aliases for containment.

use sc_core::text::normalize_header;
use sc_core::ColumnRef;

/// First matching header for `aliases`, or `None`.
pub fn resolve_column(headers: &[String], aliases: &[&str], allow_substring: bool) -> Option<ColumnRef> {
    let norm: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

    if let Some(i) = norm.iter().position(|h| aliases.contains(&h.as_str())) {
        return Some(ColumnRef(i));
    }
    if allow_substring {
        return norm
            .iter()
            .position(|h| aliases.iter().any(|a| h.contains(a)))
            .map(ColumnRef);
    }
    None
}

/// Header present verbatim (no normalization).
pub fn exact_header(headers: &[String], name: &str) -> Option<ColumnRef> {
    headers.iter().position(|h| h == name).map(ColumnRef)
}

/// Alias tables, in priority order as written.
pub mod aliases {
    // ---- deferred-exam file ----
    pub const DEFERRED_SURNAME: &[&str] = &["cognome"];
    pub const DEFERRED_NAME: &[&str] = &["nome"];
    pub const DEFERRED_SUBJECT: &[&str] = &["materia", "materia_desc"];
    pub const DEFERRED_GRADE: &[&str] = &["voto"];
    pub const DEFERRED_EXAM_GRADE: &[&str] = &["voto_differito", "voto differito"];
    pub const DEFERRED_EXAM_OUTCOME: &[&str] = &["esito_differito", "esito differito"];
    pub const DEFERRED_OUTCOME: &[&str] = &["esito"];
    pub const DEFERRED_CLASS_DESC: &str = "classe_indirizzo";

    // ---- full roster ----
    pub const ROSTER_CODE: &[&str] = &["codice_fisc", "codice fiscale", "cf", "codicefiscale"];
    pub const ROSTER_SUBJECT: &[&str] = &["materia_desc", "materia"];
    pub const ROSTER_VALUE: &[&str] = &["valore", "voto", "esito"];
    pub const ROSTER_CLASS_DESC: &str = "classe_desc";

    // ---- shared class columns (matched verbatim) ----
    pub const CLASS_SIGLA: &str = "classe_sigla";
    pub const CLASS_YEAR: &str = "classe_anno_corso";
    pub const CLASS: &str = "classe";

    // ---- single-period file ----
    pub const PERIOD_CODE: &[&str] =
        &["codicefiscalealunno", "codice_fiscale", "codice fiscale", "cf", "codicefiscale", "codice_fisc"];
    pub const PERIOD_SUBJECT: &[&str] =
        &["descrizionemateria", "descrizione_materia", "materia_desc", "materia", "disciplina"];
    pub const PERIOD_YEAR: &[&str] = &["anno", "anno_corso", "classe_anno"];
    pub const PERIOD_SECTION: &[&str] = &["sezione", "sez", "classe_sezione"];
    pub const PERIOD_CLASS_SIGLA: &[&str] = &["classe_sigla", "classe", "classesigla"];
    pub const PERIOD_TERM: &[&str] = &["quadrimestre", "quadimestre", "periodo", "trimestre"];
    pub const PERIOD_WRITTEN: &[&str] = &["votoscritto", "voto_scritto", "scritto", "voto scritto"];
    pub const PERIOD_ORAL: &[&str] =
        &["votooraleunico", "voto_orale", "orale", "voto_orale_unico", "voto orale"];
    pub const PERIOD_PRACTICAL: &[&str] =
        &["votopraticografico", "voto_pratico", "pratico", "voto_pratico_grafico", "voto pratico"];
    pub const PERIOD_ABSENCE: &[&str] =
        &["orediassenza", "ore_assenza", "assenze", "ore_di_assenza", "ore assenza"];
}
