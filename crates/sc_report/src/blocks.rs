// crates/sc_report/src/blocks.rs
//
// Check blocks of section B. One block renders into report lines and converts
// into one `ControlResult`; both views come from the same data.

use sc_algo::CoherenceReport;
use sc_core::{format_number, ControlResult, ControlStatus, Params};

use crate::{short_ref, OK_MARK, WARN_MARK};

#[derive(Clone, Debug, PartialEq)]
pub enum BlockLine {
    /// Plain informative line. Not recovered by the parser.
    Note(String),
    /// `✅ OK:` line; sets the block to ok.
    Ok(String),
    /// `⚠️` line; sets the block to warning.
    Warn(String),
    /// Anomaly detail (`CF: ...` or `xxxxxx... - ...`).
    Detail(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CheckBlock {
    /// "1", "2", "3", "3a", "3b".
    pub number: String,
    /// Heading text after `n) `. Sub-blocks keep their trailing colon.
    pub heading: String,
    pub sub: bool,
    pub description: Option<String>,
    pub lines: Vec<BlockLine>,
}

impl CheckBlock {
    fn main(number: &str, heading: impl Into<String>) -> Self {
        Self { number: number.into(), heading: heading.into(), sub: false, description: None, lines: Vec::new() }
    }

    fn sub(number: &str, heading: impl Into<String>) -> Self {
        Self { sub: true, ..Self::main(number, heading) }
    }

    fn described(mut self, d: impl Into<String>) -> Self {
        self.description = Some(d.into());
        self
    }

    fn push(&mut self, l: BlockLine) {
        self.lines.push(l);
    }

    pub fn title(&self) -> String {
        format!("{}) {}", self.number, self.heading)
    }

    /// Report lines for this block (leading `\n` marks a blank line before).
    pub fn render(&self) -> Vec<String> {
        let (head, body, detail) = if self.sub { ("   ", "       ", "          ") } else { ("", "   ", "      ") };
        let mut out = Vec::with_capacity(self.lines.len() + 2);
        if self.sub {
            out.push(format!("\n{head}{}", self.title()));
        } else {
            out.push(format!("\n{}:", self.title()));
        }
        if let Some(d) = &self.description {
            out.push(format!("{body}({d})"));
        }
        for l in &self.lines {
            out.push(match l {
                BlockLine::Note(t) => format!("{body}{t}"),
                BlockLine::Ok(t) => format!("{body}{OK_MARK} OK: {t}"),
                BlockLine::Warn(t) => format!("\n{body}{WARN_MARK}  {t}"),
                BlockLine::Detail(t) => format!("{detail}{t}"),
            });
        }
        out
    }

    pub fn to_control(&self) -> ControlResult {
        let mut c = ControlResult::new(self.title());
        if let Some(d) = &self.description {
            c = c.with_description(d.clone());
        }
        for l in &self.lines {
            match l {
                BlockLine::Note(_) => {}
                BlockLine::Ok(t) => {
                    c.status = ControlStatus::Ok;
                    c.push_detail(t.clone());
                }
                BlockLine::Warn(t) => {
                    c.status = ControlStatus::Warning;
                    c.push_detail(t.clone());
                }
                BlockLine::Detail(t) => c.push_detail(t.clone()),
            }
        }
        c
    }
}

/// Section B blocks. Empty when no student was suspended.
pub fn coherence_blocks(r: &CoherenceReport, params: &Params) -> Vec<CheckBlock> {
    if r.suspended.is_empty() {
        return Vec::new();
    }
    let limit = params.report_detail_limit;
    let pass = format_number(params.sufficiency_threshold);
    let mut blocks = Vec::with_capacity(5);

    // 1
    let mut b = CheckBlock::main("1", "Controllo voti iniziali studenti sospesi")
        .described("dovrebbero avere almeno una insufficienza nelle materie didattiche");
    if r.check1.is_empty() {
        b.push(BlockLine::Ok("Tutti gli studenti sospesi hanno almeno un'insufficienza".into()));
    } else {
        b.push(BlockLine::Warn(format!("ANOMALIA: {} studenti sospesi senza insufficienze:", r.check1.len())));
        for a in r.check1.iter().take(limit) {
            b.push(BlockLine::Detail(format!(
                "CF: {}... - voto minimo: {}",
                short_ref(&a.student),
                format_number(a.min_grade)
            )));
        }
    }
    blocks.push(b);

    // 2
    let mut b = CheckBlock::main("2", "Controllo voti finali studenti sospesi poi ammessi")
        .described(format!("dovrebbero avere tutti voti >= {pass}"));
    if !r.admitted.is_empty() {
        b.push(BlockLine::Note(format!("Studenti ammessi dopo sospensione: {}", r.admitted.len())));
        if r.check2.is_empty() {
            b.push(BlockLine::Ok(format!("Tutti gli studenti ammessi hanno voti >= {pass}")));
        } else {
            b.push(BlockLine::Warn(format!("ANOMALIA: {} studenti ammessi con insufficienze:", r.check2.len())));
            for a in r.check2.iter().take(limit) {
                b.push(BlockLine::Detail(format!(
                    "CF: {}... - {}: {}",
                    short_ref(&a.student),
                    a.subject,
                    format_number(a.grade)
                )));
            }
        }
    }
    blocks.push(b);

    // 3
    blocks.push(CheckBlock::main("3", "Controllo materie con voti modificati").described("solo materie didattiche"));

    if !r.admitted.is_empty() {
        let mut b = CheckBlock::sub("3a", format!("Studenti AMMESSI dopo sospensione ({} studenti):", r.admitted.len()));
        if r.changed_admitted == 0 {
            b.push(BlockLine::Note("Nessuna materia modificata".into()));
        } else {
            b.push(BlockLine::Note(format!("Materie con voto modificato: {}", r.changed_admitted)));
            if r.check3a.is_empty() {
                b.push(BlockLine::Ok(format!("Tutti i voti modificati sono coerenti (da <{pass} a >={pass})")));
            } else {
                b.push(BlockLine::Warn(format!("ANOMALIE in {} casi:", r.check3a.len())));
                for a in r.check3a.iter().take(limit) {
                    let subject: String = a.subject.chars().take(30).collect();
                    b.push(BlockLine::Detail(format!(
                        "{}... - {}: {}->{} ({})",
                        short_ref(&a.student),
                        subject,
                        format_number(a.initial),
                        format_number(a.final_grade),
                        a.reason.label()
                    )));
                }
            }
        }
        blocks.push(b);
    }

    if !r.not_admitted.is_empty() {
        let mut b =
            CheckBlock::sub("3b", format!("Studenti NON AMMESSI dopo sospensione ({} studenti):", r.not_admitted.len()))
                .described(format!("dovrebbero avere almeno un voto finale < {pass}"));
        if r.check3b.is_empty() {
            b.push(BlockLine::Ok("Tutti i non ammessi hanno almeno un'insufficienza finale".into()));
        } else {
            b.push(BlockLine::Warn(format!(
                "ANOMALIA: {} studenti non ammessi senza insufficienze:",
                r.check3b.len()
            )));
            for a in r.check3b.iter().take(limit) {
                b.push(BlockLine::Detail(format!(
                    "CF: {}... - voto minimo: {}",
                    short_ref(&a.student),
                    format_number(a.min_grade)
                )));
            }
        }
        blocks.push(b);
    }

    blocks
}

/// Structured view of section B.
pub fn coherence_controls(r: &CoherenceReport, params: &Params) -> Vec<ControlResult> {
    coherence_blocks(r, params).iter().map(CheckBlock::to_control).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_algo::{MinGradeAnomaly, FailingSubject};

    fn report() -> CoherenceReport {
        CoherenceReport {
            suspended: vec!["RSSMRA80A01H501U".into(), "VRDLGU".into()],
            admitted: vec!["RSSMRA80A01H501U".into()],
            not_admitted: vec!["VRDLGU".into()],
            check1: vec![MinGradeAnomaly { student: "VRDLGU".into(), min_grade: 6.5 }],
            check2: vec![FailingSubject { student: "RSSMRA80A01H501U".into(), subject: "FISICA".into(), grade: 5.0 }],
            changed_admitted: 0,
            check3a: vec![],
            check3b: vec![],
        }
    }

    #[test]
    fn no_suspended_means_no_blocks() {
        assert!(coherence_blocks(&CoherenceReport::default(), &Params::default()).is_empty());
    }

    #[test]
    fn blocks_render_with_fixed_indentation() {
        let blocks = coherence_blocks(&report(), &Params::default());
        let numbers: Vec<&str> = blocks.iter().map(|b| b.number.as_str()).collect();
        assert_eq!(numbers, ["1", "2", "3", "3a", "3b"]);

        let one = blocks[0].render();
        assert_eq!(one[0], "\n1) Controllo voti iniziali studenti sospesi:");
        assert_eq!(one[1], "   (dovrebbero avere almeno una insufficienza nelle materie didattiche)");
        assert_eq!(one[2], "\n   ⚠️  ANOMALIA: 1 studenti sospesi senza insufficienze:");
        assert_eq!(one[3], "      CF: VRDLGU... - voto minimo: 6.5");

        let two = blocks[1].render();
        assert_eq!(two[3], "\n   ⚠️  ANOMALIA: 1 studenti ammessi con insufficienze:");
        assert_eq!(two[4], "      CF: RSSMRA... - FISICA: 5");

        let three_a = blocks[3].render();
        assert_eq!(three_a[0], "\n   3a) Studenti AMMESSI dopo sospensione (1 studenti):");
        assert_eq!(three_a[1], "       Nessuna materia modificata");

        let three_b = blocks[4].render();
        assert_eq!(three_b[2], "       ✅ OK: Tutti i non ammessi hanno almeno un'insufficienza finale");
    }

    #[test]
    fn controls_follow_block_lines() {
        let cs = coherence_controls(&report(), &Params::default());
        assert_eq!(cs.len(), 5);
        assert_eq!(cs[0].title, "1) Controllo voti iniziali studenti sospesi");
        assert_eq!(cs[0].status, ControlStatus::Warning);
        assert_eq!(cs[0].details, ["ANOMALIA: 1 studenti sospesi senza insufficienze:", "CF: VRDLGU... - voto minimo: 6.5"]);
        assert_eq!(cs[2].status, ControlStatus::Info);
        assert!(cs[2].details.is_empty());
        assert_eq!(cs[3].title, "3a) Studenti AMMESSI dopo sospensione (1 studenti):");
        assert!(cs[3].details.is_empty());
        assert_eq!(cs[4].status, ControlStatus::Ok);
    }

    #[test]
    fn details_are_truncated_to_limit() {
        let mut r = report();
        r.check1 = (0..8).map(|i| MinGradeAnomaly { student: format!("S{i}"), min_grade: 7.0 }).collect();
        let params = Params { report_detail_limit: 3, ..Params::default() };
        let c = &coherence_controls(&r, &params)[0];
        assert_eq!(c.details[0], "ANOMALIA: 8 studenti sospesi senza insufficienze:");
        assert_eq!(c.details.len(), 4);
    }
}
