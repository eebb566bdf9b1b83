use std::fs;

use time::macros::date;

use report_document::{DocumentModel, ExportError, PdfExporter, PrintRenderer, render_pdf};
use report_spec::{
    Answer, Company, FinalizedReport, PersistError, QuestionKey, QuestionRegistry, Report,
    ReportAction, ReportSession, ViewerRole,
};

fn company() -> Company {
    Company {
        id: "c-001".into(),
        name: "Universal Logistics".into(),
        contact: Some("office@ul.example".into()),
        responsible_person: Some("Marko Marković".into()),
    }
}

fn finalized(note: &str, every_note: bool) -> FinalizedReport {
    let mut session = ReportSession::new(
        Report::create(&company(), date!(2024 - 05 - 14)),
        ViewerRole::Author,
    );
    for question in QuestionRegistry::standard() {
        let yes = question.branch.takes_note()
            && (every_note || question.key == QuestionKey::StazeZaKomunikacijuBezbedne);
        if yes {
            session.set_answer(question.key, Answer::Yes).expect("answer");
            session.set_note(question.key, note).expect("note");
        } else {
            session.set_answer(question.key, Answer::No).expect("answer");
        }
    }
    session.finalize(ReportAction::Export).expect("valid report")
}

fn page_count(pdf: &[u8]) -> usize {
    let text = String::from_utf8_lossy(pdf);
    let start = text.find("/Count ").expect("pages tree") + "/Count ".len();
    text[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .expect("page count")
}

#[test]
fn model_carries_header_and_rows() {
    let report = finalized("Sve staze su prohodne i bezbedne.", false);
    let model = DocumentModel::build(&report).expect("model");
    assert_eq!(model.title, "Dnevni izveštaj");
    assert_eq!(model.file_name, "Dnevni_izvestaj_2024-05-14.pdf");
    assert_eq!(model.lines.len(), report.rows().len());
    let date = model
        .facts
        .iter()
        .find(|fact| fact.label == "Datum")
        .expect("date fact");
    assert_eq!(date.value, "14.05.2024.");
    assert!(model.facts.iter().any(|fact| fact.value == "Marko Marković"));
}

#[test]
fn printed_html_lists_every_row_in_order() {
    let report = finalized("Sve staze su prohodne i bezbedne.", false);
    let doc = PrintRenderer::new()
        .expect("renderer")
        .render(&report)
        .expect("html");
    assert!(doc.html.starts_with("<!DOCTYPE html>"));
    assert!(doc.html.contains("<title>Dnevni izveštaj</title>"));

    let mut offset = 0;
    for row in report.rows() {
        let found = doc.html[offset..]
            .find(&row.label)
            .unwrap_or_else(|| panic!("row '{}' missing or out of order", row.label));
        offset += found + row.label.len();
    }
    assert!(doc.html.contains("Sve staze su prohodne i bezbedne."));
}

#[test]
fn short_report_fits_one_page() {
    let report = finalized("Sve staze su prohodne i bezbedne.", false);
    let model = DocumentModel::build(&report).expect("model");
    let pdf = render_pdf(&model);
    assert!(pdf.starts_with(b"%PDF-"));
    assert_eq!(page_count(&pdf), 1);
}

#[test]
fn long_notes_spill_onto_more_pages() {
    let note = "Prolazi su proveravani tokom cele smene i evidentirani u knjizi. ".repeat(30);
    let report = finalized(&note, true);
    let model = DocumentModel::build(&report).expect("model");
    let pdf = render_pdf(&model);
    assert!(page_count(&pdf) > 1);
}

#[test]
fn export_writes_dated_file_without_leftovers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let report = finalized("Sve staze su prohodne i bezbedne.", false);
    let path = PdfExporter::new()
        .export(&report, dir.path())
        .expect("export");

    assert_eq!(path, dir.path().join("Dnevni_izvestaj_2024-05-14.pdf"));
    let bytes = fs::read(&path).expect("read export");
    assert!(bytes.starts_with(b"%PDF-"));
    let entries = fs::read_dir(dir.path()).expect("list").count();
    assert_eq!(entries, 1);
}

#[test]
fn export_refuses_while_another_is_in_flight() {
    let dir = tempfile::tempdir().expect("tempdir");
    let report = finalized("Sve staze su prohodne i bezbedne.", false);
    let exporter = PdfExporter::new();

    let guard = exporter.try_begin().expect("claim");
    let err = exporter
        .export(&report, dir.path())
        .expect_err("busy exporter");
    assert!(matches!(err, ExportError::InProgress));
    assert_eq!(fs::read_dir(dir.path()).expect("list").count(), 0);

    drop(guard);
    exporter.export(&report, dir.path()).expect("export after release");
}

#[test]
fn failed_export_leaves_nothing_behind_and_frees_exporter() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("does-not-exist");
    let report = finalized("Sve staze su prohodne i bezbedne.", false);
    let exporter = PdfExporter::new();

    let err = exporter.export(&report, &missing).expect_err("missing dir");
    assert!(matches!(err, ExportError::Io { .. }));
    assert!(!missing.exists());
    assert!(!exporter.is_busy());
}

#[test]
fn failed_rename_removes_staging_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let occupied = dir.path().join("Dnevni_izvestaj_2024-05-14.pdf");
    fs::create_dir(&occupied).expect("occupy target name");
    let report = finalized("Sve staze su prohodne i bezbedne.", false);
    let exporter = PdfExporter::new();

    let err = exporter.export(&report, dir.path()).expect_err("target is a directory");
    assert!(matches!(err, ExportError::Persist { ref path, .. } if *path == occupied));
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .expect("list")
        .map(|entry| entry.expect("entry").file_name())
        .collect();
    assert_eq!(leftovers, vec![occupied.file_name().expect("name").to_owned()]);
    assert!(occupied.is_dir());
    assert!(!exporter.is_busy());
}

#[test]
fn failing_sink_does_not_block_export() {
    let mut session = ReportSession::new(
        Report::create(&company(), date!(2024 - 05 - 14)),
        ViewerRole::Author,
    );
    for key in QuestionKey::ALL {
        session.set_answer(key, Answer::No).expect("answer");
    }
    let mut sink = |_: &Report| -> Result<(), PersistError> { Err("offline".into()) };
    assert!(session.save(&mut sink).is_err());

    let dir = tempfile::tempdir().expect("tempdir");
    let report = session.finalize(ReportAction::Export).expect("still valid");
    PdfExporter::new()
        .export(&report, dir.path())
        .expect("export");
}
