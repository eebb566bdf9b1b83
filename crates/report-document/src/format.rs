use serde::Serialize;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use report_spec::{FinalizedReport, RowKind};

use crate::RenderError;

pub const DOCUMENT_TITLE: &str = "Dnevni izveštaj";
pub const REVIEWED_LABEL: &str = "Pregledano";

const DISPLAY_DATE: &[BorrowedFormatItem<'static>] = format_description!("[day].[month].[year].");
const FILE_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Label/value pair shown above the question table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderFact {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLine {
    pub kind: RowKind,
    pub label: String,
    pub value: String,
    /// Dependent rows (notes, form summaries) are indented under their question.
    pub nested: bool,
}

/// Layout-neutral content of a printed or exported report.
///
/// Both the HTML and the PDF output are produced from this model, so the two
/// never disagree about wording or order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentModel {
    pub title: &'static str,
    pub facts: Vec<HeaderFact>,
    pub lines: Vec<DocumentLine>,
    pub reviewed: bool,
    pub file_name: String,
}

impl DocumentModel {
    pub fn build(report: &FinalizedReport) -> Result<Self, RenderError> {
        let header = report.header();
        let date = report.date().format(DISPLAY_DATE)?;
        let mut facts = vec![
            HeaderFact {
                label: "Komitent",
                value: header.company.name.clone(),
            },
            HeaderFact {
                label: "Odgovorno lice",
                value: header.responsible_person.clone(),
            },
            HeaderFact {
                label: "Datum",
                value: date,
            },
        ];
        if !header.author_contact.trim().is_empty() {
            facts.push(HeaderFact {
                label: "Kontakt",
                value: header.author_contact.clone(),
            });
        }

        let lines = report
            .rows()
            .iter()
            .map(|row| DocumentLine {
                kind: row.kind,
                label: row.label.clone(),
                value: row.value.clone(),
                nested: matches!(row.kind, RowKind::Note | RowKind::FormSummary),
            })
            .collect();

        Ok(Self {
            title: DOCUMENT_TITLE,
            facts,
            lines,
            reviewed: report.is_reviewed(),
            file_name: file_name(report)?,
        })
    }
}

/// `Dnevni_izvestaj_{YYYY-MM-DD}.pdf` for the report date.
pub fn file_name(report: &FinalizedReport) -> Result<String, RenderError> {
    let day = report.date().format(FILE_DATE)?;
    Ok(format!("Dnevni_izvestaj_{day}.pdf"))
}
