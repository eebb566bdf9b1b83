use serde::Serialize;

use crate::registry::{BranchKind, QuestionKey, QuestionRegistry};
use crate::role::SummaryDetail;
use crate::state::Report;

pub const NOTE_LABEL: &str = "Obrazloženje";
pub const FORM_PLACEHOLDER: &str = "Obrazac popunjen";
pub const GENERAL_NOTE_LABEL: &str = "Napomena";
pub const REVIEWER_NOTE_LABEL: &str = "Napomena revizora";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Question,
    Note,
    FormSummary,
    GeneralNote,
}

/// One line of the report as shown on screen, printed, or exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionKey>,
    pub label: String,
    pub kind: RowKind,
    pub value: String,
}

/// Projects report state into display rows.
///
/// Per question in registry order: the question row, then its note row
/// (note branch, answered `DA`) or its form summary row (form branch,
/// answered `DA`, payload committed). The general note and the reviewer
/// note always close the list, in that order.
pub fn project(report: &Report, registry: &QuestionRegistry, detail: SummaryDetail) -> Vec<DisplayRow> {
    let mut rows = Vec::with_capacity(registry.len() + 2);

    for question in registry {
        let key = question.key;
        let answer = report.answer(key);
        rows.push(DisplayRow {
            question: Some(key),
            label: question.label.to_string(),
            kind: RowKind::Question,
            value: answer.label().to_string(),
        });

        if !answer.is_yes() {
            continue;
        }

        match question.branch {
            BranchKind::NoteRequired => rows.push(DisplayRow {
                question: Some(key),
                label: NOTE_LABEL.to_string(),
                kind: RowKind::Note,
                value: report.note(key).to_string(),
            }),
            BranchKind::FormRequired(form) => {
                if let Some(payload) = report.form_payload(key) {
                    let value = match detail {
                        SummaryDetail::Full => payload.summary(),
                        SummaryDetail::Placeholder => FORM_PLACEHOLDER.to_string(),
                    };
                    rows.push(DisplayRow {
                        question: Some(key),
                        label: form.title().to_string(),
                        kind: RowKind::FormSummary,
                        value,
                    });
                }
            }
        }
    }

    rows.push(general_row(GENERAL_NOTE_LABEL, report.general_note()));
    rows.push(general_row(REVIEWER_NOTE_LABEL, report.reviewer_note()));
    rows
}

fn general_row(label: &str, value: &str) -> DisplayRow {
    DisplayRow {
        question: None,
        label: label.to_string(),
        kind: RowKind::GeneralNote,
        value: value.to_string(),
    }
}
