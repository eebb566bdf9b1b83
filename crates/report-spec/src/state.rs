use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::answers::{Answer, FormPayload, QuestionMap};
use crate::company::{Company, CompanyRef};
use crate::registry::{BranchKind, QuestionKey, QuestionRegistry};

time::serde::format_description!(report_date, Date, "[year]-[month]-[day]");

/// Lifecycle of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[default]
    Draft,
    Saved,
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ReportStatus::Draft => "draft",
            ReportStatus::Saved => "saved",
        })
    }
}

/// Header metadata stamped when the report is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub id: Uuid,
    pub company: CompanyRef,
    #[serde(with = "report_date")]
    pub date: Date,
    #[serde(default)]
    pub author_contact: String,
    #[serde(default)]
    pub responsible_person: String,
}

/// Errors raised by state mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("report is saved; {0} can no longer be edited")]
    Frozen(&'static str),
    #[error("{key}: dependent data requires answer DA (current: {answer})")]
    AnswerNotYes { key: QuestionKey, answer: Answer },
    #[error("{0}: question requires a sub-form, not a note")]
    NoteNotAccepted(QuestionKey),
    #[error("{0}: question requires a note, not a sub-form")]
    FormNotAccepted(QuestionKey),
}

/// Outcome of `Report::set_answer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerChange {
    pub key: QuestionKey,
    pub previous: Answer,
    pub current: Answer,
    pub cleared_note: bool,
    pub cleared_payload: bool,
}

impl AnswerChange {
    pub fn is_noop(&self) -> bool {
        self.previous == self.current
    }
}

/// A daily report in progress or saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ReportRecord")]
pub struct Report {
    header: ReportHeader,
    answers: QuestionMap<Answer>,
    notes: QuestionMap<String>,
    form_payloads: QuestionMap<Option<FormPayload>>,
    general_note: String,
    reviewer_note: String,
    reviewed: bool,
    status: ReportStatus,
}

impl Report {
    /// Empty draft for `company`, header pre-filled from the directory record.
    pub fn create(company: &Company, date: Date) -> Self {
        let header = ReportHeader {
            id: Uuid::new_v4(),
            company: CompanyRef::from(company),
            date,
            author_contact: company.contact.clone().unwrap_or_default(),
            responsible_person: company.responsible_person.clone().unwrap_or_default(),
        };
        debug!(report = %header.id, company = %header.company.id, "created daily report");
        Self {
            header,
            answers: QuestionMap::default(),
            notes: QuestionMap::default(),
            form_payloads: QuestionMap::default(),
            general_note: String::new(),
            reviewer_note: String::new(),
            reviewed: false,
            status: ReportStatus::Draft,
        }
    }

    pub fn header(&self) -> &ReportHeader {
        &self.header
    }

    pub fn status(&self) -> ReportStatus {
        self.status
    }

    pub fn is_saved(&self) -> bool {
        self.status == ReportStatus::Saved
    }

    pub fn answers(&self) -> &QuestionMap<Answer> {
        &self.answers
    }

    pub fn answer(&self, key: QuestionKey) -> Answer {
        self.answers[key]
    }

    pub fn note(&self, key: QuestionKey) -> &str {
        &self.notes[key]
    }

    pub fn form_payload(&self, key: QuestionKey) -> Option<&FormPayload> {
        self.form_payloads[key].as_ref()
    }

    pub fn general_note(&self) -> &str {
        &self.general_note
    }

    pub fn reviewer_note(&self) -> &str {
        &self.reviewer_note
    }

    pub fn is_reviewed(&self) -> bool {
        self.reviewed
    }

    /// Sets an answer. Withdrawing a `DA` (to `NE` or unset) discards the
    /// note and sub-form payload of that question.
    pub fn set_answer(&mut self, key: QuestionKey, answer: Answer) -> Result<AnswerChange, StateError> {
        self.ensure_draft("answers")?;
        let previous = std::mem::replace(&mut self.answers[key], answer);
        let mut change = AnswerChange {
            key,
            previous,
            current: answer,
            cleared_note: false,
            cleared_payload: false,
        };
        if !answer.is_yes() {
            change.cleared_note = !std::mem::take(&mut self.notes[key]).is_empty();
            change.cleared_payload = self.form_payloads[key].take().is_some();
        }
        debug!(
            question = %key,
            previous = %previous,
            current = %answer,
            cleared_note = change.cleared_note,
            cleared_payload = change.cleared_payload,
            "answer updated"
        );
        Ok(change)
    }

    pub fn set_note(&mut self, key: QuestionKey, text: impl Into<String>) -> Result<(), StateError> {
        self.ensure_draft("notes")?;
        self.ensure_dependent(key)?;
        if !branch_of(key).takes_note() {
            return Err(StateError::NoteNotAccepted(key));
        }
        self.notes[key] = text.into();
        debug!(question = %key, "note updated");
        Ok(())
    }

    /// Stores a payload committed by a sub-form.
    pub fn set_form_payload(&mut self, key: QuestionKey, payload: FormPayload) -> Result<(), StateError> {
        self.ensure_draft("sub-form payloads")?;
        self.ensure_dependent(key)?;
        if branch_of(key).sub_form().is_none() {
            return Err(StateError::FormNotAccepted(key));
        }
        self.form_payloads[key] = Some(payload);
        debug!(question = %key, "sub-form payload committed");
        Ok(())
    }

    pub fn set_general_note(&mut self, text: impl Into<String>) -> Result<(), StateError> {
        self.ensure_draft("the general note")?;
        self.general_note = text.into();
        Ok(())
    }

    pub fn set_responsible_person(&mut self, name: impl Into<String>) -> Result<(), StateError> {
        self.ensure_draft("the responsible person")?;
        self.header.responsible_person = name.into();
        Ok(())
    }

    /// Reviewer-owned; never frozen by the save lifecycle.
    pub(crate) fn set_reviewer_note(&mut self, text: impl Into<String>) {
        self.reviewer_note = text.into();
    }

    /// Reviewer-owned; never frozen by the save lifecycle.
    pub(crate) fn set_reviewed(&mut self, reviewed: bool) {
        self.reviewed = reviewed;
    }

    pub(crate) fn mark_saved(&mut self) {
        self.status = ReportStatus::Saved;
    }

    fn ensure_draft(&self, field: &'static str) -> Result<(), StateError> {
        if self.is_saved() {
            return Err(StateError::Frozen(field));
        }
        Ok(())
    }

    fn ensure_dependent(&self, key: QuestionKey) -> Result<(), StateError> {
        let answer = self.answers[key];
        if !answer.is_yes() {
            return Err(StateError::AnswerNotYes { key, answer });
        }
        Ok(())
    }
}

fn branch_of(key: QuestionKey) -> BranchKind {
    QuestionRegistry::standard().get(key).branch
}

/// Wire shape of a report. Converting into `Report` drops dependent data
/// that the answers or branch kinds do not back.
#[derive(Debug, Deserialize)]
struct ReportRecord {
    header: ReportHeader,
    #[serde(default)]
    answers: QuestionMap<Answer>,
    #[serde(default)]
    notes: QuestionMap<String>,
    #[serde(default)]
    form_payloads: QuestionMap<Option<FormPayload>>,
    #[serde(default)]
    general_note: String,
    #[serde(default)]
    reviewer_note: String,
    #[serde(default)]
    reviewed: bool,
    #[serde(default)]
    status: ReportStatus,
}

impl From<ReportRecord> for Report {
    fn from(mut record: ReportRecord) -> Self {
        for question in QuestionRegistry::standard() {
            let key = question.key;
            let yes = record.answers[key].is_yes();
            if (!yes || !question.branch.takes_note()) && !record.notes[key].is_empty() {
                warn!(question = %key, "dropping note not backed by the answer");
                record.notes[key].clear();
            }
            if (!yes || question.branch.sub_form().is_none())
                && record.form_payloads[key].take().is_some()
            {
                warn!(question = %key, "dropping sub-form payload not backed by the answer");
            }
        }
        Self {
            header: record.header,
            answers: record.answers,
            notes: record.notes,
            form_payloads: record.form_payloads,
            general_note: record.general_note,
            reviewer_note: record.reviewer_note,
            reviewed: record.reviewed,
            status: record.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    fn company() -> Company {
        Company {
            id: "c-1".into(),
            name: "Universal Logistics".into(),
            contact: Some("office@ul.example".into()),
            responsible_person: Some("Marko Marković".into()),
        }
    }

    #[test]
    fn header_is_stamped_from_company() {
        let report = Report::create(&company(), date!(2024 - 05 - 14));
        assert_eq!(report.header().company.name, "Universal Logistics");
        assert_eq!(report.header().author_contact, "office@ul.example");
        assert_eq!(report.header().responsible_person, "Marko Marković");
        assert_eq!(report.status(), ReportStatus::Draft);
    }

    #[test]
    fn date_serializes_as_iso_day() {
        let report = Report::create(&company(), date!(2024 - 05 - 14));
        let value = serde_json::to_value(&report).expect("serialize");
        assert_eq!(value["header"]["date"], json!("2024-05-14"));
    }

    #[test]
    fn deserializing_drops_orphaned_dependents() {
        let report = Report::create(&company(), date!(2024 - 05 - 14));
        let mut value = serde_json::to_value(&report).expect("serialize");
        value["notes"]["opasneMaterije"] = json!("orphan");
        value["form_payloads"]["povredaNaRadu"] = json!([{ "label": "x", "value": 1 }]);
        let restored: Report = serde_json::from_value(value).expect("deserialize");
        assert_eq!(restored.note(QuestionKey::OpasneMaterije), "");
        assert!(restored.form_payload(QuestionKey::PovredaNaRadu).is_none());
    }
}
