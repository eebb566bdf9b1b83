use std::fmt;

use serde::Serialize;

use crate::answers::Answer;
use crate::registry::{BranchKind, QuestionKey, QuestionRegistry};
use crate::state::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    MissingAnswer,
    FormNotCompleted,
    NoteNotProvided,
    MissingResponsiblePerson,
}

/// A single completeness failure, worded for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionKey>,
    pub code: ViolationCode,
    pub message: String,
}

/// Ordered violations; empty means the report may be finalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.violations
            .iter()
            .map(|violation| violation.message.as_str())
            .collect()
    }

    pub fn mentions(&self, key: QuestionKey, code: ViolationCode) -> bool {
        self.violations
            .iter()
            .any(|violation| violation.question == Some(key) && violation.code == code)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, violation) in self.violations.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            write!(f, "- {}", violation.message)?;
        }
        Ok(())
    }
}

/// Completeness check of `report` against the registry's branch rules.
pub fn validate(report: &Report, registry: &QuestionRegistry) -> ValidationReport {
    let mut violations = Vec::new();

    for question in registry {
        let key = question.key;
        let violation = match (report.answer(key), question.branch) {
            (Answer::Unset, _) => Some((
                ViolationCode::MissingAnswer,
                format!("missing: {}", question.label),
            )),
            (Answer::Yes, BranchKind::FormRequired(_)) if report.form_payload(key).is_none() => Some((
                ViolationCode::FormNotCompleted,
                format!("{} (form not completed)", question.label),
            )),
            (Answer::Yes, BranchKind::NoteRequired) if report.note(key).trim().is_empty() => Some((
                ViolationCode::NoteNotProvided,
                format!("{} (note not provided)", question.label),
            )),
            _ => None,
        };
        if let Some((code, message)) = violation {
            violations.push(Violation {
                question: Some(key),
                code,
                message,
            });
        }
    }

    if report.header().responsible_person.trim().is_empty() {
        violations.push(Violation {
            question: None,
            code: ViolationCode::MissingResponsiblePerson,
            message: "responsible person not provided".into(),
        });
    }

    ValidationReport { violations }
}
