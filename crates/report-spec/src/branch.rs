use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::answers::{Answer, FormPayload};
use crate::registry::{BranchKind, QuestionKey, QuestionRegistry, SubForm};
use crate::state::{AnswerChange, Report, StateError};

/// UI consequence of an answer change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum BranchIntent {
    None,
    ShowNoteInput { key: QuestionKey },
    OpenSubForm { key: QuestionKey, form: SubForm },
    Cleared { key: QuestionKey, note: bool, payload: bool },
}

/// A sub-form modal bound to the question that opened it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpenSubForm {
    pub key: QuestionKey,
    pub form: SubForm,
}

/// Contract of the external sub-form components.
///
/// The engine calls `open` when a modal must be shown and `close` once it
/// ends, whether the user saved or cancelled. Saved data comes back through
/// `ReportSession::commit_sub_form`.
pub trait SubFormHost {
    fn open(&mut self, request: &OpenSubForm, existing: Option<&FormPayload>);
    fn close(&mut self, request: &OpenSubForm);
}

/// Host for headless use; modals are tracked by the session only.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSubFormHost;

impl SubFormHost for NoopSubFormHost {
    fn open(&mut self, _request: &OpenSubForm, _existing: Option<&FormPayload>) {}

    fn close(&mut self, _request: &OpenSubForm) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubFormError {
    #[error("no sub-form is open")]
    NotOpen,
    #[error("sub-form for {0} is already open")]
    AlreadyOpen(QuestionKey),
    #[error("{key} does not open a sub-form while answered {answer}")]
    NotAvailable { key: QuestionKey, answer: Answer },
    #[error(transparent)]
    State(#[from] StateError),
}

/// Stateless branch policy over the question registry.
#[derive(Debug, Clone, Copy)]
pub struct BranchResolver {
    registry: &'static QuestionRegistry,
}

impl Default for BranchResolver {
    fn default() -> Self {
        Self::new(QuestionRegistry::standard())
    }
}

impl BranchResolver {
    pub fn new(registry: &'static QuestionRegistry) -> Self {
        Self { registry }
    }

    /// Dispatches an answer change on the question's branch kind.
    pub fn resolve(&self, change: &AnswerChange) -> BranchIntent {
        let key = change.key;
        let intent = if change.is_noop() {
            BranchIntent::None
        } else if change.current.is_yes() {
            match self.registry.get(key).branch {
                BranchKind::NoteRequired => BranchIntent::ShowNoteInput { key },
                BranchKind::FormRequired(form) => BranchIntent::OpenSubForm { key, form },
            }
        } else {
            BranchIntent::Cleared {
                key,
                note: change.cleared_note,
                payload: change.cleared_payload,
            }
        };
        debug!(question = %key, ?intent, "branch resolved");
        intent
    }

    /// Sub-form request for a question currently answered `DA`.
    pub fn sub_form_for(&self, report: &Report, key: QuestionKey) -> Result<OpenSubForm, SubFormError> {
        let answer = report.answer(key);
        match self.registry.get(key).branch.sub_form() {
            Some(form) if answer.is_yes() => Ok(OpenSubForm { key, form }),
            _ => Err(SubFormError::NotAvailable { key, answer }),
        }
    }

    /// Applies a sub-form save: the payload lands on the owning question.
    pub fn commit(
        &self,
        report: &mut Report,
        open: &OpenSubForm,
        payload: FormPayload,
    ) -> Result<(), SubFormError> {
        report.set_form_payload(open.key, payload)?;
        Ok(())
    }
}
