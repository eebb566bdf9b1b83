use serde::Serialize;
use thiserror::Error;
use time::Date;
use tracing::{debug, info, warn};

use crate::answers::{Answer, FormPayload};
use crate::branch::{BranchIntent, BranchResolver, NoopSubFormHost, OpenSubForm, SubFormError, SubFormHost};
use crate::projection::{DisplayRow, project};
use crate::registry::{QuestionKey, QuestionRegistry};
use crate::role::{ReportAction, ReportField, ViewPolicy, ViewerRole};
use crate::state::{Report, ReportHeader, ReportStatus, StateError};
use crate::validate::{ValidationReport, validate};

/// Error type handed back by persistence callbacks.
pub type PersistError = Box<dyn std::error::Error + Send + Sync>;

/// Persistence callback, invoked only with a validated report.
pub trait ReportSink {
    fn persist(&mut self, report: &Report) -> Result<(), PersistError>;
}

impl<F> ReportSink for F
where
    F: FnMut(&Report) -> Result<(), PersistError>,
{
    fn persist(&mut self, report: &Report) -> Result<(), PersistError> {
        self(report)
    }
}

/// Errors raised by interactive edits.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{role} may not edit the {field} of this report")]
    NotEditable { role: ViewerRole, field: ReportField },
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    SubForm(#[from] SubFormError),
}

/// Errors raised by save, print and export.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{action} is not permitted for {role} on a {status} report")]
    NotPermitted {
        action: ReportAction,
        role: ViewerRole,
        status: ReportStatus,
    },
    #[error("sub-form for {0} is still open; save or close it first")]
    SubFormPending(QuestionKey),
    #[error("report is incomplete:\n{0}")]
    Incomplete(ValidationReport),
    #[error("persistence callback failed: {0}")]
    Persist(#[source] PersistError),
}

impl ActionError {
    pub fn validation(&self) -> Option<&ValidationReport> {
        match self {
            ActionError::Incomplete(report) => Some(report),
            _ => None,
        }
    }
}

/// Validated snapshot of a report, the only input print and export accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalizedReport {
    header: ReportHeader,
    rows: Vec<DisplayRow>,
    reviewed: bool,
    action: ReportAction,
}

impl FinalizedReport {
    pub fn header(&self) -> &ReportHeader {
        &self.header
    }

    pub fn date(&self) -> Date {
        self.header.date
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn is_reviewed(&self) -> bool {
        self.reviewed
    }

    pub fn action(&self) -> ReportAction {
        self.action
    }
}

/// One report being viewed or edited by one role.
///
/// Every edit is checked against the role's view policy and re-derives the
/// display rows. Save, print and export all pass through `finalize`.
pub struct ReportSession {
    report: Report,
    registry: &'static QuestionRegistry,
    resolver: BranchResolver,
    policy: ViewPolicy,
    open_form: Option<OpenSubForm>,
    rows: Vec<DisplayRow>,
    host: Box<dyn SubFormHost>,
}

impl ReportSession {
    pub fn new(report: Report, role: ViewerRole) -> Self {
        let registry = QuestionRegistry::standard();
        let policy = ViewPolicy::for_viewer(role, report.status());
        let rows = project(&report, registry, policy.summary);
        Self {
            report,
            registry,
            resolver: BranchResolver::new(registry),
            policy,
            open_form: None,
            rows,
            host: Box::new(NoopSubFormHost),
        }
    }

    pub fn with_host(mut self, host: impl SubFormHost + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn into_report(self) -> Report {
        self.report
    }

    pub fn role(&self) -> ViewerRole {
        self.policy.role
    }

    pub fn policy(&self) -> &ViewPolicy {
        &self.policy
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn open_sub_form(&self) -> Option<&OpenSubForm> {
        self.open_form.as_ref()
    }

    pub fn validate(&self) -> ValidationReport {
        validate(&self.report, self.registry)
    }

    /// Sets an answer and acts on the resulting branch intent.
    ///
    /// A `DA` on a form question opens its sub-form; withdrawing the answer
    /// of the question whose sub-form is open closes it unsaved.
    pub fn set_answer(&mut self, key: QuestionKey, answer: Answer) -> Result<BranchIntent, SessionError> {
        self.ensure_editable(ReportField::Answer(key))?;
        if let Some(open) = self.open_form
            && open.key != key
            && answer.is_yes()
            && self.registry.get(key).branch.sub_form().is_some()
            && !self.report.answer(key).is_yes()
        {
            return Err(SubFormError::AlreadyOpen(open.key).into());
        }

        let change = self.report.set_answer(key, answer)?;
        let intent = self.resolver.resolve(&change);
        match intent {
            BranchIntent::OpenSubForm { key, form } => {
                let request = OpenSubForm { key, form };
                self.host.open(&request, self.report.form_payload(key));
                self.open_form = Some(request);
            }
            BranchIntent::Cleared { key, .. } => {
                if let Some(open) = self.open_form.filter(|open| open.key == key) {
                    self.host.close(&open);
                    self.open_form = None;
                    debug!(question = %key, "sub-form closed by answer change");
                }
            }
            BranchIntent::ShowNoteInput { .. } | BranchIntent::None => {}
        }
        self.refresh_rows();
        Ok(intent)
    }

    pub fn set_note(&mut self, key: QuestionKey, text: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_editable(ReportField::Note(key))?;
        self.report.set_note(key, text)?;
        self.refresh_rows();
        Ok(())
    }

    /// Re-opens the sub-form of a question answered `DA`, e.g. to review or
    /// replace its payload.
    pub fn reopen_sub_form(&mut self, key: QuestionKey) -> Result<(), SessionError> {
        self.ensure_editable(ReportField::SubForm(key))?;
        if let Some(open) = self.open_form {
            return Err(SubFormError::AlreadyOpen(open.key).into());
        }
        let request = self.resolver.sub_form_for(&self.report, key)?;
        self.host.open(&request, self.report.form_payload(key));
        self.open_form = Some(request);
        Ok(())
    }

    /// Sub-form save: commits the payload to the owning question and closes.
    pub fn commit_sub_form(&mut self, payload: FormPayload) -> Result<(), SessionError> {
        let open = self.open_form.ok_or(SubFormError::NotOpen)?;
        self.ensure_editable(ReportField::SubForm(open.key))?;
        self.resolver.commit(&mut self.report, &open, payload)?;
        self.host.close(&open);
        self.open_form = None;
        self.refresh_rows();
        Ok(())
    }

    /// Sub-form close without save. Leaves the question incomplete.
    pub fn cancel_sub_form(&mut self) -> Result<(), SessionError> {
        let open = self.open_form.take().ok_or(SubFormError::NotOpen)?;
        self.host.close(&open);
        debug!(question = %open.key, "sub-form closed without saving");
        Ok(())
    }

    pub fn set_general_note(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_editable(ReportField::GeneralNote)?;
        self.report.set_general_note(text)?;
        self.refresh_rows();
        Ok(())
    }

    pub fn set_responsible_person(&mut self, name: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_editable(ReportField::ResponsiblePerson)?;
        self.report.set_responsible_person(name)?;
        self.refresh_rows();
        Ok(())
    }

    pub fn set_reviewer_note(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_editable(ReportField::ReviewerNote)?;
        self.report.set_reviewer_note(text);
        self.refresh_rows();
        Ok(())
    }

    pub fn set_reviewed(&mut self, reviewed: bool) -> Result<(), SessionError> {
        self.ensure_editable(ReportField::Reviewed)?;
        self.report.set_reviewed(reviewed);
        self.refresh_rows();
        Ok(())
    }

    /// Gate shared by save, print and export: role permission, no open
    /// sub-form, then validation against the latest committed state.
    pub fn finalize(&self, action: ReportAction) -> Result<FinalizedReport, ActionError> {
        if !self.policy.permits(action) {
            warn!(%action, role = %self.policy.role, "action refused by view policy");
            return Err(ActionError::NotPermitted {
                action,
                role: self.policy.role,
                status: self.report.status(),
            });
        }
        if let Some(open) = &self.open_form {
            warn!(%action, question = %open.key, "action refused while a sub-form is open");
            return Err(ActionError::SubFormPending(open.key));
        }
        let validation = self.validate();
        if !validation.is_valid() {
            warn!(%action, violations = validation.len(), "action refused by validation");
            return Err(ActionError::Incomplete(validation));
        }
        Ok(FinalizedReport {
            header: self.report.header().clone(),
            rows: self.rows.clone(),
            reviewed: self.report.is_reviewed(),
            action,
        })
    }

    /// Validates, hands the saved report to `sink`, and only then commits
    /// the saved status locally. A failing sink leaves the session untouched.
    pub fn save(&mut self, sink: &mut dyn ReportSink) -> Result<(), ActionError> {
        self.finalize(ReportAction::Save)?;
        let mut candidate = self.report.clone();
        candidate.mark_saved();
        sink.persist(&candidate).map_err(ActionError::Persist)?;
        self.report = candidate;
        self.policy = ViewPolicy::for_viewer(self.policy.role, self.report.status());
        self.refresh_rows();
        info!(report = %self.report.header().id, role = %self.policy.role, "report saved");
        Ok(())
    }

    fn ensure_editable(&self, field: ReportField) -> Result<(), SessionError> {
        if self.policy.is_editable(field) {
            return Ok(());
        }
        Err(SessionError::NotEditable {
            role: self.policy.role,
            field,
        })
    }

    fn refresh_rows(&mut self) {
        self.rows = project(&self.report, self.registry, self.policy.summary);
    }
}
