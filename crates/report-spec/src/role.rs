use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::QuestionKey;
use crate::state::ReportStatus;

/// Who is looking at the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerRole {
    /// Regular user filling in the report.
    Author,
    /// Admin or super-admin.
    Reviewer,
    /// The company the report is about ("komitent").
    Client,
}

impl ViewerRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewerRole::Author => "author",
            ViewerRole::Reviewer => "reviewer",
            ViewerRole::Client => "client",
        }
    }
}

impl fmt::Display for ViewerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for ViewerRole {
    type Err = UnknownRole;

    /// Accepts the directory role names as well as the engine's own.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "user" | "author" => Ok(ViewerRole::Author),
            "admin" | "super-admin" | "superadmin" | "reviewer" => Ok(ViewerRole::Reviewer),
            "komitent" | "client" => Ok(ViewerRole::Client),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Finalizing actions a view may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportAction {
    Save,
    Print,
    Export,
}

impl fmt::Display for ReportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportAction::Save => "save",
            ReportAction::Print => "print",
            ReportAction::Export => "export",
        })
    }
}

/// Editable surfaces of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "field", content = "question", rename_all = "snake_case")]
pub enum ReportField {
    Answer(QuestionKey),
    Note(QuestionKey),
    SubForm(QuestionKey),
    GeneralNote,
    ResponsiblePerson,
    ReviewerNote,
    Reviewed,
}

impl ReportField {
    pub fn owner(self) -> FieldOwner {
        match self {
            ReportField::ReviewerNote | ReportField::Reviewed => FieldOwner::Reviewer,
            _ => FieldOwner::Author,
        }
    }
}

impl fmt::Display for ReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportField::Answer(key) => write!(f, "answer {key}"),
            ReportField::Note(key) => write!(f, "note {key}"),
            ReportField::SubForm(key) => write!(f, "sub-form {key}"),
            ReportField::GeneralNote => f.write_str("general note"),
            ReportField::ResponsiblePerson => f.write_str("responsible person"),
            ReportField::ReviewerNote => f.write_str("reviewer note"),
            ReportField::Reviewed => f.write_str("reviewed flag"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOwner {
    Author,
    Reviewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Dropdowns, note inputs and sub-form triggers are live.
    Editable,
    /// Read-only except the reviewer-owned fields.
    ReviewOnly,
    ReadOnly,
}

/// How sub-form payloads appear in projected rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryDetail {
    Full,
    Placeholder,
}

/// Presentation decisions for one role looking at a report in one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewPolicy {
    pub role: ViewerRole,
    pub mode: RenderMode,
    pub summary: SummaryDetail,
    actions: &'static [ReportAction],
}

const ALL_ACTIONS: &[ReportAction] = &[ReportAction::Save, ReportAction::Print, ReportAction::Export];
const OUTPUT_ACTIONS: &[ReportAction] = &[ReportAction::Print, ReportAction::Export];
const NO_ACTIONS: &[ReportAction] = &[];

impl ViewPolicy {
    pub fn for_viewer(role: ViewerRole, status: ReportStatus) -> Self {
        let (mode, actions) = match (role, status) {
            (ViewerRole::Author, ReportStatus::Draft) => (RenderMode::Editable, ALL_ACTIONS),
            (ViewerRole::Author, ReportStatus::Saved) => (RenderMode::ReadOnly, OUTPUT_ACTIONS),
            (ViewerRole::Reviewer, ReportStatus::Saved) => (RenderMode::ReviewOnly, ALL_ACTIONS),
            (ViewerRole::Reviewer, ReportStatus::Draft) => (RenderMode::ReadOnly, NO_ACTIONS),
            (ViewerRole::Client, _) => (RenderMode::ReadOnly, OUTPUT_ACTIONS),
        };
        let summary = match role {
            ViewerRole::Client => SummaryDetail::Full,
            ViewerRole::Author | ViewerRole::Reviewer => SummaryDetail::Placeholder,
        };
        Self {
            role,
            mode,
            summary,
            actions,
        }
    }

    pub fn actions(&self) -> &'static [ReportAction] {
        self.actions
    }

    pub fn permits(&self, action: ReportAction) -> bool {
        self.actions.contains(&action)
    }

    pub fn is_editable(&self, field: ReportField) -> bool {
        match (self.mode, field.owner()) {
            (RenderMode::Editable, FieldOwner::Author) => true,
            (RenderMode::ReviewOnly, FieldOwner::Reviewer) => true,
            _ => false,
        }
    }
}
