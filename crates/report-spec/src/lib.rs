#![allow(missing_docs)]

pub mod answers;
pub mod branch;
pub mod company;
pub mod projection;
pub mod registry;
pub mod role;
pub mod session;
pub mod state;
pub mod validate;

pub use answers::{Answer, FormField, FormPayload, InvalidAnswer, PayloadError, QuestionMap};
pub use branch::{BranchIntent, BranchResolver, NoopSubFormHost, OpenSubForm, SubFormError, SubFormHost};
pub use company::{Company, CompanyDirectory, CompanyRef, InMemoryDirectory};
pub use projection::{DisplayRow, RowKind, project};
pub use registry::{
    BranchKind, QUESTION_COUNT, Question, QuestionKey, QuestionRegistry, SubForm, UnknownQuestion,
};
pub use role::{
    FieldOwner, RenderMode, ReportAction, ReportField, SummaryDetail, UnknownRole, ViewPolicy,
    ViewerRole,
};
pub use session::{
    ActionError, FinalizedReport, PersistError, ReportSession, ReportSink, SessionError,
};
pub use state::{AnswerChange, Report, ReportHeader, ReportStatus, StateError};
pub use validate::{ValidationReport, Violation, ViolationCode, validate};
