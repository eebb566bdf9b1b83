#![allow(missing_docs)]

use thiserror::Error;

pub mod export;
pub mod format;
pub mod html;
pub mod pdf;

pub use export::{ExportError, ExportGuard, PdfExporter};
pub use format::{DOCUMENT_TITLE, DocumentLine, DocumentModel, HeaderFact};
pub use html::{PrintDocument, PrintRenderer};
pub use pdf::render_pdf;

/// Errors raised while turning a finalized report into a document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to format report date: {0}")]
    Date(#[from] time::error::Format),
    #[error("print template is invalid: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),
    #[error("failed to build template data: {0}")]
    Data(#[from] serde_json::Error),
    #[error("print template render error: {0}")]
    Html(#[from] handlebars::RenderError),
}
