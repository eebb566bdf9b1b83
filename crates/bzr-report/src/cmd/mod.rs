use std::path::Path;

use anyhow::Result;

use report_spec::{ReportSession, ViewerRole};

use crate::store;

pub mod edit;
pub mod finalize;
pub mod inspect;
pub mod new;

pub(crate) fn open_session(path: &Path, role: ViewerRole) -> Result<ReportSession> {
    let report = store::load_report(path)?;
    Ok(ReportSession::new(report, role))
}
