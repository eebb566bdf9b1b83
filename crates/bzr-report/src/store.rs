use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use report_spec::{PersistError, Report, ReportSink};

pub fn load_report(path: &Path) -> Result<Report> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read report {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid report file {}", path.display()))
}

/// Replaces the report file atomically (temp file in the same directory,
/// renamed over the target).
pub fn write_report(path: &Path, report: &Report) -> Result<()> {
    let json = serde_json::to_vec_pretty(report).context("failed to serialize report")?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut staging = tempfile::NamedTempFile::new_in(&dir)
        .with_context(|| format!("failed to stage report in {}", dir.display()))?;
    staging.write_all(&json)?;
    staging.write_all(b"\n")?;
    staging
        .persist(path)
        .with_context(|| format!("failed to write report {}", path.display()))?;
    debug!(path = %path.display(), "report written");
    Ok(())
}

/// Persistence callback that writes saved reports back to their file.
pub struct FileSink<'a> {
    path: &'a Path,
}

impl<'a> FileSink<'a> {
    pub fn new(path: &'a Path) -> Self {
        Self { path }
    }
}

impl ReportSink for FileSink<'_> {
    fn persist(&mut self, report: &Report) -> Result<(), PersistError> {
        write_report(self.path, report).map_err(Into::into)
    }
}
