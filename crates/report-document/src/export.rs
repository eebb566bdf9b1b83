use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, warn};

use report_spec::FinalizedReport;

use crate::RenderError;
use crate::format::DocumentModel;
use crate::pdf::render_pdf;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("an export is already in progress")]
    InProgress,
    #[error("failed to stage export in {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Held for the duration of one export; dropping it frees the exporter.
#[derive(Debug)]
pub struct ExportGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// PDF exporter allowing a single export in flight.
#[derive(Debug, Default)]
pub struct PdfExporter {
    in_flight: AtomicBool,
}

impl PdfExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claims the exporter, or fails fast when another export holds it.
    pub fn try_begin(&self) -> Result<ExportGuard<'_>, ExportError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::InProgress)?;
        Ok(ExportGuard {
            flag: &self.in_flight,
        })
    }

    /// Writes `Dnevni_izvestaj_{date}.pdf` into `out_dir` and returns its path.
    ///
    /// The PDF is staged in a temporary file next to the target and renamed
    /// into place once complete. On any failure the staging file is removed
    /// and no file appears under the target name.
    pub fn export(&self, report: &FinalizedReport, out_dir: &Path) -> Result<PathBuf, ExportError> {
        let _guard = self.try_begin()?;
        let result = write_export(report, out_dir);
        match &result {
            Ok(path) => info!(report = %report.header().id, path = %path.display(), "report exported"),
            Err(err) => warn!(report = %report.header().id, error = %err, "export failed"),
        }
        result
    }
}

fn write_export(report: &FinalizedReport, out_dir: &Path) -> Result<PathBuf, ExportError> {
    let model = DocumentModel::build(report)?;
    let bytes = render_pdf(&model);
    let target = out_dir.join(&model.file_name);

    let staging_err = |source| ExportError::Io {
        path: out_dir.to_path_buf(),
        source,
    };
    let mut staging = tempfile::Builder::new()
        .prefix(".dnevni_izvestaj")
        .suffix(".pdf.part")
        .tempfile_in(out_dir)
        .map_err(staging_err)?;
    staging.write_all(&bytes).map_err(staging_err)?;
    staging.as_file().sync_all().map_err(staging_err)?;
    persist(staging, &target)?;
    Ok(target)
}

fn persist(staging: NamedTempFile, target: &Path) -> Result<(), ExportError> {
    staging
        .persist(target)
        .map(|_| ())
        .map_err(|err| ExportError::Persist {
            path: target.to_path_buf(),
            source: err.error,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_releases_on_drop() {
        let exporter = PdfExporter::new();
        let guard = exporter.try_begin().expect("first claim");
        assert!(exporter.is_busy());
        assert!(matches!(exporter.try_begin(), Err(ExportError::InProgress)));
        drop(guard);
        assert!(!exporter.is_busy());
        assert!(exporter.try_begin().is_ok());
    }
}
