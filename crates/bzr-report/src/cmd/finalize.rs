use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use report_document::{PdfExporter, PrintRenderer};
use report_spec::{ReportAction, ViewerRole};

use crate::cmd::open_session;
use crate::config::Config;
use crate::store::FileSink;

#[derive(Args, Debug, Clone)]
pub struct SaveArgs {
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,
    #[arg(long = "role", default_value = "author")]
    pub role: ViewerRole,
}

#[derive(Args, Debug, Clone)]
pub struct ReviewArgs {
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,
    /// Reviewer note to record
    #[arg(long = "note", value_name = "TEXT")]
    pub note: Option<String>,
    /// Clear the reviewed flag instead of setting it
    #[arg(long = "unreviewed")]
    pub unreviewed: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PrintArgs {
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,
    #[arg(long = "role", default_value = "author")]
    pub role: ViewerRole,
    /// Write the HTML here instead of stdout
    #[arg(long = "out", value_name = "report.html")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,
    #[arg(long = "role", default_value = "author")]
    pub role: ViewerRole,
    /// Output directory (defaults to [export] output_dir)
    #[arg(long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

pub fn save(args: SaveArgs) -> Result<()> {
    let mut session = open_session(&args.report, args.role)?;
    session.save(&mut FileSink::new(&args.report))?;
    println!("saved {}", args.report.display());
    Ok(())
}

pub fn review(args: ReviewArgs) -> Result<()> {
    let mut session = open_session(&args.report, ViewerRole::Reviewer)?;
    session.set_reviewed(!args.unreviewed)?;
    if let Some(note) = args.note {
        session.set_reviewer_note(note)?;
    }
    session.save(&mut FileSink::new(&args.report))?;
    println!(
        "review recorded for {} ({})",
        args.report.display(),
        if session.report().is_reviewed() { "reviewed" } else { "not reviewed" }
    );
    Ok(())
}

pub fn print(args: PrintArgs) -> Result<()> {
    let session = open_session(&args.report, args.role)?;
    let finalized = session.finalize(ReportAction::Print)?;
    let document = PrintRenderer::new()?.render(&finalized)?;
    match args.out {
        Some(path) => {
            fs::write(&path, document.html)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "print document written");
            println!("{}", path.display());
        }
        None => print!("{}", document.html),
    }
    Ok(())
}

pub fn export(args: ExportArgs, config: &Config) -> Result<()> {
    let session = open_session(&args.report, args.role)?;
    let finalized = session.finalize(ReportAction::Export)?;
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| config.export.output_dir.clone());
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let path = PdfExporter::new().export(&finalized, &out_dir)?;
    println!("{}", path.display());
    Ok(())
}
