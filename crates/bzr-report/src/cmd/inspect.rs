use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;

use report_spec::{DisplayRow, RowKind, ViewerRole};

use crate::cmd::open_session;

#[derive(Args, Debug, Clone)]
pub struct RowsArgs {
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,
    #[arg(long = "role", default_value = "author")]
    pub role: ViewerRole,
    /// Emit the rows as JSON
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,
    /// Emit the violations as JSON
    #[arg(long = "json")]
    pub json: bool,
}

pub fn rows(args: RowsArgs) -> Result<()> {
    let session = open_session(&args.report, args.role)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(session.rows())?);
        return Ok(());
    }
    for row in session.rows() {
        println!("{}", format_row(row));
    }
    Ok(())
}

/// Prints the violations and fails when the report is incomplete.
pub fn validate(args: ValidateArgs) -> Result<()> {
    let session = open_session(&args.report, ViewerRole::Author)?;
    let result = session.validate();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.is_valid() {
        println!("report is complete");
    } else {
        println!("{result}");
    }
    if !result.is_valid() {
        bail!("report is incomplete ({} issue(s))", result.len());
    }
    Ok(())
}

fn format_row(row: &DisplayRow) -> String {
    let value = if row.value.is_empty() { "-" } else { row.value.as_str() };
    match row.kind {
        RowKind::Question => format!("{:<70} {}", row.label, value),
        RowKind::Note | RowKind::FormSummary => format!("    {}: {}", row.label, value),
        RowKind::GeneralNote => format!("{}: {}", row.label, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependent_rows_are_indented() {
        let row = DisplayRow {
            question: None,
            label: "Obrazloženje".into(),
            kind: RowKind::Note,
            value: String::new(),
        };
        assert_eq!(format_row(&row), "    Obrazloženje: -");
    }
}
