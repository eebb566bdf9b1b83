use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use report_spec::Report;

use crate::config::Config;
use crate::store;

#[derive(Args, Debug, Clone)]
pub struct NewArgs {
    /// Company id from the configured directory
    #[arg(long = "company", value_name = "ID")]
    pub company: String,
    /// Report date, YYYY-MM-DD (defaults to today, UTC)
    #[arg(long = "date", value_name = "DATE", value_parser = parse_date)]
    pub date: Option<Date>,
    /// Report file to create
    #[arg(long = "out", value_name = "report.json", default_value = "report.json")]
    pub out: PathBuf,
    /// Overwrite an existing report file
    #[arg(long = "force")]
    pub force: bool,
}

pub fn run(args: NewArgs, config: &Config) -> Result<()> {
    if args.out.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            args.out.display()
        );
    }
    let company = config.company(&args.company)?;
    let date = args
        .date
        .unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let report = Report::create(&company, date);
    store::write_report(&args.out, &report)?;
    println!(
        "created {} for {} ({})",
        args.out.display(),
        company.name,
        date
    );
    Ok(())
}

pub(crate) fn parse_date(raw: &str) -> Result<Date, String> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_iso_dates_only() {
        assert_eq!(parse_date("2024-05-14"), Ok(date!(2024 - 05 - 14)));
        assert!(parse_date("14.05.2024.").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }
}
