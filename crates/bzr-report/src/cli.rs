use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;

use crate::cmd::{
    self,
    edit::{AnswerArgs, FormArgs, GeneralNoteArgs, NoteArgs, ResponsibleArgs},
    finalize::{ExportArgs, PrintArgs, ReviewArgs, SaveArgs},
    inspect::{RowsArgs, ValidateArgs},
    new::NewArgs,
};
use crate::config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "bzr-report",
    about = "Fill in, validate and export daily occupational-safety reports",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Configuration file (defaults to ./bzr-report.toml when present)
    #[arg(long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log mutations and branch decisions to stderr
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty draft report for a company
    New(NewArgs),
    /// Answer a question with DA, NE or unset
    Answer(AnswerArgs),
    /// Set the explanation of a question answered DA
    Note(NoteArgs),
    /// Complete the sub-form of a question answered DA
    Form(FormArgs),
    /// Set the general note
    GeneralNote(GeneralNoteArgs),
    /// Set the responsible person
    Responsible(ResponsibleArgs),
    /// List the display rows
    Rows(RowsArgs),
    /// Check the report for completeness
    Validate(ValidateArgs),
    /// Validate and mark the report as saved
    Save(SaveArgs),
    /// Record a review of a saved report
    Review(ReviewArgs),
    /// Render the printable HTML document
    Print(PrintArgs),
    /// Export the report as a PDF file
    Export(ExportArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load(cli.config.as_deref())?;
    run(cli.command, &config)
}

fn run(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::New(args) => cmd::new::run(args, config),
        Commands::Answer(args) => cmd::edit::answer(args),
        Commands::Note(args) => cmd::edit::note(args),
        Commands::Form(args) => cmd::edit::form(args),
        Commands::GeneralNote(args) => cmd::edit::general_note(args),
        Commands::Responsible(args) => cmd::edit::responsible(args),
        Commands::Rows(args) => cmd::inspect::rows(args),
        Commands::Validate(args) => cmd::inspect::validate(args),
        Commands::Save(args) => cmd::finalize::save(args),
        Commands::Review(args) => cmd::finalize::review(args),
        Commands::Print(args) => cmd::finalize::print(args),
        Commands::Export(args) => cmd::finalize::export(args, config),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from([
            "bzr-report",
            "answer",
            "report.json",
            "opasneMaterije",
            "da",
            "--config",
            "custom.toml",
            "-vv",
        ])
        .expect("parse");
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Commands::Answer(args) => {
                assert_eq!(args.key, report_spec::QuestionKey::OpasneMaterije);
                assert_eq!(args.answer, report_spec::Answer::Yes);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_question_key_is_a_parse_error() {
        let err = Cli::try_parse_from(["bzr-report", "answer", "report.json", "nepoznato", "da"])
            .expect_err("unknown key");
        assert!(err.to_string().contains("nepoznato"));
    }

    #[test]
    fn general_note_uses_kebab_case_name() {
        let cli = Cli::try_parse_from(["bzr-report", "general-note", "report.json", "Bez primedbi"])
            .expect("parse");
        assert!(matches!(cli.command, Commands::GeneralNote(_)));
    }
}
