use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use report_spec::{
    Answer, BranchIntent, FormPayload, QuestionKey, ReportSession, SessionError, ViewerRole,
};

use crate::cmd::open_session;
use crate::store;

#[derive(Args, Debug, Clone)]
pub struct AnswerArgs {
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,
    #[arg(value_name = "QUESTION")]
    pub key: QuestionKey,
    /// da, ne or unset
    #[arg(value_name = "ANSWER")]
    pub answer: Answer,
    #[arg(long = "role", default_value = "author")]
    pub role: ViewerRole,
}

#[derive(Args, Debug, Clone)]
pub struct NoteArgs {
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,
    #[arg(value_name = "QUESTION")]
    pub key: QuestionKey,
    #[arg(value_name = "TEXT")]
    pub text: String,
    #[arg(long = "role", default_value = "author")]
    pub role: ViewerRole,
}

#[derive(Args, Debug, Clone)]
pub struct FormArgs {
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,
    #[arg(value_name = "QUESTION")]
    pub key: QuestionKey,
    /// JSON object or list of {label, value} entries; `-` reads stdin
    #[arg(long = "payload", value_name = "payload.json")]
    pub payload: PathBuf,
    #[arg(long = "role", default_value = "author")]
    pub role: ViewerRole,
}

#[derive(Args, Debug, Clone)]
pub struct GeneralNoteArgs {
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,
    #[arg(value_name = "TEXT")]
    pub text: String,
    #[arg(long = "role", default_value = "author")]
    pub role: ViewerRole,
}

#[derive(Args, Debug, Clone)]
pub struct ResponsibleArgs {
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,
    #[arg(value_name = "NAME")]
    pub name: String,
    #[arg(long = "role", default_value = "author")]
    pub role: ViewerRole,
}

pub fn answer(args: AnswerArgs) -> Result<()> {
    let mut session = open_session(&args.report, args.role)?;
    let intent = session.set_answer(args.key, args.answer)?;
    store::write_report(&args.report, session.report())?;
    println!("{}", describe_intent(args.key, args.answer, intent));
    Ok(())
}

pub fn note(args: NoteArgs) -> Result<()> {
    edit(&args.report, args.role, |session| {
        session.set_note(args.key, args.text.clone())
    })
}

/// Opens the question's sub-form and commits the payload in one step.
pub fn form(args: FormArgs) -> Result<()> {
    let value = read_payload(&args.payload)?;
    let payload = FormPayload::from_json(&value)
        .with_context(|| format!("invalid sub-form payload {}", args.payload.display()))?;
    let mut session = open_session(&args.report, args.role)?;
    session.reopen_sub_form(args.key)?;
    session.commit_sub_form(payload)?;
    store::write_report(&args.report, session.report())?;
    println!("{}: sub-form saved", args.key);
    Ok(())
}

pub fn general_note(args: GeneralNoteArgs) -> Result<()> {
    edit(&args.report, args.role, |session| {
        session.set_general_note(args.text.clone())
    })
}

pub fn responsible(args: ResponsibleArgs) -> Result<()> {
    edit(&args.report, args.role, |session| {
        session.set_responsible_person(args.name.clone())
    })
}

fn edit<F>(path: &Path, role: ViewerRole, apply: F) -> Result<()>
where
    F: FnOnce(&mut ReportSession) -> Result<(), SessionError>,
{
    let mut session = open_session(path, role)?;
    apply(&mut session)?;
    store::write_report(path, session.report())
}

fn read_payload(path: &Path) -> Result<Value> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read payload from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read payload {}", path.display()))?
    };
    serde_json::from_str(&raw).context("payload is not valid JSON")
}

fn describe_intent(key: QuestionKey, answer: Answer, intent: BranchIntent) -> String {
    match intent {
        BranchIntent::None => format!("{key}: unchanged ({answer})"),
        BranchIntent::ShowNoteInput { .. } => {
            format!("{key}: DA, explanation required (bzr-report note)")
        }
        BranchIntent::OpenSubForm { form, .. } => {
            format!("{key}: DA, complete \"{}\" (bzr-report form)", form.title())
        }
        BranchIntent::Cleared { note, payload, .. } => {
            let mut message = format!("{key}: {answer}");
            if note {
                message.push_str(", explanation cleared");
            }
            if payload {
                message.push_str(", sub-form data cleared");
            }
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_spec::SubForm;

    #[test]
    fn cleared_intent_lists_what_was_dropped() {
        let text = describe_intent(
            QuestionKey::NoviZaposleni,
            Answer::No,
            BranchIntent::Cleared {
                key: QuestionKey::NoviZaposleni,
                note: false,
                payload: true,
            },
        );
        assert_eq!(text, "noviZaposleni: NE, sub-form data cleared");
    }

    #[test]
    fn form_intent_names_the_sub_form() {
        let text = describe_intent(
            QuestionKey::PovredaNaRadu,
            Answer::Yes,
            BranchIntent::OpenSubForm {
                key: QuestionKey::PovredaNaRadu,
                form: SubForm::Injury,
            },
        );
        assert!(text.contains(SubForm::Injury.title()));
    }
}
