use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of questions in the daily report catalog.
pub const QUESTION_COUNT: usize = 11;

/// Closed set of question keys. Declaration order is registry order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum QuestionKey {
    NoviZaposleni,
    RasporedjivanjeNaDrugePoslove,
    NovaSredstvaZaRad,
    PovredaNaRadu,
    StazeZaKomunikacijuBezbedne,
    LicnaZastitnaSredstva,
    IspravnostOpremeZaRad,
    OpasneMaterije,
    ProtivpozarnaZastita,
    Elektroinstalacije,
    InspekcijskiNadzor,
}

impl QuestionKey {
    pub const ALL: [QuestionKey; QUESTION_COUNT] = [
        QuestionKey::NoviZaposleni,
        QuestionKey::RasporedjivanjeNaDrugePoslove,
        QuestionKey::NovaSredstvaZaRad,
        QuestionKey::PovredaNaRadu,
        QuestionKey::StazeZaKomunikacijuBezbedne,
        QuestionKey::LicnaZastitnaSredstva,
        QuestionKey::IspravnostOpremeZaRad,
        QuestionKey::OpasneMaterije,
        QuestionKey::ProtivpozarnaZastita,
        QuestionKey::Elektroinstalacije,
        QuestionKey::InspekcijskiNadzor,
    ];

    /// Wire name of the key, identical to its serde form.
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKey::NoviZaposleni => "noviZaposleni",
            QuestionKey::RasporedjivanjeNaDrugePoslove => "rasporedjivanjeNaDrugePoslove",
            QuestionKey::NovaSredstvaZaRad => "novaSredstvaZaRad",
            QuestionKey::PovredaNaRadu => "povredaNaRadu",
            QuestionKey::StazeZaKomunikacijuBezbedne => "stazeZaKomunikacijuBezbedne",
            QuestionKey::LicnaZastitnaSredstva => "licnaZastitnaSredstva",
            QuestionKey::IspravnostOpremeZaRad => "ispravnostOpremeZaRad",
            QuestionKey::OpasneMaterije => "opasneMaterije",
            QuestionKey::ProtivpozarnaZastita => "protivpozarnaZastita",
            QuestionKey::Elektroinstalacije => "elektroinstalacije",
            QuestionKey::InspekcijskiNadzor => "inspekcijskiNadzor",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when an external key string does not name a registry question.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown question key '{0}'")]
pub struct UnknownQuestion(pub String);

impl FromStr for QuestionKey {
    type Err = UnknownQuestion;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        QuestionKey::ALL
            .into_iter()
            .find(|key| key.as_str() == trimmed)
            .ok_or_else(|| UnknownQuestion(trimmed.to_string()))
    }
}

/// External sub-forms a question can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubForm {
    /// Engagement of new staff or reassignment to other duties.
    Engagement,
    Equipment,
    Injury,
}

impl SubForm {
    pub fn title(self) -> &'static str {
        match self {
            SubForm::Engagement => "Obrazac angažovanja / raspoređivanja",
            SubForm::Equipment => "Obrazac sredstava za rad",
            SubForm::Injury => "Obrazac povrede na radu",
        }
    }
}

/// What a `true` answer demands before the report can be finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "form", rename_all = "snake_case")]
pub enum BranchKind {
    NoteRequired,
    FormRequired(SubForm),
}

impl BranchKind {
    pub fn sub_form(self) -> Option<SubForm> {
        match self {
            BranchKind::NoteRequired => None,
            BranchKind::FormRequired(form) => Some(form),
        }
    }

    pub fn takes_note(self) -> bool {
        matches!(self, BranchKind::NoteRequired)
    }
}

/// Definition of a single catalog question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub key: QuestionKey,
    pub label: &'static str,
    pub branch: BranchKind,
}

/// Ordered, immutable question catalog.
#[derive(Debug)]
pub struct QuestionRegistry {
    questions: Vec<Question>,
}

static STANDARD: Lazy<QuestionRegistry> = Lazy::new(QuestionRegistry::build_standard);

impl QuestionRegistry {
    /// The daily report catalog, built on first use.
    pub fn standard() -> &'static QuestionRegistry {
        &STANDARD
    }

    fn build_standard() -> Self {
        let questions = QuestionKey::ALL
            .into_iter()
            .map(|key| {
                let (label, branch) = definition(key);
                Question { key, label, branch }
            })
            .collect();
        Self { questions }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    pub fn get(&self, key: QuestionKey) -> &Question {
        &self.questions[key.index()]
    }

    /// Zero-based position of `key` in display order.
    pub fn position(&self, key: QuestionKey) -> usize {
        key.index()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl<'a> IntoIterator for &'a QuestionRegistry {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn definition(key: QuestionKey) -> (&'static str, BranchKind) {
    use BranchKind::{FormRequired, NoteRequired};

    match key {
        QuestionKey::NoviZaposleni => (
            "Da li je bilo angažovanja novih zaposlenih?",
            FormRequired(SubForm::Engagement),
        ),
        QuestionKey::RasporedjivanjeNaDrugePoslove => (
            "Da li je bilo raspoređivanja zaposlenih na druge poslove?",
            FormRequired(SubForm::Engagement),
        ),
        QuestionKey::NovaSredstvaZaRad => (
            "Da li su uvedena nova sredstva za rad?",
            FormRequired(SubForm::Equipment),
        ),
        QuestionKey::PovredaNaRadu => (
            "Da li je bilo povreda na radu?",
            FormRequired(SubForm::Injury),
        ),
        QuestionKey::StazeZaKomunikacijuBezbedne => (
            "Da li su staze za komunikaciju bezbedne?",
            NoteRequired,
        ),
        QuestionKey::LicnaZastitnaSredstva => (
            "Da li zaposleni koriste propisana lična zaštitna sredstva?",
            NoteRequired,
        ),
        QuestionKey::IspravnostOpremeZaRad => (
            "Da li je uočena neispravnost opreme za rad?",
            NoteRequired,
        ),
        QuestionKey::OpasneMaterije => (
            "Da li se radilo sa opasnim materijama?",
            NoteRequired,
        ),
        QuestionKey::ProtivpozarnaZastita => (
            "Da li su uočeni nedostaci u protivpožarnoj zaštiti?",
            NoteRequired,
        ),
        QuestionKey::Elektroinstalacije => (
            "Da li su uočeni nedostaci na elektroinstalacijama?",
            NoteRequired,
        ),
        QuestionKey::InspekcijskiNadzor => (
            "Da li je bilo inspekcijskog nadzora?",
            NoteRequired,
        ),
    }
}
